//! HTTP client for the local collector service.
//!
//! The collector is a small server on the same machine that files subtitle
//! and screenshot payloads into the note tree. This crate owns the one client
//! that talks to it.

pub mod client;

pub use client::CollectorClient;
