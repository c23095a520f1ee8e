//! Core types, capture payloads, and submission traits shared by every
//! coursecap crate.

pub mod asset;
pub mod context;
pub mod error;
pub mod event;
pub mod payload;
pub mod slug;
pub mod submit;

pub use asset::{ScreenshotAsset, SubtitleAsset};
pub use context::CaptureContext;
pub use error::CaptureError;
pub use event::{SessionEvent, SessionEventKind};
pub use payload::{Payload, ScreenshotPayload, SubtitlePayload};
pub use slug::{slugify, slugify_opt};
pub use submit::{DrySink, Submitter};
