//! Host page seam for coursecap.
//!
//! Capture logic never touches a browser directly; it talks to a [`HostPage`]
//! implementation. [`SimPage`] is the scripted implementation used by the
//! replay harness and the test suites.

pub mod page;
pub mod sim;
pub mod types;

pub use page::HostPage;
pub use sim::SimPage;
pub use types::{FrameMessage, MediaKey, Navigation, TransferKind, TransferRecord};
