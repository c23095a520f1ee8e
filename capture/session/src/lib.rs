//! Capture sessions for coursecap.
//!
//! A session watches one host page with one site profile: it arms after a
//! settle delay, waits for the subtitle resource to show up, assembles the
//! payload from extracted page context, and hands it to a submitter exactly
//! once. Screenshots, the progress trigger, and the media key bridge hang off
//! the same session.

pub mod extract;
pub mod frame_title;
pub mod matcher;
pub mod media_keys;
pub mod progress;
pub mod session;
pub mod wait;

pub use matcher::ResourceMatcher;
pub use media_keys::MediaKeyBridge;
pub use progress::{ProgressOutcome, ProgressTrigger};
pub use session::{CaptureSession, Phase};
