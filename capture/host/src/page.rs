//! The host page capability trait.

use async_trait::async_trait;
use coursecap_core::{CaptureError, ScreenshotAsset};
use tokio::sync::broadcast;

use crate::types::{FrameMessage, MediaKey, Navigation, TransferRecord};

/// Everything the capture runtime needs from the page it watches.
///
/// Observation is registration-based: the host owns the interception points
/// and publishes what it sees on broadcast feeds, and the runtime subscribes.
/// Subscribers receive only events published after they subscribe.
#[async_trait]
pub trait HostPage: Send + Sync {
    /// Stable name for log lines.
    fn name(&self) -> &str;

    // -- document reads ----------------------------------------------------

    async fn current_url(&self) -> String;

    async fn document_title(&self) -> Option<String>;

    /// Text content of the first match, `None` when nothing matches.
    async fn query_text(&self, selector: &str) -> Option<String>;

    /// Attribute value of the first match.
    async fn query_attr(&self, selector: &str, attr: &str) -> Option<String>;

    /// The nearest preceding grouping heading for the element matched by
    /// `active_item`, resolved host-side.
    async fn section_heading(&self, active_item: &str) -> Option<String>;

    // -- event feeds -------------------------------------------------------

    /// Completed network transfers the host observed.
    fn transfers(&self) -> broadcast::Receiver<TransferRecord>;

    /// In-page navigations.
    fn navigations(&self) -> broadcast::Receiver<Navigation>;

    /// Hardware media key presses.
    fn media_keys(&self) -> broadcast::Receiver<MediaKey>;

    /// Messages arriving from the embedding page.
    fn frame_messages(&self) -> broadcast::Receiver<FrameMessage>;

    /// Value changes of one attribute on one element, e.g. the inline width
    /// of a progress bar.
    fn attribute_updates(&self, selector: &str, attr: &str) -> broadcast::Receiver<String>;

    // -- page actions ------------------------------------------------------

    /// Clicks the first match. Fails with [`CaptureError::MissingElement`]
    /// when nothing matches.
    async fn press(&self, selector: &str) -> Result<(), CaptureError>;

    /// Seeks the media element matched by `selector` relative to its current
    /// position.
    async fn seek_by(&self, selector: &str, seconds: f64) -> Result<(), CaptureError>;

    /// Starts or pauses the media element matched by `selector`.
    async fn set_playing(&self, selector: &str, playing: bool) -> Result<(), CaptureError>;

    /// Posts a message to the embedding page.
    async fn post_to_parent(&self, message: FrameMessage) -> Result<(), CaptureError>;

    /// Fetches a same-page resource and returns its body text.
    async fn fetch_resource(&self, url: &str) -> Result<String, CaptureError>;

    // -- capture -----------------------------------------------------------

    /// Captures the visible tab as a `data:` URL.
    async fn capture_tab(&self, format: &str, quality: u8)
        -> Result<ScreenshotAsset, CaptureError>;

    /// Draws the current frame of the media element matched by `selector`.
    /// Fails with [`CaptureError::NoVideo`] when the element is absent.
    async fn capture_frame(&self, selector: &str) -> Result<ScreenshotAsset, CaptureError>;
}
