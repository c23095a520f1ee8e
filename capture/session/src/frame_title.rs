//! Title handshake with the embedding page.
//!
//! Some players run inside an iframe; the course title lives on the page
//! around them. The child posts `need-title` and takes the first
//! `title-response` that comes back within the window.

use coursecap_core::CaptureError;
use coursecap_host::{FrameMessage, HostPage};
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

/// Asks the embedding page for its title. First response wins; later ones
/// are ignored by construction since this subscription ends here.
pub async fn request_parent_title(
    host: &dyn HostPage,
    timeout_ms: u64,
) -> Result<String, CaptureError> {
    // Subscribe before posting so an immediate answer cannot slip past.
    let mut messages = host.frame_messages();
    host.post_to_parent(FrameMessage::NeedTitle).await?;

    let wait = tokio::time::timeout(Duration::from_millis(timeout_ms), async {
        loop {
            match messages.recv().await {
                Ok(FrameMessage::TitleResponse { title }) => return Ok(title),
                Ok(other) => {
                    debug!(?other, "ignoring frame message while waiting for title");
                }
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "frame message feed lagged");
                }
                Err(RecvError::Closed) => {
                    return Err(CaptureError::FeedClosed("frame-messages".to_string()))
                }
            }
        }
    })
    .await;

    match wait {
        Ok(result) => result,
        Err(_) => Err(CaptureError::FrameTitleTimeout(timeout_ms)),
    }
}
