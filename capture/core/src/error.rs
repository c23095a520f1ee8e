//! Error types for the capture runtime.

use thiserror::Error;

/// Unified error type used across the coursecap crates.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// A DOM element never showed up within the bounded wait window.
    #[error("timed out waiting for element `{selector}` after {waited_ms}ms")]
    WaitTimeout { selector: String, waited_ms: u64 },

    /// Frame capture was requested on a page with no video element.
    #[error("no video element available for frame capture")]
    NoVideo,

    /// The parent frame never answered a title request.
    #[error("no title response from parent frame within {0}ms")]
    FrameTitleTimeout(u64),

    /// A press target (player control button) is not present on the page.
    #[error("element `{0}` not present")]
    MissingElement(String),

    /// The collector rejected or never received a payload.
    #[error("collector request to `{route}` failed: {message}")]
    Collector { route: String, message: String },

    /// A host event feed shut down underneath a running session.
    #[error("host event feed `{0}` closed")]
    FeedClosed(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CaptureError {
    /// True when the failure is a missing-page-state condition rather than an
    /// I/O or configuration problem. Sessions log these and keep running.
    pub fn is_page_state(&self) -> bool {
        matches!(
            self,
            CaptureError::WaitTimeout { .. }
                | CaptureError::NoVideo
                | CaptureError::FrameTitleTimeout(_)
                | CaptureError::MissingElement(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wait_timeout_names_selector_and_window() {
        let err = CaptureError::WaitTimeout {
            selector: "video".into(),
            waited_ms: 10_000,
        };
        let msg = err.to_string();
        assert!(msg.contains("video"));
        assert!(msg.contains("10000ms"));
    }

    #[test]
    fn page_state_errors_are_classified() {
        assert!(CaptureError::NoVideo.is_page_state());
        assert!(CaptureError::FrameTitleTimeout(3000).is_page_state());
        assert!(!CaptureError::Collector {
            route: "save-subtitles".into(),
            message: "connection refused".into(),
        }
        .is_page_state());
    }
}
