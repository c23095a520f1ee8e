//! Events a host page feeds into the capture runtime.

use serde::{Deserialize, Serialize};

/// How a network transfer was observed on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransferKind {
    /// Read off a completed transfer's response attribute.
    Attribute,
    /// Taken from a promise-based fetch resolution.
    Promise,
}

/// One observed network transfer. `body` is present when the host already
/// holds the response text; otherwise the session fetches the URL itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRecord {
    pub url: String,
    pub kind: TransferKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl TransferRecord {
    pub fn new(url: impl Into<String>, kind: TransferKind) -> Self {
        Self {
            url: url.into(),
            kind,
            body: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// An in-page navigation (URL change without a fresh document).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub url: String,
}

/// Hardware media key events surfaced by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MediaKey {
    Play,
    Pause,
    NextTrack,
    PreviousTrack,
}

/// Message exchanged with the embedding page across the frame boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum FrameMessage {
    /// Child frame asking the embedding page for its title.
    NeedTitle,
    /// Embedding page answering with its title text.
    TitleResponse { title: String },
}
