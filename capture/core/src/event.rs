//! Session lifecycle events.
//!
//! Sessions emit these over an unbounded channel so the CLI can narrate a run
//! and tests can synchronize on state transitions without polling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionEventKind {
    /// The session finished arming and is watching for a matching resource.
    Armed,
    /// Navigation reset the session back to a fresh watch.
    Reset,
    /// A network transfer matched the subtitle rules.
    ResourceMatched,
    /// The collector accepted a payload.
    Submitted,
    /// A payload was dropped after a failed collector request.
    SubmitFailed,
    /// The bounded watch window elapsed with no match.
    WatchTimeout,
    /// A delayed callback completed after a navigation and was discarded.
    StaleDropped,
    /// A screenshot asset was produced and handed to the submitter.
    ScreenshotCaptured,
    /// Media keys were bound to the player controls.
    MediaKeysBound,
    /// The progress trigger pressed pause at the completion threshold.
    ProgressPause,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEvent {
    pub session: Uuid,
    pub at: DateTime<Utc>,
    pub kind: SessionEventKind,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub detail: Value,
}

impl SessionEvent {
    pub fn new(session: Uuid, kind: SessionEventKind) -> Self {
        Self {
            session,
            at: Utc::now(),
            kind,
            detail: Value::Null,
        }
    }

    pub fn with_detail(session: Uuid, kind: SessionEventKind, detail: Value) -> Self {
        Self {
            session,
            at: Utc::now(),
            kind,
            detail,
        }
    }
}
