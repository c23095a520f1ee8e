//! Submission seam between capture sessions and the collector.

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

use crate::payload::Payload;

/// Anything that can deliver an assembled payload. The HTTP collector client
/// implements this; tests and dry runs use [`DrySink`].
#[async_trait]
pub trait Submitter: Send + Sync {
    /// Delivers one payload and returns the collector's response body.
    /// One attempt, no retries. Callers treat errors as log-and-drop.
    async fn submit(&self, payload: &Payload) -> Result<String>;
}

/// Submitter that records payloads instead of sending them.
#[derive(Debug, Default)]
pub struct DrySink {
    recorded: Mutex<Vec<Payload>>,
}

impl DrySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn recorded(&self) -> Vec<Payload> {
        self.recorded.lock().await.clone()
    }

    pub async fn count(&self) -> usize {
        self.recorded.lock().await.len()
    }
}

#[async_trait]
impl Submitter for DrySink {
    async fn submit(&self, payload: &Payload) -> Result<String> {
        info!(route = payload.route(), kind = payload.kind(), "dry-run: payload recorded, nothing sent");
        self.recorded.lock().await.push(payload.clone());
        Ok("dry-run".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::SubtitleAsset;
    use crate::context::CaptureContext;
    use crate::payload::SubtitlePayload;

    #[tokio::test]
    async fn dry_sink_records_in_order() {
        let sink = DrySink::new();
        for url in ["one.vtt", "two.vtt"] {
            let payload: Payload = SubtitlePayload::assemble(
                &CaptureContext::unknown(),
                SubtitleAsset::new(url, "WEBVTT"),
                "udemy",
            )
            .into();
            sink.submit(&payload).await.unwrap();
        }
        let recorded = sink.recorded().await;
        assert_eq!(recorded.len(), 2);
        match &recorded[0] {
            Payload::Subtitles(p) => assert_eq!(p.url, "one.vtt"),
            other => panic!("unexpected payload: {other:?}"),
        }
    }
}
