//! The collector client: route-addressed JSON posts with one attempt each.

use async_trait::async_trait;
use coursecap_config::CollectorConfig;
use coursecap_core::{CaptureError, Payload, Submitter};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

/// Client for the local collector. Cheap to clone; the inner HTTP client is
/// shared.
#[derive(Clone)]
pub struct CollectorClient {
    http: Client,
    base_url: String,
}

impl CollectorClient {
    pub fn new(config: &CollectorConfig) -> Result<Self, CaptureError> {
        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| CaptureError::Config(format!("collector http client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, route: &str) -> String {
        format!("{}/{}", self.base_url, route)
    }

    /// Posts one JSON body to a collector route and returns the response
    /// body. One attempt, no retries; the capture flow drops payloads whose
    /// delivery fails.
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        route: &str,
        body: &T,
    ) -> Result<String, CaptureError> {
        let url = self.endpoint(route);
        debug!(%url, "posting to collector");
        let res = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| CaptureError::Collector {
                route: route.to_string(),
                message: e.to_string(),
            })?;

        let status = res.status();
        let text = res.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(CaptureError::Collector {
                route: route.to_string(),
                message: format!("status {status}: {text}"),
            });
        }
        info!(route, status = %status, "collector accepted the payload");
        Ok(text)
    }
}

#[async_trait]
impl Submitter for CollectorClient {
    async fn submit(&self, payload: &Payload) -> anyhow::Result<String> {
        Ok(self.post_json(payload.route(), payload).await?)
    }
}
