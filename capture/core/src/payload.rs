//! Collector payloads and their route bindings.

use serde::{Deserialize, Serialize};

use crate::asset::{ScreenshotAsset, SubtitleAsset};
use crate::context::CaptureContext;

/// Route for subtitle payloads, relative to the collector base URL.
pub const ROUTE_SUBTITLES: &str = "save-subtitles";
/// Route for screenshot payloads. The misspelling is part of the wire
/// contract the collector matches on.
pub const ROUTE_SCREENSHOTS: &str = "screenshorts-with-timestamps";

// ---------------------------------------------------------------------------
// Wire bodies
// ---------------------------------------------------------------------------

/// Body posted to `save-subtitles`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtitlePayload {
    pub url: String,
    pub content: String,
    pub title: String,
    pub parent_title: String,
    pub video_length: String,
    pub section_name: String,
    pub root_directory: String,
}

/// Body posted to `screenshorts-with-timestamps`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenshotPayload {
    pub parent_title: String,
    pub title: String,
    pub timestamp: String,
    pub captions: String,
    pub screenshot: String,
    pub section_name: String,
    pub root_directory: String,
}

impl SubtitlePayload {
    /// Joins extracted context with a captured subtitle asset. Every field is
    /// always present; missing page state arrives here already degraded to
    /// placeholder strings.
    pub fn assemble(ctx: &CaptureContext, asset: SubtitleAsset, root_directory: &str) -> Self {
        Self {
            url: asset.url,
            content: asset.content,
            title: ctx.item_title.clone(),
            parent_title: ctx.parent_title.clone(),
            video_length: ctx.video_length.clone(),
            section_name: ctx.section_name.clone(),
            root_directory: root_directory.to_string(),
        }
    }
}

impl ScreenshotPayload {
    pub fn assemble(ctx: &CaptureContext, shot: ScreenshotAsset, root_directory: &str) -> Self {
        Self {
            parent_title: ctx.parent_title.clone(),
            title: ctx.item_title.clone(),
            timestamp: ctx.timestamp.clone(),
            captions: ctx.captions.clone(),
            screenshot: shot.data,
            section_name: ctx.section_name.clone(),
            root_directory: root_directory.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Route dispatch
// ---------------------------------------------------------------------------

/// A fully assembled body together with its implied collector route.
/// Serializes transparently as the inner body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Subtitles(SubtitlePayload),
    Screenshot(ScreenshotPayload),
}

impl Payload {
    pub fn route(&self) -> &'static str {
        match self {
            Payload::Subtitles(_) => ROUTE_SUBTITLES,
            Payload::Screenshot(_) => ROUTE_SCREENSHOTS,
        }
    }

    /// Short label for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Subtitles(_) => "subtitles",
            Payload::Screenshot(_) => "screenshot",
        }
    }
}

impl From<SubtitlePayload> for Payload {
    fn from(p: SubtitlePayload) -> Self {
        Payload::Subtitles(p)
    }
}

impl From<ScreenshotPayload> for Payload {
    fn from(p: ScreenshotPayload) -> Self {
        Payload::Screenshot(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_context() -> CaptureContext {
        CaptureContext {
            parent_title: "go-course".into(),
            item_title: "ep1".into(),
            section_name: "basics".into(),
            video_length: "10:00".into(),
            timestamp: "2:15".into(),
            captions: "hello".into(),
        }
    }

    #[test]
    fn subtitle_payload_carries_all_fields() {
        let payload = SubtitlePayload::assemble(
            &sample_context(),
            SubtitleAsset::new("https://cdn.example.com/a.vtt", "WEBVTT\n\n1\n..."),
            "udemy",
        );
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["url"], "https://cdn.example.com/a.vtt");
        assert_eq!(value["content"], "WEBVTT\n\n1\n...");
        assert_eq!(value["title"], "ep1");
        assert_eq!(value["parentTitle"], "go-course");
        assert_eq!(value["videoLength"], "10:00");
        assert_eq!(value["sectionName"], "basics");
        assert_eq!(value["rootDirectory"], "udemy");
        assert_eq!(value.as_object().unwrap().len(), 7);
    }

    #[test]
    fn screenshot_payload_carries_all_fields() {
        let payload = ScreenshotPayload::assemble(
            &sample_context(),
            ScreenshotAsset::from_data_url("data:image/jpeg;base64,abcd"),
            "kodekloud",
        );
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["parentTitle"], "go-course");
        assert_eq!(value["title"], "ep1");
        assert_eq!(value["timestamp"], "2:15");
        assert_eq!(value["captions"], "hello");
        assert_eq!(value["screenshot"], "data:image/jpeg;base64,abcd");
        assert_eq!(value["sectionName"], "basics");
        assert_eq!(value["rootDirectory"], "kodekloud");
        assert_eq!(value.as_object().unwrap().len(), 7);
    }

    #[test]
    fn routes_match_their_payloads() {
        let sub: Payload = SubtitlePayload::assemble(
            &sample_context(),
            SubtitleAsset::new("a.vtt", "WEBVTT"),
            "udemy",
        )
        .into();
        let shot: Payload = ScreenshotPayload::assemble(
            &sample_context(),
            ScreenshotAsset::from_data_url("data:image/png;base64,xy"),
            "udemy",
        )
        .into();
        assert_eq!(sub.route(), "save-subtitles");
        assert_eq!(shot.route(), "screenshorts-with-timestamps");
    }

    #[test]
    fn payload_serializes_without_a_tag() {
        let sub: Payload = SubtitlePayload::assemble(
            &sample_context(),
            SubtitleAsset::new("a.vtt", "WEBVTT"),
            "udemy",
        )
        .into();
        let value = serde_json::to_value(&sub).unwrap();
        // Untagged: the wire body is exactly the inner struct.
        assert!(value.get("Subtitles").is_none());
        assert!(value.get("url").is_some());
    }
}
