//! Capture context extracted from the watched page.

use serde::{Deserialize, Serialize};

/// Snapshot of the page metadata a session reads right before it assembles a
/// payload. All fields are already slug-normalized or display strings; missing
/// page state degrades to placeholder values rather than failing the capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureContext {
    /// Slug of the course or channel title.
    pub parent_title: String,
    /// Slug of the active lecture or video title.
    pub item_title: String,
    /// Slug of the grouping heading the active item sits under.
    pub section_name: String,
    /// Total duration as displayed by the player, e.g. `"12:34"`.
    pub video_length: String,
    /// Playback position at extraction time, e.g. `"3:21"`.
    pub timestamp: String,
    /// Caption text visible at extraction time, empty when none is shown.
    pub captions: String,
}

impl CaptureContext {
    /// Context with every field at its placeholder value.
    pub fn unknown() -> Self {
        Self {
            parent_title: "unknown".to_string(),
            item_title: "unknown".to_string(),
            section_name: "unknown-section".to_string(),
            video_length: "unknown".to_string(),
            timestamp: "unknown".to_string(),
            captions: String::new(),
        }
    }
}

impl Default for CaptureContext {
    fn default() -> Self {
        Self::unknown()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_context_uses_placeholders() {
        let ctx = CaptureContext::unknown();
        assert_eq!(ctx.parent_title, "unknown");
        assert_eq!(ctx.section_name, "unknown-section");
        assert_eq!(ctx.captions, "");
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let value = serde_json::to_value(CaptureContext::unknown()).unwrap();
        assert!(value.get("parentTitle").is_some());
        assert!(value.get("videoLength").is_some());
        assert!(value.get("sectionName").is_some());
    }
}
