//! Captured assets: subtitle documents and screenshot images.

use serde::{Deserialize, Serialize};

/// A subtitle document pulled off the page, plus the URL it was served from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtitleAsset {
    pub url: String,
    pub content: String,
}

impl SubtitleAsset {
    pub fn new(url: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            content: content.into(),
        }
    }
}

/// A screenshot encoded as a `data:` URL, exactly as the host produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenshotAsset {
    pub data: String,
}

impl ScreenshotAsset {
    pub fn from_data_url(data: impl Into<String>) -> Self {
        Self { data: data.into() }
    }

    /// Media type parsed from the data URL header, when present.
    pub fn mime(&self) -> Option<&str> {
        let rest = self.data.strip_prefix("data:")?;
        let end = rest.find([';', ','])?;
        Some(&rest[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_is_parsed_from_data_url() {
        let shot = ScreenshotAsset::from_data_url("data:image/jpeg;base64,/9j/4AAQ");
        assert_eq!(shot.mime(), Some("image/jpeg"));
    }

    #[test]
    fn mime_is_none_for_non_data_urls() {
        let shot = ScreenshotAsset::from_data_url("https://example.com/a.png");
        assert_eq!(shot.mime(), None);
    }
}
