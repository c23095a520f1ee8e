//! Subtitle resource matching.

use coursecap_config::SubtitleRules;

/// Decides whether an observed URL is the subtitle document a session wants.
///
/// The extension is compared case-insensitively against the URL path, before
/// any query string or fragment. The language marker is searched in the full
/// URL, query included, because CDNs put it in either place.
#[derive(Debug, Clone)]
pub struct ResourceMatcher {
    extension: String,
    language_marker: String,
}

impl ResourceMatcher {
    pub fn new(rules: &SubtitleRules) -> Self {
        Self {
            extension: rules.extension.to_ascii_lowercase(),
            language_marker: rules.language_marker.clone(),
        }
    }

    pub fn matches(&self, url: &str) -> bool {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        let extension_ok = path.to_ascii_lowercase().ends_with(&self.extension);
        let marker_ok =
            self.language_marker.is_empty() || url.contains(&self.language_marker);
        extension_ok && marker_ok
    }
}
