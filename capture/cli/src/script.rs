//! Replay scripts: a YAML page description plus a timed event sequence.

use anyhow::{Context, Result};
use coursecap_host::{MediaKey, SimPage, TransferKind, TransferRecord};
use coursecap_session::CaptureSession;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// A scripted page and the events to drive through it. Replay seeds the
/// page, starts a capture session against it, then applies `steps` in order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayScript {
    /// Site profile id the session runs under.
    pub site: String,
    /// Starting URL. Applied while seeding, before the session subscribes.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub document_title: Option<String>,
    /// Embedding-page title, for profiles that resolve titles across the
    /// frame boundary.
    #[serde(default)]
    pub parent_title: Option<String>,
    /// Text content per selector.
    #[serde(default)]
    pub dom: BTreeMap<String, String>,
    #[serde(default)]
    pub attributes: Vec<AttrEntry>,
    /// Bodies served when the session fetches a URL through the page.
    #[serde(default)]
    pub resources: BTreeMap<String, String>,
    /// Section headings per active-item selector.
    #[serde(default)]
    pub sections: BTreeMap<String, String>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttrEntry {
    pub selector: String,
    pub attr: String,
    pub value: String,
}

/// One timed action. `afterMs` is the delay before the action, relative to
/// the previous step.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    #[serde(default)]
    pub after_ms: u64,
    #[serde(flatten)]
    pub action: Action,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "do", rename_all = "kebab-case")]
pub enum Action {
    /// A network transfer the page observed.
    Transfer {
        url: String,
        #[serde(default)]
        body: Option<String>,
    },
    /// An in-page navigation.
    Navigate { url: String },
    SetText {
        selector: String,
        text: String,
    },
    SetAttr {
        selector: String,
        attr: String,
        value: String,
    },
    /// Like `set-attr`, but also published to attribute watchers.
    UpdateAttr {
        selector: String,
        attr: String,
        value: String,
    },
    RemoveElement { selector: String },
    SetDocumentTitle { title: String },
    /// A hardware media key press.
    MediaKey { key: MediaKey },
    /// Answers a pending parent-title request by hand.
    TitleResponse { title: String },
    /// Asks the session for a screenshot, as the hotkey would.
    Screenshot,
}

impl ReplayScript {
    pub async fn load(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading replay script {}", path.display()))?;
        serde_yaml::from_str(&text)
            .with_context(|| format!("parsing replay script {}", path.display()))
    }

    /// Applies the static page description. Runs before the session starts,
    /// so the navigation produced by `url` has no subscribers yet.
    pub fn seed(&self, page: &SimPage) {
        if let Some(url) = &self.url {
            page.navigate(url.clone());
        }
        if let Some(title) = &self.document_title {
            page.set_document_title(title.clone());
        }
        if let Some(title) = &self.parent_title {
            page.set_parent_title(title.clone());
        }
        for (selector, text) in &self.dom {
            page.set_text(selector.clone(), text.clone());
        }
        for entry in &self.attributes {
            page.set_attr(entry.selector.clone(), entry.attr.clone(), entry.value.clone());
        }
        for (url, body) in &self.resources {
            page.set_resource(url.clone(), body.clone());
        }
        for (selector, heading) in &self.sections {
            page.set_section_heading(selector.clone(), heading.clone());
        }
    }
}

impl Action {
    /// Plays one action against the page, or against the session for actions
    /// a page cannot express.
    pub async fn apply(&self, page: &SimPage, session: &CaptureSession) -> Result<()> {
        match self {
            Action::Transfer { url, body } => {
                let mut record = TransferRecord::new(url.clone(), TransferKind::Promise);
                if let Some(body) = body {
                    record = record.with_body(body.clone());
                }
                page.emit_transfer(record);
            }
            Action::Navigate { url } => page.navigate(url.clone()),
            Action::SetText { selector, text } => page.set_text(selector.clone(), text.clone()),
            Action::SetAttr { selector, attr, value } => {
                page.set_attr(selector.clone(), attr.clone(), value.clone())
            }
            Action::UpdateAttr { selector, attr, value } => {
                page.update_attr(selector, attr, value.clone())
            }
            Action::RemoveElement { selector } => page.remove_element(selector),
            Action::SetDocumentTitle { title } => page.set_document_title(title.clone()),
            Action::MediaKey { key } => page.emit_media_key(*key),
            Action::TitleResponse { title } => page.respond_title(title.clone()),
            Action::Screenshot => session.capture_screenshot_now().await?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coursecap_host::HostPage;

    const SCRIPT: &str = r#"
site: udemy
url: https://www.udemy.com/course/learn-go/learn/lecture/3
documentTitle: "3. Variables and Types | Udemy"
dom:
  'h1[data-purpose="course-header-title"]': "Learn Go | Udemy"
  video: ""
attributes:
  - selector: 'div[data-purpose="video-progress"]'
    attr: aria-valuetext
    value: "12:34"
resources:
  "https://cdn.example.com/subs/en_US.vtt": "WEBVTT\n"
sections:
  'li[aria-current="true"] button': "Section 1: Getting Started"
steps:
  - afterMs: 3500
    do: transfer
    url: https://cdn.example.com/subs/en_US.vtt
  - do: media-key
    key: next-track
  - afterMs: 500
    do: screenshot
"#;

    #[test]
    fn scripts_parse_with_tagged_steps() {
        let script: ReplayScript = serde_yaml::from_str(SCRIPT).unwrap();
        assert_eq!(script.site, "udemy");
        assert_eq!(script.steps.len(), 3);
        assert_eq!(script.steps[0].after_ms, 3500);
        assert!(matches!(
            &script.steps[0].action,
            Action::Transfer { body: None, .. }
        ));
        assert_eq!(script.steps[1].after_ms, 0);
        assert!(matches!(
            script.steps[1].action,
            Action::MediaKey {
                key: MediaKey::NextTrack
            }
        ));
        assert!(matches!(script.steps[2].action, Action::Screenshot));
    }

    #[tokio::test]
    async fn seeding_populates_the_page() {
        let script: ReplayScript = serde_yaml::from_str(SCRIPT).unwrap();
        let page = SimPage::new("seed");
        script.seed(&page);

        assert_eq!(
            page.current_url().await,
            "https://www.udemy.com/course/learn-go/learn/lecture/3"
        );
        assert_eq!(
            page.document_title().await.as_deref(),
            Some("3. Variables and Types | Udemy")
        );
        assert_eq!(
            page.query_text(r#"h1[data-purpose="course-header-title"]"#)
                .await
                .as_deref(),
            Some("Learn Go | Udemy")
        );
        assert_eq!(
            page.query_attr(r#"div[data-purpose="video-progress"]"#, "aria-valuetext")
                .await
                .as_deref(),
            Some("12:34")
        );
        assert_eq!(
            page.fetch_resource("https://cdn.example.com/subs/en_US.vtt")
                .await
                .unwrap(),
            "WEBVTT\n"
        );
        assert_eq!(
            page.section_heading(r#"li[aria-current="true"] button"#)
                .await
                .as_deref(),
            Some("Section 1: Getting Started")
        );
    }

    #[test]
    fn unknown_actions_are_rejected() {
        let err = serde_yaml::from_str::<ReplayScript>("site: udemy\nsteps:\n  - do: explode\n")
            .unwrap_err();
        assert!(err.to_string().contains("explode"));
    }
}
