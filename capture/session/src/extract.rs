//! Page context extraction.

use coursecap_config::{SectionSource, SelectorSet, SiteProfile, TitleSource};
use coursecap_core::{slugify, slugify_opt, CaptureContext};
use coursecap_host::HostPage;
use std::time::Duration;
use tracing::warn;

use crate::frame_title;

/// Reads the page metadata a payload needs. Extraction never fails: missing
/// page state degrades field by field to placeholder values.
///
/// The duration read is preceded by a settle delay because players swap a
/// placeholder length for the real one shortly after load.
pub async fn extract_context(host: &dyn HostPage, profile: &SiteProfile) -> CaptureContext {
    let settle = Duration::from_millis(profile.timings.video_length_settle_ms);
    if !settle.is_zero() {
        tokio::time::sleep(settle).await;
    }
    let video_length = read_video_length(host, &profile.selectors).await;

    let parent_title = resolve_title(host, &profile.parent_title, profile).await;
    let item_title = resolve_title(host, &profile.item_title, profile).await;

    let section_name = match profile.section {
        SectionSource::Heading => match &profile.selectors.active_item {
            Some(active) => host
                .section_heading(active)
                .await
                .map(|text| slugify(&text))
                .unwrap_or_else(|| "unknown-section".to_string()),
            None => "unknown-section".to_string(),
        },
        SectionSource::ItemTitle => item_title.clone(),
        SectionSource::Unknown => "unknown-section".to_string(),
    };

    let timestamp = match &profile.selectors.timestamp {
        Some(selector) => host
            .query_text(selector)
            .await
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "unknown".to_string()),
        None => "unknown".to_string(),
    };

    let captions = match &profile.selectors.captions {
        Some(selector) => host
            .query_text(selector)
            .await
            .map(|t| t.trim().to_string())
            .unwrap_or_default(),
        None => String::new(),
    };

    CaptureContext {
        parent_title,
        item_title,
        section_name,
        video_length,
        timestamp,
        captions,
    }
}

async fn read_video_length(host: &dyn HostPage, selectors: &SelectorSet) -> String {
    let Some(selector) = &selectors.video_length else {
        return "unknown".to_string();
    };
    let raw = match &selectors.video_length_attr {
        Some(attr) => host.query_attr(selector, attr).await,
        None => host.query_text(selector).await,
    };
    raw.map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

async fn resolve_title(host: &dyn HostPage, source: &TitleSource, profile: &SiteProfile) -> String {
    match source {
        TitleSource::Selector { selector } => {
            slugify_opt(host.query_text(selector).await.as_deref())
        }
        TitleSource::DocumentTitle { before } => {
            let title = host.document_title().await;
            let cut = title.as_deref().map(|t| match before {
                Some(marker) => t.split(marker.as_str()).next().unwrap_or(t).trim(),
                None => t.trim(),
            });
            slugify_opt(cut)
        }
        TitleSource::ParentFrame => {
            match frame_title::request_parent_title(host, profile.timings.frame_title_timeout_ms)
                .await
            {
                Ok(title) => slugify(&title),
                Err(e) => {
                    warn!(error = %e, "parent frame title unavailable; using placeholder");
                    "unknown".to_string()
                }
            }
        }
    }
}
