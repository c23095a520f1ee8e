//! Config validation with path-addressed errors and warnings.

use crate::schema::{CoursecapConfig, KeyAction, SiteProfile, SubtitleMode, TitleSource};
use std::collections::HashSet;
use thiserror::Error;

/// A single validation finding, pointing at the config path it concerns.
#[derive(Debug, Error)]
#[error("config validation error at '{path}': {message}")]
pub struct ConfigIssue {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigIssue>,
    pub warnings: Vec<ConfigIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigIssue {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigIssue {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validates the whole config in one pass.
pub fn validate(config: &CoursecapConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_collector(config, &mut report);
    validate_sites(config, &mut report);
    validate_notes(config, &mut report);
    report
}

fn validate_collector(config: &CoursecapConfig, report: &mut ValidationReport) {
    let base = &config.collector.base_url;
    if !base.starts_with("http://") && !base.starts_with("https://") {
        report.error(
            "collector.baseUrl",
            format!("must be an http(s) URL, got `{base}`"),
        );
    }
    if config.collector.timeout_ms == 0 {
        report.warn("collector.timeoutMs", "zero disables the request timeout");
    }
}

fn validate_sites(config: &CoursecapConfig, report: &mut ValidationReport) {
    if config.sites.is_empty() {
        report.warn("sites", "no site profiles configured; nothing will be captured");
        return;
    }

    let mut seen_ids = HashSet::new();
    for site in &config.sites {
        let path = format!("sites.{}", site.id);
        if site.id.trim().is_empty() {
            report.error("sites", "profile id cannot be empty");
        }
        if !seen_ids.insert(site.id.clone()) {
            report.error(&path, "duplicate profile id");
        }
        if site.root_directory.trim().is_empty() {
            report.error(format!("{path}.rootDirectory"), "cannot be empty");
        }
        validate_title_source(&site.parent_title, &format!("{path}.parentTitle"), report);
        validate_title_source(&site.item_title, &format!("{path}.itemTitle"), report);
        validate_subtitles(site, &path, report);
        validate_progress(site, &path, report);
        validate_media_keys(site, &path, report);
        if site.timings.element_poll_ms == 0 {
            report.error(
                format!("{path}.timings.elementPollMs"),
                "zero would spin; use a positive poll interval",
            );
        } else if site.timings.element_timeout_ms < site.timings.element_poll_ms {
            report.warn(
                format!("{path}.timings.elementTimeoutMs"),
                "shorter than the poll interval; waits will always time out",
            );
        }
    }
}

fn validate_title_source(source: &TitleSource, path: &str, report: &mut ValidationReport) {
    if let TitleSource::Selector { selector } = source {
        if selector.trim().is_empty() {
            report.error(path, "selector cannot be empty");
        }
    }
}

fn validate_subtitles(site: &SiteProfile, path: &str, report: &mut ValidationReport) {
    if !site.subtitles.enabled {
        return;
    }
    match site.subtitles.mode {
        SubtitleMode::Intercept => {
            if site.subtitles.extension.is_empty() {
                report.error(
                    format!("{path}.subtitles.extension"),
                    "required in intercept mode",
                );
            } else if !site.subtitles.extension.starts_with('.') {
                report.error(
                    format!("{path}.subtitles.extension"),
                    "must start with a dot, e.g. `.vtt`",
                );
            }
        }
        SubtitleMode::TrackPoll => {
            if site.selectors.subtitle_track.is_none() {
                report.error(
                    format!("{path}.selectors.subtitleTrack"),
                    "required in track-poll mode",
                );
            }
        }
    }
}

fn validate_progress(site: &SiteProfile, path: &str, report: &mut ValidationReport) {
    if !site.progress.enabled {
        return;
    }
    let pct = site.progress.threshold_pct;
    if !(pct > 0.0 && pct <= 100.0) {
        report.error(
            format!("{path}.progress.thresholdPct"),
            format!("must be within (0, 100], got {pct}"),
        );
    }
    if site.selectors.progress_bar.is_none() {
        report.error(
            format!("{path}.selectors.progressBar"),
            "required when the progress trigger is enabled",
        );
    }
    if site.selectors.pause_button.is_none() {
        report.error(
            format!("{path}.selectors.pauseButton"),
            "the progress trigger presses pause; selector required",
        );
    }
}

fn validate_media_keys(site: &SiteProfile, path: &str, report: &mut ValidationReport) {
    if !site.media_keys.enabled {
        return;
    }
    let keys = [
        ("play", &site.media_keys.play),
        ("pause", &site.media_keys.pause),
        ("next", &site.media_keys.next),
        ("previous", &site.media_keys.previous),
    ];
    for (name, action) in keys {
        match action {
            KeyAction::Press { control } => {
                let selector = match control {
                    crate::schema::PlayerControl::Play => &site.selectors.play_button,
                    crate::schema::PlayerControl::Pause => &site.selectors.pause_button,
                    crate::schema::PlayerControl::Forward => &site.selectors.forward_button,
                };
                if selector.is_none() {
                    report.error(
                        format!("{path}.mediaKeys.{name}"),
                        format!("presses `{control:?}` but no matching selector is set"),
                    );
                }
            }
            KeyAction::Playback { .. } => {
                if site.selectors.video.is_none() {
                    report.error(
                        format!("{path}.mediaKeys.{name}"),
                        "playback action requires the video selector",
                    );
                }
            }
            KeyAction::Seek { .. } | KeyAction::Ignore => {}
        }
    }
    if site.media_keys.max_attempts == 0 {
        report.warn(
            format!("{path}.mediaKeys.maxAttempts"),
            "zero attempts means the keys never bind",
        );
    }
}

fn validate_notes(config: &CoursecapConfig, report: &mut ValidationReport) {
    if config.notes.debounce_ms == 0 {
        report.warn(
            "notes.debounceMs",
            "zero disables debouncing; every change burst fires",
        );
    }
    for ext in &config.notes.image_extensions {
        if !ext.starts_with('.') {
            report.warn(
                "notes.imageExtensions",
                format!("`{ext}` should start with a dot"),
            );
        }
    }
}
