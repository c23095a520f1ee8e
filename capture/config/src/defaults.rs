//! Builtin site profiles and post-load defaulting.

use crate::schema::{
    CoursecapConfig, KeyAction, MediaKeyRules, PlayerControl, ProgressRules, ScreenshotRules,
    SectionSource, SelectorSet, SiteProfile, SubtitleMode, SubtitleRules, Timings, TitleSource,
};
use tracing::debug;

/// Fills in everything a freshly parsed config leaves unset. An empty
/// `sites` list gets the builtin profiles so a bare config file still
/// captures the known platforms.
pub fn apply_defaults(config: &mut CoursecapConfig) {
    if config.sites.is_empty() {
        debug!("no site profiles configured; installing builtins");
        config.sites = builtin_profiles();
    }
    if config.collector.base_url.trim().is_empty() {
        config.collector.base_url = crate::schema::default_collector_base();
    }
}

/// The profiles shipped with coursecap.
pub fn builtin_profiles() -> Vec<SiteProfile> {
    vec![udemy(), kodekloud(), youtube()]
}

fn udemy() -> SiteProfile {
    SiteProfile {
        id: "udemy".to_string(),
        root_directory: "udemy".to_string(),
        parent_title: TitleSource::Selector {
            selector: r#"h1[data-purpose="course-header-title"]"#.to_string(),
        },
        item_title: TitleSource::Selector {
            selector: r#"li[aria-current="true"] span[data-purpose="item-title"]"#.to_string(),
        },
        section: SectionSource::Heading,
        selectors: SelectorSet {
            active_item: Some(r#"li[aria-current="true"]"#.to_string()),
            video_length: Some(r#"span[data-purpose="duration"]"#.to_string()),
            video_length_attr: None,
            timestamp: Some(r#"span[data-purpose="current-time"]"#.to_string()),
            captions: Some(r#"div[data-purpose="captions-cue-text"]"#.to_string()),
            subtitle_track: None,
            video: Some("video".to_string()),
            play_button: Some(r#"button[data-purpose="play-button"]"#.to_string()),
            pause_button: Some(r#"button[data-purpose="pause-button"]"#.to_string()),
            forward_button: Some(r#"button[data-purpose="forward-skip-button"]"#.to_string()),
            progress_bar: Some(
                r#"div[data-purpose="video-progress-bar"] > div > div:nth-of-type(2)"#.to_string(),
            ),
        },
        subtitles: SubtitleRules {
            enabled: true,
            mode: SubtitleMode::Intercept,
            extension: ".vtt".to_string(),
            language_marker: "en_US".to_string(),
        },
        screenshot: ScreenshotRules::default(),
        progress: ProgressRules {
            enabled: true,
            threshold_pct: 98.5,
        },
        media_keys: MediaKeyRules {
            enabled: true,
            play: KeyAction::Press {
                control: PlayerControl::Play,
            },
            pause: KeyAction::Press {
                control: PlayerControl::Pause,
            },
            next: KeyAction::Press {
                control: PlayerControl::Forward,
            },
            previous: KeyAction::Seek { seconds: -5.0 },
            ..MediaKeyRules::default()
        },
        timings: Timings::default(),
    }
}

fn kodekloud() -> SiteProfile {
    SiteProfile {
        id: "kodekloud".to_string(),
        root_directory: "kodekloud".to_string(),
        // The player runs in an embedded frame; the course title lives on the
        // embedding page.
        parent_title: TitleSource::ParentFrame,
        item_title: TitleSource::DocumentTitle {
            before: Some(" from ".to_string()),
        },
        section: SectionSource::Unknown,
        selectors: SelectorSet {
            active_item: None,
            video_length: Some(r#"div[aria-label="Progress Bar"]"#.to_string()),
            video_length_attr: Some("aria-valuetext".to_string()),
            timestamp: Some(r#"div[data-progress-bar-timecode="true"]"#.to_string()),
            captions: Some(r#"div[lang="en-US"] span"#.to_string()),
            subtitle_track: Some(r#"track[srclang="en-US"]"#.to_string()),
            video: Some("video".to_string()),
            play_button: None,
            pause_button: None,
            forward_button: None,
            progress_bar: None,
        },
        subtitles: SubtitleRules {
            enabled: true,
            mode: SubtitleMode::TrackPoll,
            extension: ".vtt".to_string(),
            // The track element is already language-selected.
            language_marker: String::new(),
        },
        screenshot: ScreenshotRules::default(),
        progress: ProgressRules::default(),
        media_keys: MediaKeyRules {
            enabled: true,
            play: KeyAction::Playback { play: true },
            pause: KeyAction::Playback { play: false },
            next: KeyAction::Seek { seconds: 5.0 },
            previous: KeyAction::Seek { seconds: -5.0 },
            ..MediaKeyRules::default()
        },
        timings: Timings::default(),
    }
}

fn youtube() -> SiteProfile {
    SiteProfile {
        id: "youtube".to_string(),
        root_directory: "youtube".to_string(),
        parent_title: TitleSource::Selector {
            selector: "#text-container".to_string(),
        },
        item_title: TitleSource::DocumentTitle { before: None },
        section: SectionSource::ItemTitle,
        selectors: SelectorSet {
            video_length: Some(r#"span[class="ytp-time-duration"]"#.to_string()),
            timestamp: Some(r#"span[class="ytp-time-current"]"#.to_string()),
            captions: Some(r#"span[class="captions-text"]"#.to_string()),
            video: Some("video".to_string()),
            ..SelectorSet::default()
        },
        subtitles: SubtitleRules {
            enabled: false,
            ..SubtitleRules::default()
        },
        screenshot: ScreenshotRules::default(),
        progress: ProgressRules::default(),
        media_keys: MediaKeyRules::default(),
        timings: Timings::default(),
    }
}
