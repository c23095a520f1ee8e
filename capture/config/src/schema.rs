//! Config schema: collector endpoint, site capture profiles, and the notes
//! watcher.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Top level
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursecapConfig {
    #[serde(default)]
    pub collector: CollectorConfig,
    /// Site capture profiles. Left empty, the builtin profiles are installed
    /// at load time.
    #[serde(default)]
    pub sites: Vec<SiteProfile>,
    #[serde(default)]
    pub notes: NotesConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectorConfig {
    /// Base URL the capture routes are appended to.
    #[serde(default = "default_collector_base")]
    pub base_url: String,
    #[serde(default = "default_collector_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            base_url: default_collector_base(),
            timeout_ms: default_collector_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    /// Tracing filter directive, e.g. `"info"` or `"coursecap_session=debug"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Emit JSON log lines instead of the human format.
    #[serde(default)]
    pub json: bool,
}

// ---------------------------------------------------------------------------
// Site profiles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteProfile {
    /// Short identifier, unique across the config (`"udemy"`, `"kodekloud"`).
    pub id: String,
    /// Directory tag the collector files payloads under.
    pub root_directory: String,
    #[serde(default = "default_title_source")]
    pub parent_title: TitleSource,
    #[serde(default = "default_title_source")]
    pub item_title: TitleSource,
    #[serde(default)]
    pub section: SectionSource,
    #[serde(default)]
    pub selectors: SelectorSet,
    #[serde(default)]
    pub subtitles: SubtitleRules,
    #[serde(default)]
    pub screenshot: ScreenshotRules,
    #[serde(default)]
    pub progress: ProgressRules,
    #[serde(default)]
    pub media_keys: MediaKeyRules,
    #[serde(default)]
    pub timings: Timings,
}

/// Where a title string comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "kebab-case")]
pub enum TitleSource {
    /// Text content of the first selector match.
    Selector { selector: String },
    /// The document title. With `before` set, only the part preceding the
    /// first occurrence of the marker is kept.
    DocumentTitle {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        before: Option<String>,
    },
    /// Ask the embedding page over the frame message bridge.
    ParentFrame,
}

/// Where the grouping-section slug comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionSource {
    /// Nearest preceding heading of the active playlist item.
    Heading,
    /// Reuse the item title slug.
    ItemTitle,
    /// Always the placeholder.
    #[default]
    Unknown,
}

/// CSS selectors a profile reads page state through. All optional; a missing
/// selector degrades the corresponding field to its placeholder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectorSet {
    /// Active playlist entry, anchor for section-heading resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_item: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_length: Option<String>,
    /// Attribute to read from the video-length element instead of its text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_length_attr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captions: Option<String>,
    /// Subtitle track element, used by the track-poll capture mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle_track: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub play_button: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pause_button: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forward_button: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_bar: Option<String>,
}

// ---------------------------------------------------------------------------
// Subtitles
// ---------------------------------------------------------------------------

/// How the subtitle document is observed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubtitleMode {
    /// Watch the host's network-transfer feed for a matching URL.
    #[default]
    Intercept,
    /// Wait for the track element and fetch its `src` directly.
    TrackPoll,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtitleRules {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub mode: SubtitleMode,
    /// URL path extension a transfer must end in, compared case-insensitively
    /// and before any query string.
    #[serde(default = "default_subtitle_extension")]
    pub extension: String,
    /// Language marker the full URL must contain. Empty disables the check.
    #[serde(default = "default_language_marker")]
    pub language_marker: String,
}

impl Default for SubtitleRules {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: SubtitleMode::default(),
            extension: default_subtitle_extension(),
            language_marker: default_language_marker(),
        }
    }
}

// ---------------------------------------------------------------------------
// Screenshots
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScreenshotSource {
    /// Capture the visible tab.
    #[default]
    Tab,
    /// Draw the current video frame.
    VideoFrame,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenshotRules {
    #[serde(default)]
    pub source: ScreenshotSource,
    #[serde(default = "default_screenshot_format")]
    pub format: String,
    #[serde(default = "default_screenshot_quality")]
    pub quality: u8,
}

impl Default for ScreenshotRules {
    fn default() -> Self {
        Self {
            source: ScreenshotSource::default(),
            format: default_screenshot_format(),
            quality: default_screenshot_quality(),
        }
    }
}

// ---------------------------------------------------------------------------
// Progress trigger
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRules {
    #[serde(default)]
    pub enabled: bool,
    /// Completion percentage at which pause is pressed once.
    #[serde(default = "default_progress_threshold")]
    pub threshold_pct: f64,
}

impl Default for ProgressRules {
    fn default() -> Self {
        Self {
            enabled: false,
            threshold_pct: default_progress_threshold(),
        }
    }
}

// ---------------------------------------------------------------------------
// Media keys
// ---------------------------------------------------------------------------

/// Player control button, resolved to a selector through [`SelectorSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlayerControl {
    Play,
    Pause,
    Forward,
}

/// What a hardware media key does when it arrives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum KeyAction {
    /// Press the named player control.
    Press { control: PlayerControl },
    /// Seek relative to the current position.
    Seek { seconds: f64 },
    /// Drive the video element directly, for players without reachable
    /// control buttons.
    Playback { play: bool },
    #[default]
    Ignore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaKeyRules {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub play: KeyAction,
    #[serde(default)]
    pub pause: KeyAction,
    #[serde(default)]
    pub next: KeyAction,
    #[serde(default)]
    pub previous: KeyAction,
    /// Interval between attempts to find the player controls.
    #[serde(default = "default_key_retry_ms")]
    pub retry_ms: u64,
    #[serde(default = "default_key_max_attempts")]
    pub max_attempts: u32,
}

impl Default for MediaKeyRules {
    fn default() -> Self {
        Self {
            enabled: false,
            play: KeyAction::Ignore,
            pause: KeyAction::Ignore,
            next: KeyAction::Ignore,
            previous: KeyAction::Ignore,
            retry_ms: default_key_retry_ms(),
            max_attempts: default_key_max_attempts(),
        }
    }
}

// ---------------------------------------------------------------------------
// Timings
// ---------------------------------------------------------------------------

/// Delays and bounded-wait windows, all in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timings {
    /// Delay between session start and the watch going live.
    #[serde(default = "default_arm_delay_ms")]
    pub arm_delay_ms: u64,
    /// Settle time before the video length is read, so the player can swap
    /// in the real duration.
    #[serde(default = "default_video_length_settle_ms")]
    pub video_length_settle_ms: u64,
    /// Settle time after an in-page navigation before re-arming.
    #[serde(default = "default_navigation_settle_ms")]
    pub navigation_settle_ms: u64,
    #[serde(default = "default_element_poll_ms")]
    pub element_poll_ms: u64,
    #[serde(default = "default_element_timeout_ms")]
    pub element_timeout_ms: u64,
    #[serde(default = "default_frame_title_timeout_ms")]
    pub frame_title_timeout_ms: u64,
    /// Watch window after arming; 0 keeps the watch open indefinitely.
    #[serde(default)]
    pub watch_timeout_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            arm_delay_ms: default_arm_delay_ms(),
            video_length_settle_ms: default_video_length_settle_ms(),
            navigation_settle_ms: default_navigation_settle_ms(),
            element_poll_ms: default_element_poll_ms(),
            element_timeout_ms: default_element_timeout_ms(),
            frame_title_timeout_ms: default_frame_title_timeout_ms(),
            watch_timeout_ms: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Notes watcher
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotesConfig {
    /// Directory the collector writes notes into. Unset disables the watcher
    /// unless a root is passed on the command line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub auto_open_markdown: bool,
    #[serde(default = "default_true")]
    pub auto_open_images: bool,
    #[serde(default = "default_true")]
    pub jump_to_screenshot: bool,
    /// Per-file debounce window for change bursts.
    #[serde(default = "default_notes_debounce_ms")]
    pub debounce_ms: u64,
    /// Settle time before a newly created image is opened, so the file is
    /// fully written.
    #[serde(default = "default_image_settle_ms")]
    pub image_settle_ms: u64,
    /// File names never closed by the one-note-per-lecture rule.
    #[serde(default = "default_keep_open")]
    pub keep_open: Vec<String>,
    #[serde(default = "default_image_extensions")]
    pub image_extensions: Vec<String>,
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            root: None,
            auto_open_markdown: true,
            auto_open_images: true,
            jump_to_screenshot: true,
            debounce_ms: default_notes_debounce_ms(),
            image_settle_ms: default_image_settle_ms(),
            keep_open: default_keep_open(),
            image_extensions: default_image_extensions(),
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

pub(crate) fn default_collector_base() -> String {
    "http://localhost:3000/".to_string()
}

fn default_collector_timeout_ms() -> u64 {
    10_000
}

fn default_true() -> bool {
    true
}

fn default_title_source() -> TitleSource {
    TitleSource::DocumentTitle { before: None }
}

fn default_subtitle_extension() -> String {
    ".vtt".to_string()
}

fn default_language_marker() -> String {
    "en_US".to_string()
}

fn default_screenshot_format() -> String {
    "jpeg".to_string()
}

fn default_screenshot_quality() -> u8 {
    90
}

fn default_progress_threshold() -> f64 {
    98.5
}

fn default_key_retry_ms() -> u64 {
    500
}

fn default_key_max_attempts() -> u32 {
    20
}

fn default_arm_delay_ms() -> u64 {
    3_000
}

fn default_video_length_settle_ms() -> u64 {
    1_500
}

fn default_navigation_settle_ms() -> u64 {
    2_000
}

fn default_element_poll_ms() -> u64 {
    100
}

fn default_element_timeout_ms() -> u64 {
    10_000
}

fn default_frame_title_timeout_ms() -> u64 {
    3_000
}

fn default_notes_debounce_ms() -> u64 {
    300
}

fn default_image_settle_ms() -> u64 {
    400
}

fn default_keep_open() -> Vec<String> {
    vec!["titles.md".to_string()]
}

fn default_image_extensions() -> Vec<String> {
    vec![".png".to_string(), ".jpg".to_string(), ".jpeg".to_string()]
}
