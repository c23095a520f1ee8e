//! Configuration loading, site profiles, and validation for coursecap.
//!
//! The pipeline is: read YAML → substitute `${VAR}` references → deserialize
//! → apply defaults (builtin site profiles included) → validate.

pub mod defaults;
pub mod env;
pub mod io;
pub mod schema;
pub mod validation;

pub use defaults::{apply_defaults, builtin_profiles};
pub use io::{config_dir, config_file_path, load_config, write_config};
pub use schema::{
    CollectorConfig, CoursecapConfig, KeyAction, LoggingConfig, MediaKeyRules, NotesConfig,
    PlayerControl, ProgressRules, ScreenshotRules, ScreenshotSource, SectionSource, SelectorSet,
    SiteProfile, SubtitleMode, SubtitleRules, Timings, TitleSource,
};
pub use validation::{validate, ValidationReport};
