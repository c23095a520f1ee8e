//! `coursecap profiles`: list the configured site profiles.

use anyhow::{bail, Result};
use coursecap_config::{
    validate, CoursecapConfig, ScreenshotSource, SiteProfile, SubtitleMode, TitleSource,
};

pub fn run(config: &CoursecapConfig, validate_config: bool) -> Result<()> {
    for site in &config.sites {
        print_profile(site);
    }

    if validate_config {
        let report = validate(config);
        for issue in &report.warnings {
            println!("warning: {}: {}", issue.path, issue.message);
        }
        for issue in &report.errors {
            println!("error: {}: {}", issue.path, issue.message);
        }
        if !report.is_valid() {
            bail!("config has {} validation error(s)", report.errors.len());
        }
        println!(
            "config is valid ({} profile(s), {} warning(s))",
            config.sites.len(),
            report.warnings.len()
        );
    }
    Ok(())
}

fn print_profile(site: &SiteProfile) {
    println!("{}  (root directory: {})", site.id, site.root_directory);
    println!("  parent title: {}", describe_title(&site.parent_title));
    println!("  item title:   {}", describe_title(&site.item_title));

    if site.subtitles.enabled {
        let mode = match site.subtitles.mode {
            SubtitleMode::Intercept => "intercept",
            SubtitleMode::TrackPoll => "track-poll",
        };
        let marker = if site.subtitles.language_marker.is_empty() {
            "any language".to_string()
        } else {
            format!("marker `{}`", site.subtitles.language_marker)
        };
        println!(
            "  subtitles:    {mode}, `{}` transfers, {marker}",
            site.subtitles.extension
        );
    } else {
        println!("  subtitles:    disabled");
    }

    let source = match site.screenshot.source {
        ScreenshotSource::Tab => "visible tab",
        ScreenshotSource::VideoFrame => "video frame",
    };
    println!("  screenshots:  {source} as {}", site.screenshot.format);

    if site.progress.enabled {
        println!(
            "  progress:     pause at {:.1}% watched",
            site.progress.threshold_pct
        );
    } else {
        println!("  progress:     disabled");
    }
    println!(
        "  media keys:   {}",
        if site.media_keys.enabled {
            "enabled"
        } else {
            "disabled"
        }
    );
}

fn describe_title(source: &TitleSource) -> String {
    match source {
        TitleSource::Selector { selector } => format!("selector `{selector}`"),
        TitleSource::DocumentTitle {
            before: Some(marker),
        } => format!("document title before `{marker}`"),
        TitleSource::DocumentTitle { before: None } => "document title".to_string(),
        TitleSource::ParentFrame => "parent frame".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coursecap_config::apply_defaults;

    #[test]
    fn builtin_profiles_pass_validation() {
        let mut config = CoursecapConfig::default();
        apply_defaults(&mut config);
        run(&config, true).unwrap();
    }

    #[test]
    fn broken_configs_fail_validation() {
        let mut config = CoursecapConfig::default();
        apply_defaults(&mut config);
        config.collector.base_url = String::new();
        config.sites[0].id = config.sites[1].id.clone();
        let err = run(&config, true).unwrap_err();
        assert!(err.to_string().contains("validation error"));
    }

    #[test]
    fn listing_without_validation_always_succeeds() {
        let mut config = CoursecapConfig::default();
        apply_defaults(&mut config);
        config.collector.base_url = String::new();
        run(&config, false).unwrap();
    }
}
