//! Pure classification rules for files showing up in the note tree.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

/// Markdown image link the collector appends for every captured screenshot.
static SCREENSHOT_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[Screenshot\]\([^)]+\)").unwrap());

/// True for the per-lecture note file: a markdown file whose stem matches the
/// directory it sits in, the way the collector lays notes out
/// (`<course>/<lecture>/<lecture>.md`).
pub fn is_auto_open_note(path: &Path) -> bool {
    if path.extension().and_then(|e| e.to_str()) != Some("md") {
        return false;
    }
    let stem = path.file_stem().and_then(|s| s.to_str());
    let dir = path
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str());
    matches!((stem, dir), (Some(s), Some(d)) if s == d)
}

/// True for files the one-note-at-a-time rule must never close.
pub fn should_keep_open(path: &Path, keep_open: &[String]) -> bool {
    match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => keep_open.iter().any(|k| k == name),
        None => false,
    }
}

/// True when the file name ends in one of the configured image extensions.
pub fn is_image(path: &Path, extensions: &[String]) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let name = name.to_ascii_lowercase();
    extensions
        .iter()
        .any(|ext| name.ends_with(&ext.to_ascii_lowercase()))
}

/// Byte offset of the last screenshot link in `text`.
pub fn last_screenshot_link(text: &str) -> Option<usize> {
    SCREENSHOT_LINK.find_iter(text).last().map(|m| m.start())
}

/// Converts a byte offset into a 1-based line and column, the addressing
/// editors take on their command line.
pub fn offset_to_position(text: &str, offset: usize) -> (u32, u32) {
    let clamped = offset.min(text.len());
    let mut line = 1u32;
    let mut col = 1u32;
    for (i, ch) in text.char_indices() {
        if i >= clamped {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}
