//! Slug normalization for titles used in collector payloads and directory
//! names.

/// Normalizes free-form page text into a filesystem-safe slug.
///
/// Everything after the first `|` is discarded (sites append their own brand
/// suffix there), the remainder is lowercased and trimmed, characters outside
/// word characters, whitespace, and hyphens are removed, and whitespace runs
/// collapse to a single hyphen. Empty input produces `"unknown"`.
pub fn slugify(text: &str) -> String {
    let base = text.split('|').next().unwrap_or("").to_lowercase();
    let base = base.trim();

    let mut cleaned = String::with_capacity(base.len());
    for ch in base.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' || ch.is_whitespace() {
            cleaned.push(ch);
        }
    }

    let mut out = String::with_capacity(cleaned.len());
    let mut in_gap = false;
    for ch in cleaned.chars() {
        if ch.is_whitespace() {
            if !in_gap {
                out.push('-');
                in_gap = true;
            }
        } else {
            out.push(ch);
            in_gap = false;
        }
    }

    if out.is_empty() {
        "unknown".to_string()
    } else {
        out
    }
}

/// Slug for an optional source, falling back to `"unknown"` when absent.
pub fn slugify_opt(text: Option<&str>) -> String {
    match text {
        Some(t) => slugify(t),
        None => "unknown".to_string(),
    }
}
