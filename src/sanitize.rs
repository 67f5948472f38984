//! Filename sanitising for output PDFs.
//!
//! SKUs and shipment identifiers come straight from label text and file
//! names, so they may contain characters that Windows or macOS refuse in a
//! file name. [`sanitize_filename`] is total and deterministic, and applying
//! it twice gives the same result as applying it once.

use once_cell::sync::Lazy;
use regex::Regex;

// Characters invalid on Windows plus the non-whitespace control range.
static RE_INVALID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[\\/*?:"<>|\x00-\x08\x0E-\x1F\x7F]"#).unwrap());

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Make `name` safe to use as a file or directory name.
///
/// 1. Remove characters invalid on common filesystems.
/// 2. Replace every whitespace run with a single `_`.
/// 3. Trim leading and trailing `_`.
pub fn sanitize_filename(name: &str) -> String {
    let s = RE_INVALID.replace_all(name, "");
    let s = RE_WHITESPACE.replace_all(&s, "_");
    s.trim_matches(|c: char| c == '_' || c.is_whitespace())
        .to_string()
}
