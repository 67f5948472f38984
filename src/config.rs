//! Configuration types for label splitting.
//!
//! All splitting behaviour is controlled through [`SplitConfig`], built via
//! its [`SplitConfigBuilder`]. One struct holds every knob so a config can be
//! shared across worker threads, logged, and compared between runs.

use crate::error::SplitError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Header markers matched (lowercased, substring) against each line.
pub const DEFAULT_HEADER_MARKERS: [&str; 2] = ["single sku", "単一のsku"];

/// Quantity tokens; a quantity line is `<token><whitespace><digits>`.
pub const DEFAULT_QUANTITY_TOKENS: [&str; 3] = ["Menge", "Qty", "数量"];

/// Configuration for splitting label PDFs.
///
/// Built via [`SplitConfig::builder()`] or using [`SplitConfig::default()`].
///
/// # Example
/// ```rust
/// use sku_split::{SplitConfig, OverlapPolicy};
///
/// let config = SplitConfig::builder()
///     .quantity_token("Anzahl")
///     .overlap_policy(OverlapPolicy::Reject)
///     .build()
///     .unwrap();
/// assert_eq!(config.quantity_tokens.len(), 4);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Lowercase substrings identifying the SKU header line.
    /// Default: `["single sku", "単一のsku"]`.
    pub header_markers: Vec<String>,

    /// Tokens that introduce the quantity line, matched case-insensitively.
    /// Default: `["Menge", "Qty", "数量"]`.
    pub quantity_tokens: Vec<String>,

    /// Parent directory for the per-document output directories.
    /// If None, each output directory is created beside its input PDF.
    pub output_root: Option<PathBuf>,

    /// How per-SKU write failures affect the document verdict. Default: Soft.
    pub write_failure_policy: WriteFailurePolicy,

    /// What to do when interleaved spans share pages. Default: Allow.
    pub overlap_policy: OverlapPolicy,

    /// Treat a Standard-mode verification mismatch as a document failure.
    /// Default: false (verification is advisory).
    pub strict_verification: bool,

    /// Explicit path to the pdfium shared library.
    /// If None, `PDFIUM_LIB_PATH`, the working directory, then system paths.
    pub pdfium_library: Option<PathBuf>,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            header_markers: DEFAULT_HEADER_MARKERS.iter().map(|s| s.to_string()).collect(),
            quantity_tokens: DEFAULT_QUANTITY_TOKENS.iter().map(|s| s.to_string()).collect(),
            output_root: None,
            write_failure_policy: WriteFailurePolicy::default(),
            overlap_policy: OverlapPolicy::default(),
            strict_verification: false,
            pdfium_library: None,
        }
    }
}

impl SplitConfig {
    /// Create a new builder for `SplitConfig`.
    pub fn builder() -> SplitConfigBuilder {
        SplitConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`SplitConfig`].
#[derive(Debug)]
pub struct SplitConfigBuilder {
    config: SplitConfig,
}

impl SplitConfigBuilder {
    /// Replace the header markers. Markers are stored lowercased.
    pub fn header_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.header_markers = markers
            .into_iter()
            .map(|m| m.into().to_lowercase())
            .collect();
        self
    }

    /// Add one header marker to the current list.
    pub fn header_marker(mut self, marker: impl Into<String>) -> Self {
        self.config.header_markers.push(marker.into().to_lowercase());
        self
    }

    /// Replace the quantity tokens.
    pub fn quantity_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.quantity_tokens = tokens.into_iter().map(Into::into).collect();
        self
    }

    /// Add one quantity token to the current list.
    pub fn quantity_token(mut self, token: impl Into<String>) -> Self {
        self.config.quantity_tokens.push(token.into());
        self
    }

    pub fn output_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_root = Some(dir.into());
        self
    }

    pub fn write_failure_policy(mut self, policy: WriteFailurePolicy) -> Self {
        self.config.write_failure_policy = policy;
        self
    }

    pub fn overlap_policy(mut self, policy: OverlapPolicy) -> Self {
        self.config.overlap_policy = policy;
        self
    }

    pub fn strict_verification(mut self, v: bool) -> Self {
        self.config.strict_verification = v;
        self
    }

    pub fn pdfium_library(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library = Some(path.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SplitConfig, SplitError> {
        let c = &self.config;
        if c.header_markers.is_empty() {
            return Err(SplitError::InvalidConfig(
                "At least one header marker is required".into(),
            ));
        }
        if c.header_markers.iter().any(|m| m.trim().is_empty()) {
            return Err(SplitError::InvalidConfig(
                "Header markers must not be blank".into(),
            ));
        }
        if c.quantity_tokens.is_empty() {
            return Err(SplitError::InvalidConfig(
                "At least one quantity token is required".into(),
            ));
        }
        if let Some(bad) = c
            .quantity_tokens
            .iter()
            .find(|t| t.trim().is_empty() || t.chars().any(char::is_whitespace))
        {
            return Err(SplitError::InvalidConfig(format!(
                "Quantity token {bad:?} must be a single non-blank word"
            )));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Whether a failed SKU file write marks the whole document as failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WriteFailurePolicy {
    /// Failed files reduce the written-page tally only. (default)
    #[default]
    Soft,
    /// Any failed file marks the document failed; remaining SKUs are still written.
    Hard,
}

/// Handling of pages claimed by more than one interleaved span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OverlapPolicy {
    /// Shared pages are written into every claiming file, with a warning. (default)
    #[default]
    Allow,
    /// Fail the document before any file is written.
    Reject,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_label_template() {
        let c = SplitConfig::default();
        assert_eq!(c.header_markers, vec!["single sku", "単一のsku"]);
        assert_eq!(c.quantity_tokens, vec!["Menge", "Qty", "数量"]);
        assert_eq!(c.write_failure_policy, WriteFailurePolicy::Soft);
        assert_eq!(c.overlap_policy, OverlapPolicy::Allow);
        assert!(!c.strict_verification);
    }

    #[test]
    fn header_markers_are_lowercased() {
        let c = SplitConfig::builder()
            .header_markers(["Single SKU", "Einzelne SKU"])
            .build()
            .unwrap();
        assert_eq!(c.header_markers, vec!["single sku", "einzelne sku"]);
    }

    #[test]
    fn empty_token_list_rejected() {
        let err = SplitConfig::builder()
            .quantity_tokens(Vec::<String>::new())
            .build()
            .unwrap_err();
        assert!(matches!(err, SplitError::InvalidConfig(_)));
    }

    #[test]
    fn token_with_space_rejected() {
        let err = SplitConfig::builder()
            .quantity_token("Qty per box")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Qty per box"));
    }

    #[test]
    fn blank_marker_rejected() {
        assert!(SplitConfig::builder().header_marker("  ").build().is_err());
    }
}
