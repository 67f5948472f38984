//! SKU locating: find the SKU printed under a label's SKU header.
//!
//! ## Layout
//!
//! The label template prints, top to bottom:
//!
//! ```text
//! Single SKU            ← header marker (any language variant)
//! ABC-123               ← SKU, one line ...
//! Qty 4                 ← quantity marker
//! ```
//!
//! or, when the SKU is too long for one printed line:
//!
//! ```text
//! Single SKU
//! ABC-123-VERY-LONG-
//! VARIANT-XL            ← ... or wrapped onto two lines
//! Qty 4
//! ```
//!
//! The position of the quantity line relative to the header tells the two
//! cases apart: header+2 means a one-line SKU, header+3 a two-line SKU. The
//! SKU's own shape is never used to decide, only validated afterwards
//! against a permissive character class.

use crate::config::SplitConfig;
use crate::document::LineSequence;
use crate::error::SplitError;
use once_cell::sync::Lazy;
use regex::Regex;

static RE_VALID_SKU: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.+-]+$").unwrap());

/// A validated SKU and the 0-indexed page it was found on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkuRecord {
    pub sku: String,
    pub page_index: usize,
}

/// Locates SKUs in page text. Built once per run from a [`SplitConfig`].
#[derive(Debug, Clone)]
pub struct SkuLocator {
    header_markers: Vec<String>,
    quantity_line: Regex,
}

impl Default for SkuLocator {
    fn default() -> Self {
        // Default markers/tokens always yield a valid pattern.
        Self::from_config(&SplitConfig::default()).unwrap()
    }
}

impl SkuLocator {
    /// Build a locator from the configured header markers and quantity tokens.
    pub fn from_config(config: &SplitConfig) -> Result<Self, SplitError> {
        let tokens = config
            .quantity_tokens
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|");
        let quantity_line = Regex::new(&format!(r"(?i)(?:{tokens})\s+\d+"))
            .map_err(|e| SplitError::InvalidConfig(format!("quantity tokens: {e}")))?;

        Ok(Self {
            header_markers: config
                .header_markers
                .iter()
                .map(|m| m.to_lowercase())
                .collect(),
            quantity_line,
        })
    }

    /// Return the SKU on a page, or `None` when the page carries none.
    ///
    /// Only the first header line is considered. Never fails: short or
    /// malformed line sequences simply yield `None`.
    pub fn locate(&self, lines: &LineSequence) -> Option<String> {
        let header = self.find_header(lines)?;
        let candidate = self.candidate_after(lines, header)?;
        if is_valid_sku(&candidate) {
            Some(candidate)
        } else {
            None
        }
    }

    /// Locate and wrap into a [`SkuRecord`] for `page_index`.
    pub fn locate_record(&self, lines: &LineSequence, page_index: usize) -> Option<SkuRecord> {
        self.locate(lines).map(|sku| SkuRecord { sku, page_index })
    }

    fn find_header(&self, lines: &LineSequence) -> Option<usize> {
        lines.iter().position(|line| {
            let lower = line.to_lowercase();
            self.header_markers.iter().any(|m| lower.contains(m.as_str()))
        })
    }

    fn is_quantity_line(&self, line: Option<&str>) -> bool {
        line.is_some_and(|l| self.quantity_line.is_match(l))
    }

    fn candidate_after(&self, lines: &LineSequence, header: usize) -> Option<String> {
        if self.is_quantity_line(lines.get(header + 2)) {
            return lines.get(header + 1).map(str::to_string);
        }
        if self.is_quantity_line(lines.get(header + 3)) {
            let first = lines.get(header + 1)?;
            let second = lines.get(header + 2)?;
            return Some(format!("{first}{second}"));
        }
        None
    }
}

/// Full-string check against `[A-Za-z0-9_.+-]+`.
pub fn is_valid_sku(candidate: &str) -> bool {
    RE_VALID_SKU.is_match(candidate)
}
