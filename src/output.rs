//! Result types returned by the splitting pipeline.
//!
//! Everything here is plain data and serialisable, so the CLI can emit a
//! whole batch run as JSON and library callers can persist or diff runs.

use crate::error::FileError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Page layout of a label document, decided once before grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LayoutMode {
    /// Every page needing a SKU carries its own header/quantity block. (default)
    #[default]
    Standard,
    /// Labelled pages are followed by unlabelled continuation pages.
    Interleaved,
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutMode::Standard => f.write_str("Standard"),
            LayoutMode::Interleaved => f.write_str("Interleaved"),
        }
    }
}

/// One SKU and its ordered list of 0-indexed pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkuPages {
    pub sku: String,
    pub pages: Vec<usize>,
}

/// Outcome for one SKU output file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkuFile {
    /// 1-based sequence number used in the file name.
    pub sequence: usize,
    pub sku: String,
    /// Destination path (set even when writing failed).
    pub path: PathBuf,
    /// 0-indexed source pages actually copied, ascending.
    pub pages: Vec<usize>,
    /// `None` when the file was written.
    pub error: Option<FileError>,
}

impl SkuFile {
    /// Pages that count toward the written tally.
    pub fn pages_written(&self) -> usize {
        if self.error.is_none() {
            self.pages.len()
        } else {
            0
        }
    }
}

/// Verdict of the page-count cross-check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationStatus {
    Ok,
    Mismatch,
}

/// Result of [`crate::pipeline::verify::verify`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    pub status: VerificationStatus,
    /// Human-readable explanation of the verdict.
    pub note: String,
    /// 1-based numbers of pages without a SKU.
    pub skipped_pages: Vec<usize>,
    /// True when the skipped pages deserve a manual look (Standard mode only).
    pub inspect_recommended: bool,
}

/// Per-document outcome. Produced once per input PDF; never persisted here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitResult {
    pub source: PathBuf,
    /// Per-document output directory, if it was created.
    pub output_dir: Option<PathBuf>,
    pub total_pages: usize,
    pub pages_with_sku: usize,
    pub pages_written: usize,
    pub sku_count: usize,
    /// 1-based numbers of pages without a SKU.
    pub skipped_pages: Vec<usize>,
    pub mode: LayoutMode,
    pub files: Vec<SkuFile>,
    pub verification: Option<Verification>,
    pub success: bool,
    /// Fatal error message when the document failed at its boundary.
    pub error: Option<String>,
}

impl SplitResult {
    /// A failed document: zero pages reported, error message kept.
    pub fn failed(source: impl Into<PathBuf>, error: impl fmt::Display) -> Self {
        Self {
            source: source.into(),
            output_dir: None,
            total_pages: 0,
            pages_with_sku: 0,
            pages_written: 0,
            sku_count: 0,
            skipped_pages: Vec::new(),
            mode: LayoutMode::default(),
            files: Vec::new(),
            verification: None,
            success: false,
            error: Some(error.to_string()),
        }
    }

    /// Files whose write failed.
    pub fn failed_files(&self) -> impl Iterator<Item = &SkuFile> {
        self.files.iter().filter(|f| f.error.is_some())
    }
}

/// Aggregate over a batch of documents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub total_files: usize,
    /// Written pages summed over successful documents.
    pub total_pages_split: usize,
    pub documents: Vec<SplitResult>,
}

impl BatchSummary {
    /// Fold one document outcome into the summary.
    pub fn push(&mut self, result: SplitResult) {
        self.total_files += 1;
        if result.success {
            self.succeeded += 1;
            self.total_pages_split += result.pages_written;
        } else {
            self.failed += 1;
        }
        self.documents.push(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_result_reports_zero_pages() {
        let r = SplitResult::failed("a.pdf", "boom");
        assert!(!r.success);
        assert_eq!(r.pages_written, 0);
        assert_eq!(r.error.as_deref(), Some("boom"));
    }

    #[test]
    fn batch_counts_pages_of_successes_only() {
        let mut ok = SplitResult::failed("ok.pdf", "x");
        ok.success = true;
        ok.error = None;
        ok.pages_written = 7;
        let mut bad = SplitResult::failed("bad.pdf", "y");
        bad.pages_written = 3;

        let mut summary = BatchSummary::default();
        summary.push(ok);
        summary.push(bad);
        assert_eq!(summary.total_files, 2);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.total_pages_split, 7);
    }

    #[test]
    fn failed_file_counts_no_pages() {
        let f = SkuFile {
            sequence: 1,
            sku: "A".into(),
            path: PathBuf::from("1_A.pdf"),
            pages: vec![0, 1],
            error: Some(FileError::WriteFailed {
                sku: "A".into(),
                detail: "io".into(),
            }),
        };
        assert_eq!(f.pages_written(), 0);
    }

    #[test]
    fn layout_mode_display() {
        assert_eq!(LayoutMode::Interleaved.to_string(), "Interleaved");
        assert_eq!(LayoutMode::default(), LayoutMode::Standard);
    }
}
