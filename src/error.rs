//! Error types for the sku-split library.
//!
//! Two distinct error types reflect two distinct failure scopes:
//!
//! * [`SplitError`]: **Fatal** for one document (or one batch input): the
//!   PDF cannot be opened, has no pages, the output directory cannot be
//!   created, a manifest is unusable. Returned as `Err(SplitError)` from
//!   [`crate::split::try_split_document`] and folded into a failed
//!   [`crate::output::SplitResult`] by [`crate::split::process_document`].
//!
//! * [`FileError`]: **Non-fatal**: one SKU's output file could not be
//!   written, but every other SKU is fine. Stored inside
//!   [`crate::output::SkuFile`] so callers can inspect partial success.
//!
//! Page-level text extraction failures are not errors at all from the
//! pipeline's point of view: the page is recorded as skipped.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the sku-split library.
#[derive(Debug, Error)]
pub enum SplitError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file or folder was not found at the given path.
    #[error("Input not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input exists but reading it failed for another IO reason.
    #[error("Cannot read '{path}': {source}")]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' could not be opened: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF opened but contains no pages.
    #[error("PDF '{path}' has no pages")]
    EmptyDocument { path: PathBuf },

    /// Text layer of a single page could not be read (1-indexed page).
    #[error("Could not read text of page {page}: {detail}")]
    PageText { page: usize, detail: String },

    /// Building or saving an output PDF failed.
    #[error("Failed to export pages to '{path}': {detail}")]
    ExportFailed { path: PathBuf, detail: String },

    /// Could not create the per-document output directory.
    #[error("Failed to create output directory '{path}': {source}")]
    OutputDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Grouping errors ───────────────────────────────────────────────────
    /// Two interleaved spans claim the same page and overlap is rejected.
    #[error(
        "Page {page} belongs to both '{first}' and '{second}' after interleaved expansion\n\
         Rerun without --reject-overlap to keep the overlapping pages in both files."
    )]
    OverlappingSpans {
        page: usize,
        first: String,
        second: String,
    },

    // ── Manifest errors ───────────────────────────────────────────────────
    /// The CSV manifest is unreadable or lacks the required header.
    #[error("Invalid manifest '{path}': {detail}")]
    ManifestInvalid { path: PathBuf, detail: String },

    /// The PDF page count does not equal the boxes declared by the manifest.
    #[error("PDF page count ({pages}) does not match total boxes in CSV ({boxes})")]
    ManifestPageMismatch { pages: usize, boxes: usize },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
PDFium must be available as a shared library. You can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium (or pass --pdfium-lib).\n\
  • Place libpdfium next to the working directory.\n\
  • Install libpdfium into a system library path.\n"
    )]
    PdfiumBindingFailed(String),
}

/// A non-fatal error for a single SKU output file.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum FileError {
    /// After dropping out-of-range indices nothing was left to write.
    #[error("SKU '{sku}': no valid pages to write, file not saved")]
    NoValidPages { sku: String },

    /// Building or saving the file failed.
    #[error("SKU '{sku}': write failed: {detail}")]
    WriteFailed { sku: String, detail: String },
}
