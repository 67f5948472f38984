//! # sku-split
//!
//! Split shipping-label PDFs into one file per SKU.
//!
//! ## Why this crate?
//!
//! A shipment's box labels arrive as one large PDF. Packing works SKU by SKU,
//! so the labels need to be regrouped: every page of a SKU in its own file,
//! named so the files sort and identify themselves. This crate reads each
//! page's text layer, finds the SKU printed under the label's header line,
//! and writes one PDF per SKU with a page-count cross-check at the end.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input   resolve file or folder, shipment id, output directory
//!  ├─ 2. Mode    probe page 2: Standard (every page labelled) or Interleaved
//!  ├─ 3. Group   locate the SKU on every page, build the per-SKU page map
//!  ├─ 4. Write   one PDF per SKU, pages ascending
//!  └─ 5. Verify  labelled pages vs written pages
//! ```
//!
//! A CSV manifest can drive the split instead of page text; see
//! [`manifest`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sku_split::{process_path, NoopObserver, PdfiumBackend, SplitConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SplitConfig::default();
//!     let backend = PdfiumBackend::bind(config.pdfium_library.as_deref())?;
//!     let summary = process_path(Path::new("labels/"), &backend, &config, &NoopObserver)?;
//!     eprintln!("{} ok, {} failed, {} pages split",
//!         summary.succeeded, summary.failed, summary.total_pages_split);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `sku-split` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! sku-split = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod backend;
pub mod config;
pub mod document;
pub mod error;
pub mod manifest;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod sanitize;
pub mod split;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use backend::PdfiumBackend;
pub use config::{OverlapPolicy, SplitConfig, SplitConfigBuilder, WriteFailurePolicy};
pub use document::{DocumentBackend, LabelDocument, LineSequence};
pub use error::{FileError, SplitError};
pub use manifest::{pair_manifests, split_with_manifest, ManifestGroup, ShipmentManifest};
pub use output::{
    BatchSummary, LayoutMode, SkuFile, SkuPages, SplitResult, Verification, VerificationStatus,
};
pub use pipeline::locate::SkuLocator;
pub use progress::{NoopObserver, RecordingObserver, StatusObserver};
pub use sanitize::sanitize_filename;
pub use split::{process_document, process_path, try_split_document};
