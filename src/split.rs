//! Per-document pipeline and batch driver.
//!
//! [`try_split_document`] runs every stage for one PDF and returns the first
//! fatal error. [`process_document`] wraps it at the document boundary: a
//! fatal error becomes a failed [`SplitResult`] with zero pages, so a batch
//! always gets one complete outcome per document. [`process_path`] runs the
//! pipeline once per PDF of a file-or-folder input, strictly in order.
//!
//! Documents share no mutable state; callers wanting parallelism can run
//! [`process_document`] for different files on separate threads with a
//! `Sync` backend.

use crate::config::{OverlapPolicy, SplitConfig, WriteFailurePolicy};
use crate::document::DocumentBackend;
use crate::error::SplitError;
use crate::output::{BatchSummary, SplitResult, VerificationStatus};
use crate::pipeline::group::{self, PageOverlap};
use crate::pipeline::input::{self, ResolvedInput};
use crate::pipeline::locate::SkuLocator;
use crate::pipeline::write::{self, NamingContext};
use crate::pipeline::{mode, verify};
use crate::progress::StatusObserver;
use std::path::Path;
use std::time::Instant;
use tracing::{error, info, warn};

/// Split one PDF, propagating fatal errors.
///
/// # Errors
/// Returns `Err(SplitError)` when the document cannot be opened, has no
/// pages, its output directory cannot be created, or interleaved spans
/// overlap under [`OverlapPolicy::Reject`]. Per-SKU write failures and
/// verification mismatches are reported inside the `SplitResult`.
pub fn try_split_document(
    pdf_path: &Path,
    backend: &dyn DocumentBackend,
    config: &SplitConfig,
    observer: &dyn StatusObserver,
) -> Result<SplitResult, SplitError> {
    let start = Instant::now();
    let file_name = pdf_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| pdf_path.display().to_string());
    observer.report(&format!("Processing PDF: {file_name}"));
    info!("Splitting {}", pdf_path.display());

    let locator = SkuLocator::from_config(config)?;
    let shipment_id = input::shipment_id(pdf_path);

    // ── Step 1: Open ─────────────────────────────────────────────────────
    let document = backend.open(pdf_path)?;
    let total_pages = document.page_count();
    if total_pages == 0 {
        return Err(SplitError::EmptyDocument {
            path: pdf_path.to_path_buf(),
        });
    }

    // ── Step 2: Layout mode ──────────────────────────────────────────────
    let probe = mode::probe(document.as_ref(), &locator);
    let layout = probe.mode();
    observer.report(&probe.describe());
    info!("{}: {} pages, {} mode", file_name, total_pages, layout);

    // ── Step 3: Output directory ─────────────────────────────────────────
    let output_dir = input::output_dir_for(
        pdf_path,
        &shipment_id,
        total_pages,
        config.output_root.as_deref(),
    );
    input::ensure_dir(&output_dir)?;
    observer.report(&format!("Shipping ID: {shipment_id}"));
    observer.report(&format!("Total pages: {total_pages}"));
    observer.report(&format!("Output dir: {}", output_dir.display()));

    // ── Step 4: Scan and group ───────────────────────────────────────────
    observer.report(&format!("Scanning {total_pages} pages..."));
    let grouping = group::group(document.as_ref(), &locator, layout);
    let pages_with_sku = grouping.discovery.page_total();
    observer.report(&format!(
        "Finished scanning. Found {} unique SKUs across {} pages.",
        grouping.discovery.len(),
        pages_with_sku
    ));

    let overlaps = grouping.output.overlaps();
    if !overlaps.is_empty() {
        handle_overlaps(&overlaps, config.overlap_policy, observer)?;
    }

    // ── Step 5: Write ────────────────────────────────────────────────────
    let report = if grouping.output.is_empty() {
        observer.report("No SKUs found in this document. No split PDFs created.");
        write::WriteReport::default()
    } else {
        let naming = NamingContext {
            shipment_id: shipment_id.clone(),
            output_dir: output_dir.clone(),
        };
        let report = write::write(document.as_ref(), &grouping.output, &naming, observer);
        observer.report(&format!("Finished creating split PDFs for {file_name}."));
        report
    };

    // ── Step 6: Verify ───────────────────────────────────────────────────
    let verification = verify::verify(
        total_pages,
        pages_with_sku,
        report.pages_written,
        layout,
        &grouping.skipped_pages,
    );
    for line in verify::report_lines(total_pages, pages_with_sku, report.pages_written, &verification) {
        observer.report(&line);
    }

    // ── Step 7: Verdict ──────────────────────────────────────────────────
    let mut failure = None;
    if config.write_failure_policy == WriteFailurePolicy::Hard && report.has_failures() {
        let failed = report.files.iter().filter(|f| f.error.is_some()).count();
        failure = Some(format!("{failed} SKU file(s) could not be written"));
    }
    if config.strict_verification && verification.status == VerificationStatus::Mismatch {
        failure.get_or_insert_with(|| verification.note.clone());
    }
    if let Some(ref reason) = failure {
        warn!("{}: marked failed: {}", file_name, reason);
    }

    info!(
        "{}: {} SKUs, {}/{} pages written in {}ms",
        file_name,
        grouping.discovery.len(),
        report.pages_written,
        total_pages,
        start.elapsed().as_millis()
    );

    Ok(SplitResult {
        source: pdf_path.to_path_buf(),
        output_dir: Some(output_dir),
        total_pages,
        pages_with_sku,
        pages_written: report.pages_written,
        sku_count: grouping.discovery.len(),
        skipped_pages: grouping.skipped_pages,
        mode: layout,
        files: report.files,
        verification: Some(verification),
        success: failure.is_none(),
        error: failure,
    })
}

fn handle_overlaps(
    overlaps: &[PageOverlap],
    policy: OverlapPolicy,
    observer: &dyn StatusObserver,
) -> Result<(), SplitError> {
    let pages: Vec<usize> = overlaps.iter().map(|o| o.page + 1).collect();
    match (policy, overlaps.first()) {
        (_, None) => Ok(()),
        (OverlapPolicy::Reject, Some(lowest)) => Err(SplitError::OverlappingSpans {
            page: lowest.page + 1,
            first: lowest.first.clone(),
            second: lowest.second.clone(),
        }),
        (OverlapPolicy::Allow, Some(_)) => {
            warn!("Interleaved spans overlap on pages {:?}", pages);
            observer.report(&format!(
                "Warn: page(s) {pages:?} fall into more than one SKU's range and will appear in each file."
            ));
            Ok(())
        }
    }
}

/// Split one PDF; never fails.
///
/// Fatal errors are logged, reported to `observer` and returned as a failed
/// result with zero pages. The source document is closed on every path.
pub fn process_document(
    pdf_path: &Path,
    backend: &dyn DocumentBackend,
    config: &SplitConfig,
    observer: &dyn StatusObserver,
) -> SplitResult {
    match try_split_document(pdf_path, backend, config, observer) {
        Ok(result) => result,
        Err(e) => {
            error!("Failed to split {}: {}", pdf_path.display(), e);
            observer.report(&format!("Error processing {}: {}", pdf_path.display(), e));
            SplitResult::failed(pdf_path, e)
        }
    }
}

/// Split a PDF file or every PDF in a folder.
///
/// # Errors
/// Only when `input_path` itself cannot be resolved. Per-document failures
/// are counted in the returned [`BatchSummary`].
pub fn process_path(
    input_path: &Path,
    backend: &dyn DocumentBackend,
    config: &SplitConfig,
    observer: &dyn StatusObserver,
) -> Result<BatchSummary, SplitError> {
    let resolved = input::resolve_input(input_path)?;
    let pdfs = resolved.pdfs();

    if let ResolvedInput::Folder { .. } = resolved {
        observer.report(&format!("Found {} PDF(s) in the folder.", pdfs.len()));
        if pdfs.is_empty() {
            observer.report("No PDF files found in the selected folder.");
        }
    }

    let total = pdfs.len();
    let mut summary = BatchSummary::default();
    for (i, pdf) in pdfs.iter().enumerate() {
        if total > 1 {
            observer.report(&format!("--- Processing file {}/{} ---", i + 1, total));
        }
        summary.push(process_document(pdf, backend, config, observer));
    }

    info!(
        "Batch complete: {} succeeded, {} failed, {} pages split",
        summary.succeeded, summary.failed, summary.total_pages_split
    );
    Ok(summary)
}
