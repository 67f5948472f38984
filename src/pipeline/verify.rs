//! Run verification: cross-check found pages against written pages.
//!
//! In Standard mode every labelled page should land in exactly one file, so
//! the two counts must agree. In Interleaved mode continuation pages inflate
//! the written count, so only an informational note is produced.

use crate::output::{LayoutMode, Verification, VerificationStatus};

/// Build the verification verdict for one document.
pub fn verify(
    total_pages: usize,
    pages_with_sku: usize,
    pages_written: usize,
    mode: LayoutMode,
    skipped_pages: &[usize],
) -> Verification {
    let (status, note) = match mode {
        LayoutMode::Interleaved => (
            VerificationStatus::Ok,
            format!(
                "Interleaved mode used; page ranges include the page following the last SKU \
                 occurrence ({pages_with_sku} of {total_pages} pages labelled, {pages_written} written)."
            ),
        ),
        LayoutMode::Standard if pages_with_sku == pages_written => (
            VerificationStatus::Ok,
            format!("All {pages_with_sku} labelled pages written ({total_pages} pages in source)."),
        ),
        LayoutMode::Standard => (
            VerificationStatus::Mismatch,
            format!(
                "Verification FAILED (Standard mode): SKU found on {pages_with_sku} pages \
                 but {pages_written} pages written."
            ),
        ),
    };

    Verification {
        status,
        note,
        skipped_pages: skipped_pages.to_vec(),
        inspect_recommended: mode == LayoutMode::Standard && !skipped_pages.is_empty(),
    }
}

/// Status lines for a verdict, in the order they are reported.
pub fn report_lines(
    total_pages: usize,
    pages_with_sku: usize,
    pages_written: usize,
    verification: &Verification,
) -> Vec<String> {
    let mut lines = vec![
        "Verification:".to_string(),
        format!("  Original pages: {total_pages}"),
        format!("  Pages where SKU found: {pages_with_sku}"),
        format!("  Total pages written to split PDFs: {pages_written}"),
        format!("  {}", verification.note),
    ];
    if !verification.skipped_pages.is_empty() {
        lines.push(format!(
            "  Note: {} page(s) were skipped (no SKU found): {:?}",
            verification.skipped_pages.len(),
            verification.skipped_pages
        ));
        if verification.inspect_recommended {
            lines.push("  It's recommended to check the original PDF for these pages.".to_string());
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_equal_counts_ok() {
        let v = verify(4, 4, 4, LayoutMode::Standard, &[]);
        assert_eq!(v.status, VerificationStatus::Ok);
        assert!(!v.inspect_recommended);
    }

    #[test]
    fn standard_shortfall_is_mismatch() {
        let v = verify(4, 4, 3, LayoutMode::Standard, &[]);
        assert_eq!(v.status, VerificationStatus::Mismatch);
        assert!(v.note.contains("FAILED"));
    }

    #[test]
    fn interleaved_never_mismatches() {
        let v = verify(10, 3, 6, LayoutMode::Interleaved, &[2, 4, 6]);
        assert_eq!(v.status, VerificationStatus::Ok);
        assert!(v.note.contains("Interleaved"));
        assert!(!v.inspect_recommended);
        assert_eq!(v.skipped_pages, vec![2, 4, 6]);
    }

    #[test]
    fn standard_skips_recommend_inspection() {
        let v = verify(3, 2, 2, LayoutMode::Standard, &[2]);
        assert_eq!(v.status, VerificationStatus::Ok);
        assert!(v.inspect_recommended);
        let lines = report_lines(3, 2, 2, &v);
        assert!(lines.iter().any(|l| l.contains("[2]")));
        assert!(lines.iter().any(|l| l.contains("recommended")));
    }

    #[test]
    fn interleaved_skips_reported_without_recommendation() {
        let v = verify(3, 1, 2, LayoutMode::Interleaved, &[2, 3]);
        let lines = report_lines(3, 1, 2, &v);
        assert!(lines.iter().any(|l| l.contains("2 page(s) were skipped")));
        assert!(!lines.iter().any(|l| l.contains("recommended")));
    }
}
