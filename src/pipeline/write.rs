//! Output writing: one PDF per SKU in the output map.
//!
//! Files are written strictly in output-map order. A failure on one SKU is
//! logged and recorded on its [`SkuFile`]; the remaining SKUs are still
//! written. Every file holds its pages in ascending order whatever order the
//! map stores them in.

use crate::document::LabelDocument;
use crate::error::FileError;
use crate::output::SkuFile;
use crate::pipeline::group::OutputMap;
use crate::progress::StatusObserver;
use crate::sanitize::sanitize_filename;
use std::path::PathBuf;
use tracing::{info, warn};

/// Where and under which shipment name files are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingContext {
    pub shipment_id: String,
    pub output_dir: PathBuf,
}

/// What the writer produced.
#[derive(Debug, Clone, Default)]
pub struct WriteReport {
    pub files: Vec<SkuFile>,
    /// Pages in files that were actually saved.
    pub pages_written: usize,
}

impl WriteReport {
    pub fn has_failures(&self) -> bool {
        self.files.iter().any(|f| f.error.is_some())
    }
}

/// `{sequence}_{sku}_{shipment}_{count}.pdf`, sanitized; empty parts dropped.
pub fn output_file_name(sequence: usize, sku: &str, shipment_id: &str, page_count: usize) -> String {
    let sequence = sequence.to_string();
    let count = page_count.to_string();
    let base = [sequence.as_str(), sku, shipment_id, count.as_str()]
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("_");
    format!("{}.pdf", sanitize_filename(&base))
}

/// Write one file per SKU of `output` into `naming.output_dir`.
pub fn write(
    document: &dyn LabelDocument,
    output: &OutputMap,
    naming: &NamingContext,
    observer: &dyn StatusObserver,
) -> WriteReport {
    let total_pages = document.page_count();
    observer.report(&format!(
        "Creating {} split PDF(s)...",
        output.entries().len()
    ));

    let mut report = WriteReport::default();
    let mut sequence = 0;

    for entry in output.entries() {
        if entry.pages.is_empty() {
            observer.report(&format!("Skipping SKU '{}' due to empty page list.", entry.sku));
            continue;
        }
        sequence += 1;

        let mut pages: Vec<usize> = Vec::with_capacity(entry.pages.len());
        for &page in &entry.pages {
            if page < total_pages {
                pages.push(page);
            } else {
                warn!("SKU '{}': page {} out of range ({} pages)", entry.sku, page + 1, total_pages);
                observer.report(&format!(
                    "Warn: invalid page number {} requested for SKU '{}'. Skipping.",
                    page + 1,
                    entry.sku
                ));
            }
        }
        pages.sort_unstable();
        pages.dedup();

        let file_name = output_file_name(sequence, &entry.sku, &naming.shipment_id, pages.len());
        let path = naming.output_dir.join(&file_name);

        let error = match (pages.first(), pages.last()) {
            (Some(first), Some(last)) => {
                observer.report(&format!(
                    "Creating: {} ({} pages: {} to {})",
                    file_name,
                    pages.len(),
                    first + 1,
                    last + 1
                ));
                match document.export_pages(&pages, &path) {
                    Ok(()) => {
                        info!("Wrote {} ({} pages)", path.display(), pages.len());
                        None
                    }
                    Err(e) => {
                        warn!("Failed to write {}: {}", path.display(), e);
                        observer.report(&format!("Error creating/saving PDF {}: {}", path.display(), e));
                        Some(FileError::WriteFailed {
                            sku: entry.sku.clone(),
                            detail: e.to_string(),
                        })
                    }
                }
            }
            _ => {
                observer.report(&format!("Warn: no valid pages for {file_name}. File not saved."));
                Some(FileError::NoValidPages {
                    sku: entry.sku.clone(),
                })
            }
        };

        let file = SkuFile {
            sequence,
            sku: entry.sku.clone(),
            path,
            pages,
            error,
        };
        report.pages_written += file.pages_written();
        report.files.push(file);
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SplitError;
    use crate::output::LayoutMode;
    use crate::pipeline::group::DiscoveryMap;
    use crate::pipeline::locate::SkuRecord;
    use crate::progress::RecordingObserver;
    use std::path::Path;
    use std::sync::Mutex;

    /// Blank pages; remembers what was exported instead of saving it.
    struct BlankDoc {
        pages: usize,
        exports: Mutex<Vec<Vec<usize>>>,
    }

    impl BlankDoc {
        fn new(pages: usize) -> Self {
            Self {
                pages,
                exports: Mutex::new(Vec::new()),
            }
        }
    }

    impl LabelDocument for BlankDoc {
        fn page_count(&self) -> usize {
            self.pages
        }

        fn page_text(&self, _index: usize) -> Result<String, SplitError> {
            Ok(String::new())
        }

        fn export_pages(&self, pages: &[usize], _destination: &Path) -> Result<(), SplitError> {
            self.exports.lock().unwrap().push(pages.to_vec());
            Ok(())
        }
    }

    fn record(sku: &str, page_index: usize) -> SkuRecord {
        SkuRecord {
            sku: sku.into(),
            page_index,
        }
    }

    #[test]
    fn sku_with_only_out_of_range_pages_is_not_saved() {
        let doc = BlankDoc::new(3);
        let discovery = DiscoveryMap::from_records(&[record("A", 9), record("B", 1)]);
        let output = OutputMap::from_discovery(&discovery, LayoutMode::Standard, 3);
        let naming = NamingContext {
            shipment_id: "S".into(),
            output_dir: PathBuf::from("/out"),
        };
        let observer = RecordingObserver::default();

        let report = write(&doc, &output, &naming, &observer);

        assert_eq!(report.files.len(), 2);
        assert_eq!(report.files[0].sequence, 1);
        assert_eq!(
            report.files[0].error,
            Some(FileError::NoValidPages { sku: "A".into() })
        );
        assert!(report.files[0].pages.is_empty());
        assert_eq!(report.files[1].sequence, 2);
        assert!(report.files[1].error.is_none());
        assert_eq!(report.files[1].path, PathBuf::from("/out/2_B_S_1.pdf"));
        assert_eq!(report.pages_written, 1);
        assert!(report.has_failures());

        assert_eq!(*doc.exports.lock().unwrap(), vec![vec![1]]);
        assert!(observer.saw("invalid page number 10 requested for SKU 'A'"));
        assert!(observer.saw("no valid pages for 1_A_S_0.pdf"));
    }

    #[test]
    fn file_name_joins_parts() {
        assert_eq!(output_file_name(1, "ABC-1", "FBA15XYZ", 3), "1_ABC-1_FBA15XYZ_3.pdf");
    }

    #[test]
    fn file_name_drops_empty_shipment() {
        assert_eq!(output_file_name(2, "ABC", "", 1), "2_ABC_1.pdf");
    }

    #[test]
    fn file_name_is_sanitized() {
        assert_eq!(
            output_file_name(1, "A", "my shipment: 1", 2),
            "1_A_my_shipment_1_2.pdf"
        );
    }
}
