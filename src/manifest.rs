//! CSV-driven splitting.
//!
//! A shipment manifest (the CSV export of a shipment's box contents) fixes
//! the page layout up front: one page per box, boxes ordered by Box ID, and
//! all boxes of a SKU printed consecutively. No page text is read; the
//! manifest alone decides which pages go into which file.
//!
//! ```text
//! Shipment ID,FBA15XYZ
//! ...
//! SKU,ASIN,Title,Total boxes,Box ID
//! ABC-1,B0001,Widget,2,"FBA15XYZU000001,FBA15XYZU000002"
//! DEF-2,B0002,Gadget,1,FBA15XYZU000003
//! ```

use crate::document::DocumentBackend;
use crate::error::SplitError;
use crate::output::SkuFile;
use crate::pipeline::input::{self, has_pdf_extension};
use crate::progress::StatusObserver;
use crate::sanitize::sanitize_filename;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const SHIPMENT_LABEL: &str = "Shipment ID";
const UNKNOWN_SHIPMENT: &str = "UNKNOWN";

static SHIPMENT_IN_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"FBA\w+").unwrap());

/// A run of consecutive pages belonging to one SKU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestGroup {
    /// Data-row number (relative to the header) of the SKU's first box.
    pub row: usize,
    pub sku: String,
    pub asin: String,
    pub total_boxes: usize,
    /// 1-based, inclusive.
    pub first_page: usize,
    /// 1-based, inclusive.
    pub last_page: usize,
}

impl ManifestGroup {
    /// 0-indexed source pages of this group.
    pub fn page_indices(&self) -> Vec<usize> {
        (self.first_page - 1..self.last_page).collect()
    }

    /// `{row}_{shipment}_{sku}_{asin}_{boxes}boxes.pdf`, sanitized.
    pub fn file_name(&self, shipment_id: &str) -> String {
        let base = format!(
            "{}_{}_{}_{}_{}boxes",
            self.row, shipment_id, self.sku, self.asin, self.total_boxes
        );
        format!("{}.pdf", sanitize_filename(&base))
    }
}

/// A parsed shipment manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShipmentManifest {
    pub source: PathBuf,
    pub shipment_id: String,
    pub groups: Vec<ManifestGroup>,
}

struct BoxRow {
    row: usize,
    sku: String,
    asin: String,
    box_id: String,
}

struct Columns {
    sku: usize,
    asin: usize,
    box_id: usize,
}

impl Columns {
    fn find(record: &[String]) -> Option<Self> {
        let pos = |name: &str| record.iter().position(|f| f == name);
        Some(Self {
            sku: pos("SKU")?,
            asin: pos("ASIN")?,
            box_id: pos("Box ID")?,
        })
    }

    fn widest(&self) -> usize {
        self.sku.max(self.asin).max(self.box_id)
    }
}

impl ShipmentManifest {
    /// Read and group the manifest at `path`.
    pub fn from_path(path: &Path) -> Result<Self, SplitError> {
        let file = fs::File::open(path).map_err(|e| SplitError::ManifestInvalid {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
        Self::from_reader(file, path)
    }

    /// Parse manifest CSV from `reader`; `source` names it in errors.
    pub fn from_reader<R: Read>(reader: R, source: &Path) -> Result<Self, SplitError> {
        let invalid = |detail: String| SplitError::ManifestInvalid {
            path: source.to_path_buf(),
            detail,
        };

        let mut csv = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut records: Vec<Vec<String>> = Vec::new();
        for record in csv.records() {
            let record = record.map_err(|e| invalid(e.to_string()))?;
            records.push(
                record
                    .iter()
                    .map(|f| f.trim_start_matches('\u{feff}').trim().to_string())
                    .collect(),
            );
        }

        let (header_index, columns) = records
            .iter()
            .enumerate()
            .find_map(|(i, r)| Columns::find(r).map(|c| (i, c)))
            .ok_or_else(|| invalid("no header row with SKU, ASIN and Box ID columns".into()))?;
        debug!("Manifest header at record {}", header_index);

        let shipment_id = records[..header_index]
            .iter()
            .find(|r| r.iter().any(|f| f.contains(SHIPMENT_LABEL)))
            .and_then(|r| r.get(1))
            .map(|id| id.trim_matches('"').trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| {
                warn!("No shipment id in {}, using {}", source.display(), UNKNOWN_SHIPMENT);
                UNKNOWN_SHIPMENT.to_string()
            });

        let mut boxes: Vec<BoxRow> = Vec::new();
        for (i, record) in records.iter().enumerate().skip(header_index + 1) {
            if record.len() <= columns.widest() {
                continue;
            }
            for box_id in record[columns.box_id].split(',').map(str::trim) {
                if box_id.is_empty() {
                    continue;
                }
                boxes.push(BoxRow {
                    row: i - header_index,
                    sku: record[columns.sku].clone(),
                    asin: record[columns.asin].clone(),
                    box_id: box_id.to_string(),
                });
            }
        }
        boxes.sort_by(|a, b| a.box_id.cmp(&b.box_id));

        let groups = group_boxes(&boxes);
        info!(
            "Manifest {}: shipment {}, {} SKU group(s), {} box(es)",
            source.display(),
            shipment_id,
            groups.len(),
            boxes.len()
        );

        Ok(Self {
            source: source.to_path_buf(),
            shipment_id,
            groups,
        })
    }

    /// Boxes declared across all groups; equals the expected page count.
    pub fn total_boxes(&self) -> usize {
        self.groups.iter().map(|g| g.total_boxes).sum()
    }
}

/// Group box rows by SKU in first-seen order, assigning consecutive pages.
fn group_boxes(boxes: &[BoxRow]) -> Vec<ManifestGroup> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<ManifestGroup> = Vec::new();
    for b in boxes {
        match slots.get(b.sku.as_str()).copied() {
            Some(slot) => groups[slot].total_boxes += 1,
            None => {
                slots.insert(&b.sku, groups.len());
                groups.push(ManifestGroup {
                    row: b.row,
                    sku: b.sku.clone(),
                    asin: b.asin.clone(),
                    total_boxes: 1,
                    first_page: 0,
                    last_page: 0,
                });
            }
        }
    }

    let mut next_page = 1;
    for g in &mut groups {
        g.first_page = next_page;
        g.last_page = next_page + g.total_boxes - 1;
        next_page = g.last_page + 1;
    }
    groups
}

/// Files produced by [`split_with_manifest`].
#[derive(Debug, Clone, Serialize)]
pub struct ManifestSplit {
    pub output_dir: PathBuf,
    pub files: Vec<SkuFile>,
    pub pages_written: usize,
}

/// `shipment_{id}` beside `pdf_path`.
pub fn default_output_dir(pdf_path: &Path, shipment_id: &str) -> PathBuf {
    pdf_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default()
        .join(sanitize_filename(&format!("shipment_{shipment_id}")))
}

/// Split `pdf_path` into one file per manifest group.
///
/// # Errors
/// The page count must equal [`ShipmentManifest::total_boxes`]; otherwise
/// `ManifestPageMismatch` is returned before anything is written. Any export
/// failure aborts the split.
pub fn split_with_manifest(
    pdf_path: &Path,
    manifest: &ShipmentManifest,
    backend: &dyn DocumentBackend,
    output_dir: Option<&Path>,
    observer: &dyn StatusObserver,
) -> Result<ManifestSplit, SplitError> {
    observer.report(&format!("Processing PDF file: {}", pdf_path.display()));
    let document = backend.open(pdf_path)?;

    let pages = document.page_count();
    let boxes = manifest.total_boxes();
    if pages != boxes {
        return Err(SplitError::ManifestPageMismatch { pages, boxes });
    }
    info!("{}: {} pages match {} boxes", pdf_path.display(), pages, boxes);

    let output_dir = output_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_dir(pdf_path, &manifest.shipment_id));
    input::ensure_dir(&output_dir)?;
    observer.report(&format!("Output directory: {}", output_dir.display()));

    let mut files = Vec::with_capacity(manifest.groups.len());
    let mut pages_written = 0;
    for group in &manifest.groups {
        let path = output_dir.join(group.file_name(&manifest.shipment_id));
        let indices = group.page_indices();
        observer.report(&format!(
            "Creating PDF for SKU {}: {} (pages {}-{})",
            group.sku,
            path.display(),
            group.first_page,
            group.last_page
        ));
        document.export_pages(&indices, &path)?;
        pages_written += indices.len();
        files.push(SkuFile {
            sequence: group.row,
            sku: group.sku.clone(),
            path,
            pages: indices,
            error: None,
        });
    }

    observer.report("PDF splitting completed successfully");
    Ok(ManifestSplit {
        output_dir,
        files,
        pages_written,
    })
}

/// CSV/PDF pairs found in one folder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestPairs {
    pub pairs: Vec<(PathBuf, PathBuf)>,
    /// CSVs without a shipment id in their name or without a matching PDF.
    pub unmatched: Vec<PathBuf>,
}

/// Pair every CSV in `dir` with the first PDF (by name) sharing its
/// `FBA…` shipment id.
pub fn pair_manifests(dir: &Path) -> Result<ManifestPairs, SplitError> {
    let entries = fs::read_dir(dir).map_err(|e| input::map_io(dir, e))?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .collect();
    files.sort();

    let name_of = |p: &Path| {
        p.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    };
    let is_csv = |p: &Path| {
        p.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
    };
    let pdfs: Vec<&PathBuf> = files.iter().filter(|p| has_pdf_extension(p)).collect();

    let mut result = ManifestPairs::default();
    for csv in files.iter().filter(|p| is_csv(p)) {
        let csv_name = name_of(csv);
        let Some(id) = SHIPMENT_IN_NAME.find(&csv_name).map(|m| m.as_str()) else {
            warn!("No shipment id in {}, skipping", csv_name);
            result.unmatched.push(csv.clone());
            continue;
        };
        match pdfs.iter().find(|pdf| name_of(pdf).contains(id)) {
            Some(pdf) => result.pairs.push((csv.clone(), (*pdf).clone())),
            None => {
                warn!("No PDF for shipment {} ({}), skipping", id, csv_name);
                result.unmatched.push(csv.clone());
            }
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::LabelDocument;
    use crate::progress::NoopObserver;
    use std::sync::Mutex;

    const SAMPLE: &str = "\u{feff}Shipment ID,FBA15XYZ\n\
Name,Test shipment\n\
\n\
SKU,ASIN,Title,Total boxes,Box ID\n\
DEF-2,B0002,Gadget,1,FBA15XYZU000003\n\
ABC-1,B0001,Widget,2,\"FBA15XYZU000001, FBA15XYZU000002\"\n\
GHI-3,B0003,Thing,1,FBA15XYZU000004\n";

    fn parse(text: &str) -> Result<ShipmentManifest, SplitError> {
        ShipmentManifest::from_reader(text.as_bytes(), Path::new("m.csv"))
    }

    #[test]
    fn reads_shipment_id_before_header() {
        assert_eq!(parse(SAMPLE).unwrap().shipment_id, "FBA15XYZ");
    }

    #[test]
    fn groups_follow_sorted_box_ids() {
        let m = parse(SAMPLE).unwrap();
        let skus: Vec<_> = m.groups.iter().map(|g| g.sku.as_str()).collect();
        assert_eq!(skus, vec!["ABC-1", "DEF-2", "GHI-3"]);

        let abc = &m.groups[0];
        assert_eq!((abc.first_page, abc.last_page, abc.total_boxes), (1, 2, 2));
        assert_eq!(abc.row, 2);
        assert_eq!(abc.page_indices(), vec![0, 1]);
        assert_eq!((m.groups[1].first_page, m.groups[1].last_page), (3, 3));
        assert_eq!(m.total_boxes(), 4);
    }

    #[test]
    fn group_file_name() {
        let m = parse(SAMPLE).unwrap();
        assert_eq!(m.groups[0].file_name(&m.shipment_id), "2_FBA15XYZ_ABC-1_B0001_2boxes.pdf");
    }

    #[test]
    fn missing_shipment_id_defaults_to_unknown() {
        let m = parse("SKU,ASIN,Box ID\nA,B1,X1\n").unwrap();
        assert_eq!(m.shipment_id, "UNKNOWN");
        assert_eq!(m.groups.len(), 1);
    }

    #[test]
    fn missing_header_is_invalid() {
        let err = parse("Shipment ID,FBA1\nfoo,bar\n").unwrap_err();
        assert!(matches!(err, SplitError::ManifestInvalid { .. }));
    }

    #[test]
    fn short_rows_and_blank_ids_ignored() {
        let m = parse("SKU,ASIN,Box ID\nA,B1\nC,B2,\" ,X2,\"\n").unwrap();
        assert_eq!(m.groups.len(), 1);
        assert_eq!(m.groups[0].sku, "C");
        assert_eq!(m.groups[0].row, 2);
        assert_eq!(m.total_boxes(), 1);
    }

    struct Blank {
        pages: usize,
        exported: Mutex<Vec<(Vec<usize>, PathBuf)>>,
    }

    impl LabelDocument for &Blank {
        fn page_count(&self) -> usize {
            self.pages
        }
        fn page_text(&self, _index: usize) -> Result<String, SplitError> {
            Ok(String::new())
        }
        fn export_pages(&self, pages: &[usize], destination: &Path) -> Result<(), SplitError> {
            self.exported
                .lock()
                .unwrap()
                .push((pages.to_vec(), destination.to_path_buf()));
            Ok(())
        }
    }

    impl DocumentBackend for Blank {
        fn open<'a>(&'a self, _path: &Path) -> Result<Box<dyn LabelDocument + 'a>, SplitError> {
            Ok(Box::new(self))
        }
    }

    fn blank(pages: usize) -> Blank {
        Blank {
            pages,
            exported: Mutex::new(Vec::new()),
        }
    }

    #[test]
    fn split_exports_each_group() {
        let tmp = tempfile::tempdir().unwrap();
        let backend = blank(4);
        let m = parse(SAMPLE).unwrap();
        let pdf = tmp.path().join("package-FBA15XYZ.pdf");

        let split = split_with_manifest(&pdf, &m, &backend, None, &NoopObserver).unwrap();
        assert_eq!(split.output_dir, tmp.path().join("shipment_FBA15XYZ"));
        assert_eq!(split.pages_written, 4);

        let exported = backend.exported.lock().unwrap();
        let pages: Vec<_> = exported.iter().map(|(p, _)| p.clone()).collect();
        assert_eq!(pages, vec![vec![0, 1], vec![2], vec![3]]);
    }

    #[test]
    fn page_count_mismatch_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let backend = blank(5);
        let m = parse(SAMPLE).unwrap();
        let err = split_with_manifest(&tmp.path().join("x.pdf"), &m, &backend, None, &NoopObserver)
            .unwrap_err();
        assert!(matches!(err, SplitError::ManifestPageMismatch { pages: 5, boxes: 4 }));
        assert!(backend.exported.lock().unwrap().is_empty());
    }

    #[test]
    fn pairs_by_shipment_id() {
        let tmp = tempfile::tempdir().unwrap();
        for name in [
            "FBA111AAA.csv",
            "package-FBA111AAA.pdf",
            "FBA222BBB.csv",
            "notes.csv",
            "package-FBA333CCC.pdf",
        ] {
            fs::write(tmp.path().join(name), b"").unwrap();
        }

        let found = pair_manifests(tmp.path()).unwrap();
        assert_eq!(
            found.pairs,
            vec![(
                tmp.path().join("FBA111AAA.csv"),
                tmp.path().join("package-FBA111AAA.pdf")
            )]
        );
        assert_eq!(found.unmatched.len(), 2);
    }
}
