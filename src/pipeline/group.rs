//! Page grouping: scan every page, then derive the pages to export per SKU.
//!
//! Two generations of SKU → pages maps exist per document:
//!
//! * [`DiscoveryMap`]: pages on which each SKU's header block was found,
//!   SKUs in first-seen order. Built by folding the page scan.
//! * [`OutputMap`]: pages to copy into each SKU's file. A pure function of
//!   the discovery map, the layout mode and the page count.
//!
//! ## Interleaved expansion
//!
//! In interleaved documents each labelled page run is followed by one
//! unlabelled continuation page. A SKU found on `lo..=hi` therefore exports
//! `lo..=hi+1`, clamped to the document. Non-contiguous discoveries still
//! produce one contiguous span, which can claim pages of another SKU; see
//! [`OutputMap::overlaps`].

use crate::document::LabelDocument;
use crate::output::{LayoutMode, SkuPages};
use crate::pipeline::locate::{SkuLocator, SkuRecord};
use std::collections::HashMap;
use tracing::debug;

/// Result of scanning every page of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageScan {
    /// One record per page that carries a SKU, in page order.
    pub records: Vec<SkuRecord>,
    /// 1-based numbers of pages without a SKU (or without readable text).
    pub skipped_pages: Vec<usize>,
}

/// Scan all pages in ascending order.
///
/// A page whose text cannot be read counts as a page without a SKU.
pub fn scan(document: &dyn LabelDocument, locator: &SkuLocator) -> PageScan {
    (0..document.page_count()).fold(PageScan::default(), |mut acc, index| {
        let found = match document.page_lines(index) {
            Ok(lines) => locator.locate_record(&lines, index),
            Err(e) => {
                debug!("Page {}: text unavailable: {}", index + 1, e);
                None
            }
        };
        match found {
            Some(record) => {
                debug!("Page {}: SKU '{}'", index + 1, record.sku);
                acc.records.push(record);
            }
            None => {
                debug!("Page {}: no SKU", index + 1);
                acc.skipped_pages.push(index + 1);
            }
        }
        acc
    })
}

/// SKU → pages where the SKU was found, in first-seen SKU order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryMap {
    entries: Vec<SkuPages>,
}

impl DiscoveryMap {
    /// Fold records into a map, preserving first-occurrence order of SKUs.
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a SkuRecord>,
    {
        let (entries, _) = records.into_iter().fold(
            (Vec::<SkuPages>::new(), HashMap::<&str, usize>::new()),
            |(mut entries, mut slots), record| {
                match slots.get(record.sku.as_str()).copied() {
                    Some(slot) => entries[slot].pages.push(record.page_index),
                    None => {
                        slots.insert(record.sku.as_str(), entries.len());
                        entries.push(SkuPages {
                            sku: record.sku.clone(),
                            pages: vec![record.page_index],
                        });
                    }
                }
                (entries, slots)
            },
        );
        Self { entries }
    }

    pub fn entries(&self) -> &[SkuPages] {
        &self.entries
    }

    pub fn get(&self, sku: &str) -> Option<&[usize]> {
        self.entries
            .iter()
            .find(|e| e.sku == sku)
            .map(|e| e.pages.as_slice())
    }

    /// Number of distinct SKUs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total pages on which any SKU was found.
    pub fn page_total(&self) -> usize {
        self.entries.iter().map(|e| e.pages.len()).sum()
    }
}

/// A page claimed by two SKUs' output spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOverlap {
    /// 0-indexed page.
    pub page: usize,
    /// SKU that claimed the page first (in map order).
    pub first: String,
    pub second: String,
}

/// SKU → pages to export, in the discovery map's SKU order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputMap {
    mode: LayoutMode,
    entries: Vec<SkuPages>,
}

impl OutputMap {
    /// Derive export pages from `discovery` for a document of `total_pages`.
    pub fn from_discovery(discovery: &DiscoveryMap, mode: LayoutMode, total_pages: usize) -> Self {
        let entries = discovery
            .entries()
            .iter()
            .map(|e| SkuPages {
                sku: e.sku.clone(),
                pages: match mode {
                    LayoutMode::Standard => standard_pages(&e.pages),
                    LayoutMode::Interleaved => interleaved_span(&e.pages, total_pages),
                },
            })
            .collect();
        Self { mode, entries }
    }

    pub fn mode(&self) -> LayoutMode {
        self.mode
    }

    pub fn entries(&self) -> &[SkuPages] {
        &self.entries
    }

    pub fn get(&self, sku: &str) -> Option<&[usize]> {
        self.entries
            .iter()
            .find(|e| e.sku == sku)
            .map(|e| e.pages.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every page claimed by more than one SKU, ascending by page.
    pub fn overlaps(&self) -> Vec<PageOverlap> {
        let mut owner: HashMap<usize, &str> = HashMap::new();
        let mut found = Vec::new();
        for entry in &self.entries {
            for &page in &entry.pages {
                match owner.get(&page).copied() {
                    Some(first) => found.push(PageOverlap {
                        page,
                        first: first.to_string(),
                        second: entry.sku.clone(),
                    }),
                    None => {
                        owner.insert(page, entry.sku.as_str());
                    }
                }
            }
        }
        found.sort_by_key(|o| o.page);
        found
    }
}

/// Standard mode: the discovered pages, ascending and unique.
fn standard_pages(found: &[usize]) -> Vec<usize> {
    let mut pages = found.to_vec();
    pages.sort_unstable();
    pages.dedup();
    pages
}

/// Interleaved mode: `min..=max+1`, clamped below `total_pages`.
fn interleaved_span(found: &[usize], total_pages: usize) -> Vec<usize> {
    match (found.iter().min(), found.iter().max()) {
        (Some(&lo), Some(&hi)) => (lo..(hi + 2).min(total_pages)).collect(),
        _ => Vec::new(),
    }
}

/// Everything the grouping stage produces for one document.
#[derive(Debug, Clone)]
pub struct Grouping {
    pub discovery: DiscoveryMap,
    pub output: OutputMap,
    pub skipped_pages: Vec<usize>,
}

/// Scan `document` and build both maps for `mode`.
pub fn group(document: &dyn LabelDocument, locator: &SkuLocator, mode: LayoutMode) -> Grouping {
    let PageScan {
        records,
        skipped_pages,
    } = scan(document, locator);
    let discovery = DiscoveryMap::from_records(&records);
    let output = OutputMap::from_discovery(&discovery, mode, document.page_count());
    Grouping {
        discovery,
        output,
        skipped_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(sku: &str, page_index: usize) -> SkuRecord {
        SkuRecord {
            sku: sku.into(),
            page_index,
        }
    }

    #[test]
    fn discovery_keeps_first_seen_order() {
        let records = [rec("B", 0), rec("A", 1), rec("B", 2), rec("C", 3)];
        let map = DiscoveryMap::from_records(&records);
        let skus: Vec<_> = map.entries().iter().map(|e| e.sku.as_str()).collect();
        assert_eq!(skus, vec!["B", "A", "C"]);
        assert_eq!(map.get("B"), Some(&[0, 2][..]));
        assert_eq!(map.page_total(), 4);
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn empty_discovery_gives_empty_output() {
        let none: [SkuRecord; 0] = [];
        let map = DiscoveryMap::from_records(&none);
        assert!(map.is_empty());
        let out = OutputMap::from_discovery(&map, LayoutMode::Interleaved, 5);
        assert!(out.is_empty());
    }

    #[test]
    fn standard_output_is_sorted_discovery() {
        let records = [rec("A", 4), rec("B", 1), rec("A", 2)];
        let map = DiscoveryMap::from_records(&records);
        let out = OutputMap::from_discovery(&map, LayoutMode::Standard, 10);
        assert_eq!(out.get("A"), Some(&[2, 4][..]));
        assert_eq!(out.get("B"), Some(&[1][..]));
        assert!(out.overlaps().is_empty());
    }

    #[test]
    fn interleaved_span_min_to_max_plus_one() {
        let records = [rec("A", 2), rec("A", 5)];
        let map = DiscoveryMap::from_records(&records);
        let out = OutputMap::from_discovery(&map, LayoutMode::Interleaved, 10);
        assert_eq!(out.get("A"), Some(&[2, 3, 4, 5, 6][..]));
    }

    #[test]
    fn interleaved_span_clamped_at_last_page() {
        let records = [rec("A", 3), rec("A", 4)];
        let map = DiscoveryMap::from_records(&records);
        let out = OutputMap::from_discovery(&map, LayoutMode::Interleaved, 5);
        assert_eq!(out.get("A"), Some(&[3, 4][..]));
    }

    #[test]
    fn interleaved_span_reaching_exactly_last_page() {
        // max + 1 == total_pages - 1
        let records = [rec("A", 8)];
        let map = DiscoveryMap::from_records(&records);
        let out = OutputMap::from_discovery(&map, LayoutMode::Interleaved, 10);
        assert_eq!(out.get("A"), Some(&[8, 9][..]));
    }

    #[test]
    fn interleaved_typical_alternating_layout() {
        // label, continuation, label, continuation ...
        let records = [rec("A", 0), rec("A", 2), rec("B", 4)];
        let map = DiscoveryMap::from_records(&records);
        let out = OutputMap::from_discovery(&map, LayoutMode::Interleaved, 6);
        assert_eq!(out.get("A"), Some(&[0, 1, 2, 3][..]));
        assert_eq!(out.get("B"), Some(&[4, 5][..]));
        assert!(out.overlaps().is_empty());
    }

    #[test]
    fn non_contiguous_spans_report_overlap() {
        let records = [rec("A", 0), rec("B", 2), rec("A", 4)];
        let map = DiscoveryMap::from_records(&records);
        let out = OutputMap::from_discovery(&map, LayoutMode::Interleaved, 8);
        assert_eq!(out.get("A"), Some(&[0, 1, 2, 3, 4, 5][..]));
        assert_eq!(out.get("B"), Some(&[2, 3][..]));
        let overlaps = out.overlaps();
        assert_eq!(
            overlaps,
            vec![
                PageOverlap { page: 2, first: "A".into(), second: "B".into() },
                PageOverlap { page: 3, first: "A".into(), second: "B".into() },
            ]
        );
    }

    #[test]
    fn output_keeps_discovery_order_and_mode() {
        let records = [rec("Z", 0), rec("A", 1)];
        let map = DiscoveryMap::from_records(&records);
        let out = OutputMap::from_discovery(&map, LayoutMode::Standard, 2);
        assert_eq!(out.mode(), LayoutMode::Standard);
        assert_eq!(out.entries()[0].sku, "Z");
        assert_eq!(out.entries()[1].sku, "A");
    }
}
