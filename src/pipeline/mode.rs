//! Layout mode detection from the second page.
//!
//! Standard documents carry a SKU block on every label page, so page 2 has
//! one. Interleaved documents alternate a labelled page with an unlabelled
//! continuation page, so page 2 has none.

use crate::document::LabelDocument;
use crate::output::LayoutMode;
use crate::pipeline::locate::SkuLocator;
use tracing::warn;

/// 0-indexed page inspected to decide the layout.
pub const PROBE_PAGE: usize = 1;

/// What the probe page showed, with the mode it implies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Document has a single page; nothing to probe.
    SinglePage,
    /// Probe page carries this SKU.
    SkuFound(String),
    /// Probe page text was read but holds no SKU.
    NoSku,
    /// Probe page text could not be read.
    Unreadable(String),
}

impl ProbeOutcome {
    /// The layout this outcome implies. Unreadable probes fall back to Standard.
    pub fn mode(&self) -> LayoutMode {
        match self {
            ProbeOutcome::NoSku => LayoutMode::Interleaved,
            ProbeOutcome::SinglePage | ProbeOutcome::SkuFound(_) | ProbeOutcome::Unreadable(_) => {
                LayoutMode::Standard
            }
        }
    }

    /// One-line status text describing the decision.
    pub fn describe(&self) -> String {
        match self {
            ProbeOutcome::SinglePage => {
                "Warn: PDF has only one page. Assuming Standard mode.".to_string()
            }
            ProbeOutcome::SkuFound(sku) => format!(
                "Mode detected: Standard (SKU '{sku}' found on page 2). \
                 Output PDFs will include only pages with SKUs."
            ),
            ProbeOutcome::NoSku => "Mode detected: Interleaved (no SKU on page 2). \
                 Output PDFs will include the page following each SKU page run."
                .to_string(),
            ProbeOutcome::Unreadable(detail) => format!(
                "Warn: could not check page 2 for mode detection: {detail}. Assuming Standard mode."
            ),
        }
    }
}

/// Probe the document's second page.
pub fn probe(document: &dyn LabelDocument, locator: &SkuLocator) -> ProbeOutcome {
    if document.page_count() <= PROBE_PAGE {
        return ProbeOutcome::SinglePage;
    }
    match document.page_lines(PROBE_PAGE) {
        Ok(lines) => match locator.locate(&lines) {
            Some(sku) => ProbeOutcome::SkuFound(sku),
            None => ProbeOutcome::NoSku,
        },
        Err(e) => {
            warn!("Mode probe on page {} failed: {}", PROBE_PAGE + 1, e);
            ProbeOutcome::Unreadable(e.to_string())
        }
    }
}

/// Decide the layout mode of `document`.
pub fn detect(document: &dyn LabelDocument, locator: &SkuLocator) -> LayoutMode {
    probe(document, locator).mode()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SplitError;
    use std::path::Path;

    /// Pages of text; `None` means the page's text cannot be read.
    struct Pages(Vec<Option<&'static str>>);

    impl LabelDocument for Pages {
        fn page_count(&self) -> usize {
            self.0.len()
        }

        fn page_text(&self, index: usize) -> Result<String, SplitError> {
            self.0[index].map(str::to_string).ok_or(SplitError::PageText {
                page: index + 1,
                detail: "no text layer".into(),
            })
        }

        fn export_pages(&self, _pages: &[usize], _dest: &Path) -> Result<(), SplitError> {
            unreachable!("mode detection never exports")
        }
    }

    const LABEL: &str = "Single SKU\nABC\nQty 1";

    #[test]
    fn single_page_defaults_to_standard() {
        let doc = Pages(vec![Some(LABEL)]);
        let outcome = probe(&doc, &SkuLocator::default());
        assert_eq!(outcome, ProbeOutcome::SinglePage);
        assert_eq!(outcome.mode(), LayoutMode::Standard);
    }

    #[test]
    fn labelled_second_page_is_standard() {
        let doc = Pages(vec![Some(LABEL), Some(LABEL)]);
        assert_eq!(detect(&doc, &SkuLocator::default()), LayoutMode::Standard);
    }

    #[test]
    fn unlabelled_second_page_is_interleaved() {
        let doc = Pages(vec![Some(LABEL), Some("carrier barcode\n12345"), Some(LABEL)]);
        assert_eq!(detect(&doc, &SkuLocator::default()), LayoutMode::Interleaved);
    }

    #[test]
    fn unreadable_probe_falls_back_to_standard() {
        let doc = Pages(vec![Some(LABEL), None]);
        let outcome = probe(&doc, &SkuLocator::default());
        assert!(matches!(outcome, ProbeOutcome::Unreadable(_)));
        assert_eq!(outcome.mode(), LayoutMode::Standard);
        assert!(outcome.describe().contains("Assuming Standard"));
    }

    #[test]
    fn only_the_probe_page_matters() {
        // Page 1 unlabelled does not affect the decision.
        let doc = Pages(vec![Some("cover"), Some(LABEL)]);
        assert_eq!(detect(&doc, &SkuLocator::default()), LayoutMode::Standard);
    }
}
