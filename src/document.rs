//! The PDF-access contract the pipeline is written against.
//!
//! The pipeline never touches pdfium directly. It opens documents through a
//! [`DocumentBackend`] and reads pages through [`LabelDocument`], so the
//! grouping logic can be driven by an in-memory document in tests and by
//! [`crate::backend::PdfiumBackend`] in production.
//!
//! A document handle is released when the boxed [`LabelDocument`] is
//! dropped, which covers every exit path of a pipeline invocation.

use crate::error::SplitError;
use std::path::Path;

/// Opens PDF documents.
pub trait DocumentBackend {
    /// Open the PDF at `path`.
    fn open<'a>(&'a self, path: &Path) -> Result<Box<dyn LabelDocument + 'a>, SplitError>;
}

/// A read-only, opened PDF.
pub trait LabelDocument {
    /// Number of pages.
    fn page_count(&self) -> usize;

    /// Raw text layer of the page at 0-indexed `index`.
    fn page_text(&self, index: usize) -> Result<String, SplitError>;

    /// Build a new PDF holding exactly `pages` (0-indexed, in the given
    /// order) and save it to `destination`.
    fn export_pages(&self, pages: &[usize], destination: &Path) -> Result<(), SplitError>;

    /// Text of the page at `index` as a [`LineSequence`].
    fn page_lines(&self, index: usize) -> Result<LineSequence, SplitError> {
        self.page_text(index).map(|t| LineSequence::from_text(&t))
    }
}

/// Non-blank, trimmed lines of one page's text, top to bottom.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineSequence(Vec<String>);

impl LineSequence {
    /// Split `text` into lines, trimming each and dropping blank ones.
    pub fn from_text(text: &str) -> Self {
        Self(
            text.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for LineSequence {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        iter.into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .into()
    }
}

impl From<Vec<String>> for LineSequence {
    fn from(lines: Vec<String>) -> Self {
        Self(lines)
    }
}
