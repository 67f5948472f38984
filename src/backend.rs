//! Production document backend over pdfium.
//!
//! `pdfium-render` wraps the pdfium C++ library, bound dynamically at
//! runtime. Binding happens once per [`PdfiumBackend`]; every document it
//! opens borrows the binding and is closed when dropped.
//!
//! Library lookup order:
//! 1. the explicit path from [`crate::config::SplitConfig::pdfium_library`]
//! 2. `PDFIUM_LIB_PATH`
//! 3. the working directory
//! 4. system library paths

use crate::document::{DocumentBackend, LabelDocument};
use crate::error::SplitError;
use crate::pipeline::input::validate_pdf;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Opens PDFs through a bound pdfium library.
pub struct PdfiumBackend {
    pdfium: Pdfium,
}

impl PdfiumBackend {
    /// Bind to pdfium, trying `explicit` first when given.
    pub fn bind(explicit: Option<&Path>) -> Result<Self, SplitError> {
        let candidates: Vec<PathBuf> = explicit
            .map(Path::to_path_buf)
            .into_iter()
            .chain(std::env::var_os("PDFIUM_LIB_PATH").map(PathBuf::from))
            .collect();

        let mut last_error = None;
        for path in &candidates {
            let lib = if path.is_dir() {
                Pdfium::pdfium_platform_library_name_at_path(path)
            } else {
                path.clone()
            };
            match Pdfium::bind_to_library(&lib) {
                Ok(bindings) => {
                    info!("Bound pdfium from {}", lib.display());
                    return Ok(Self {
                        pdfium: Pdfium::new(bindings),
                    });
                }
                Err(e) => {
                    debug!("pdfium not usable at {}: {:?}", lib.display(), e);
                    last_error = Some(format!("{}: {:?}", lib.display(), e));
                }
            }
        }

        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| {
                SplitError::PdfiumBindingFailed(match last_error {
                    Some(prev) => format!("{prev}; system lookup: {e:?}"),
                    None => format!("{e:?}"),
                })
            })?;
        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }
}

impl DocumentBackend for PdfiumBackend {
    fn open<'a>(&'a self, path: &Path) -> Result<Box<dyn LabelDocument + 'a>, SplitError> {
        validate_pdf(path)?;
        let document = self
            .pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| SplitError::CorruptPdf {
                path: path.to_path_buf(),
                detail: format!("{:?}", e),
            })?;
        let page_count = document.pages().len() as usize;
        debug!("Opened {} ({} pages)", path.display(), page_count);
        Ok(Box::new(PdfiumDocument {
            pdfium: &self.pdfium,
            document,
            page_count,
        }))
    }
}

/// One opened PDF; closed on drop.
struct PdfiumDocument<'a> {
    pdfium: &'a Pdfium,
    document: PdfDocument<'a>,
    page_count: usize,
}

fn page_index(index: usize) -> Result<PdfPageIndex, String> {
    PdfPageIndex::try_from(index).map_err(|_| format!("page index {index} exceeds pdfium range"))
}

impl LabelDocument for PdfiumDocument<'_> {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn page_text(&self, index: usize) -> Result<String, SplitError> {
        let to_err = |detail: String| SplitError::PageText {
            page: index + 1,
            detail,
        };
        let page = self
            .document
            .pages()
            .get(page_index(index).map_err(to_err)?)
            .map_err(|e| to_err(format!("{:?}", e)))?;
        let text = page.text().map_err(|e| to_err(format!("{:?}", e)))?;
        Ok(text.all())
    }

    fn export_pages(&self, pages: &[usize], destination: &Path) -> Result<(), SplitError> {
        let to_err = |detail: String| SplitError::ExportFailed {
            path: destination.to_path_buf(),
            detail,
        };
        let mut out = self
            .pdfium
            .create_new_pdf()
            .map_err(|e| to_err(format!("{:?}", e)))?;

        for (position, &source) in pages.iter().enumerate() {
            let source_index = page_index(source).map_err(to_err)?;
            let dest_index = page_index(position).map_err(to_err)?;
            out.pages_mut()
                .copy_page_from_document(&self.document, source_index, dest_index)
                .map_err(|e| to_err(format!("page {}: {:?}", source + 1, e)))?;
        }

        out.save_to_file(destination)
            .map_err(|e| to_err(format!("{:?}", e)))
    }
}
