//! Input resolution and output naming.
//!
//! An input is either one PDF or a folder of PDFs. Each PDF's file stem
//! (minus an optional `package-` prefix) is its shipment identifier, and its
//! split files go into a sibling directory `{shipment}_{pages}pages`.
//!
//! PDF magic bytes (`%PDF`) are checked before pdfium sees the file so a
//! mislabelled file gets a meaningful error rather than a parser failure.

use crate::error::SplitError;
use std::fs;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

/// The resolved input: one PDF or every PDF directly inside a folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedInput {
    File(PathBuf),
    Folder { dir: PathBuf, pdfs: Vec<PathBuf> },
}

impl ResolvedInput {
    /// PDFs to process, in processing order.
    pub fn pdfs(&self) -> Vec<PathBuf> {
        match self {
            ResolvedInput::File(p) => vec![p.clone()],
            ResolvedInput::Folder { pdfs, .. } => pdfs.clone(),
        }
    }
}

/// Resolve `path` to a file or a folder listing.
///
/// Folder listings include files whose extension is `pdf` in any case,
/// sorted by path. Subdirectories are not descended into.
pub fn resolve_input(path: &Path) -> Result<ResolvedInput, SplitError> {
    if !path.exists() {
        return Err(SplitError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    if path.is_dir() {
        let entries = fs::read_dir(path).map_err(|e| map_io(path, e))?;
        let mut pdfs: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && has_pdf_extension(p))
            .collect();
        pdfs.sort();
        debug!("Found {} PDF(s) in {}", pdfs.len(), path.display());
        return Ok(ResolvedInput::Folder {
            dir: path.to_path_buf(),
            pdfs,
        });
    }
    Ok(ResolvedInput::File(path.to_path_buf()))
}

/// True if the file name ends in `.pdf`, case-insensitively.
pub fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// Check that `path` is a readable file starting with `%PDF`.
pub fn validate_pdf(path: &Path) -> Result<(), SplitError> {
    if !path.exists() {
        return Err(SplitError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let mut f = fs::File::open(path).map_err(|e| map_io(path, e))?;
    let mut magic = [0u8; 4];
    if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
        return Err(SplitError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        });
    }
    Ok(())
}

pub(crate) fn map_io(path: &Path, e: std::io::Error) -> SplitError {
    let path = path.to_path_buf();
    match e.kind() {
        ErrorKind::NotFound => SplitError::FileNotFound { path },
        ErrorKind::PermissionDenied => SplitError::PermissionDenied { path },
        _ => SplitError::InputUnreadable { path, source: e },
    }
}

/// Shipment identifier: the file stem minus a leading `package-` (any case).
pub fn shipment_id(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    const PREFIX: &str = "package-";
    match stem.get(..PREFIX.len()) {
        Some(head) if head.eq_ignore_ascii_case(PREFIX) => stem[PREFIX.len()..].to_string(),
        _ => stem,
    }
}

/// `{shipment}_{total_pages}pages` under `root`, or beside `input` if no root.
///
/// The shipment id comes from a file stem, so it is used as is.
pub fn output_dir_for(
    input: &Path,
    shipment_id: &str,
    total_pages: usize,
    root: Option<&Path>,
) -> PathBuf {
    let parent = root
        .map(Path::to_path_buf)
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    parent.join(format!("{shipment_id}_{total_pages}pages"))
}

/// Create `dir` (and parents) if it does not exist yet.
pub fn ensure_dir(dir: &Path) -> Result<(), SplitError> {
    fs::create_dir_all(dir).map_err(|source| SplitError::OutputDirFailed {
        path: dir.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipment_id_strips_package_prefix() {
        assert_eq!(shipment_id(Path::new("/in/package-FBA15XYZ.pdf")), "FBA15XYZ");
        assert_eq!(shipment_id(Path::new("/in/PACKAGE-FBA15XYZ.PDF")), "FBA15XYZ");
        assert_eq!(shipment_id(Path::new("FBA15XYZ.pdf")), "FBA15XYZ");
    }

    #[test]
    fn shipment_id_keeps_inner_package() {
        assert_eq!(shipment_id(Path::new("my-package-1.pdf")), "my-package-1");
        assert_eq!(shipment_id(Path::new("package.pdf")), "package");
    }

    #[test]
    fn shipment_id_with_multibyte_stem() {
        assert_eq!(shipment_id(Path::new("出荷.pdf")), "出荷");
    }

    #[test]
    fn output_dir_beside_input() {
        let dir = output_dir_for(Path::new("/in/package-FBA1.pdf"), "FBA1", 12, None);
        assert_eq!(dir, PathBuf::from("/in/FBA1_12pages"));
    }

    #[test]
    fn output_dir_under_root() {
        let dir = output_dir_for(Path::new("/in/x.pdf"), "x", 3, Some(Path::new("/out")));
        assert_eq!(dir, PathBuf::from("/out/x_3pages"));
    }

    #[test]
    fn output_dir_keeps_stem_spelling() {
        let dir = output_dir_for(Path::new("/in/my shipment.pdf"), "my shipment", 3, None);
        assert_eq!(dir, PathBuf::from("/in/my shipment_3pages"));
    }

    #[test]
    fn io_errors_keep_their_kind() {
        let p = Path::new("/in/labels");
        let not_found = map_io(p, std::io::Error::from(ErrorKind::NotFound));
        let denied = map_io(p, std::io::Error::from(ErrorKind::PermissionDenied));
        let other = map_io(p, std::io::Error::new(ErrorKind::Other, "device busy"));
        assert!(matches!(not_found, SplitError::FileNotFound { .. }));
        assert!(matches!(denied, SplitError::PermissionDenied { .. }));
        assert!(matches!(other, SplitError::InputUnreadable { .. }), "{other}");
    }

    #[test]
    fn pdf_extension_any_case() {
        assert!(has_pdf_extension(Path::new("a.pdf")));
        assert!(has_pdf_extension(Path::new("a.PdF")));
        assert!(!has_pdf_extension(Path::new("a.csv")));
        assert!(!has_pdf_extension(Path::new("pdf")));
    }

    #[test]
    fn folder_lists_pdfs_sorted() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["b.pdf", "a.PDF", "notes.txt"] {
            fs::write(tmp.path().join(name), b"%PDF-1.7").unwrap();
        }
        fs::create_dir(tmp.path().join("sub.pdf")).unwrap();

        let resolved = resolve_input(tmp.path()).unwrap();
        let names: Vec<_> = resolved
            .pdfs()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf"]);
    }

    #[test]
    fn missing_input_is_not_found() {
        let err = resolve_input(Path::new("/definitely/not/here.pdf")).unwrap_err();
        assert!(matches!(err, SplitError::FileNotFound { .. }));
    }

    #[test]
    fn non_pdf_rejected_by_magic() {
        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("fake.pdf");
        fs::write(&p, b"PK\x03\x04zip").unwrap();
        let err = validate_pdf(&p).unwrap_err();
        assert!(matches!(err, SplitError::NotAPdf { magic, .. } if &magic == b"PK\x03\x04"));
    }

    #[test]
    fn ensure_dir_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let d = tmp.path().join("x_1pages");
        ensure_dir(&d).unwrap();
        ensure_dir(&d).unwrap();
        assert!(d.is_dir());
    }
}
