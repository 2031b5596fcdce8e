//! Source tree scanning.
//!
//! Phase 1 of the build. Walks the source directory recursively and returns
//! every markdown document it finds, in a deterministic order: depth-first,
//! entries of each directory sorted by file name (files and subdirectories
//! interleaved, the way a lexical directory walk visits them).
//!
//! ```text
//! content/
//! ├── about.md            → 1
//! ├── blog/
//! │   ├── first-post.md   → 2
//! │   └── images/         (no documents, skipped)
//! ├── config.toml         (not a document)
//! └── index.md            → 3
//! ```
//!
//! Scanning is all-or-nothing: any traversal error aborts the build. That is
//! the opposite of extraction, where one bad document is merely skipped.

use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Extension (without the dot) that marks a file as a document.
pub const DOCUMENT_EXTENSION: &str = "md";

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("source directory not found: {0}")]
    NotFound(PathBuf),
    #[error("source path is not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("failed to traverse {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Collect all document paths under `root`.
///
/// Returned paths are `root` joined with the relative path, so they can be
/// fed straight into [`crate::extract::derive_url`] with the same `root`.
pub fn scan(root: &Path) -> Result<Vec<PathBuf>, ScanError> {
    if !root.exists() {
        return Err(ScanError::NotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let mut documents = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|source| ScanError::Walk {
            path: source
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| root.to_path_buf()),
            source,
        })?;
        if !entry.file_type().is_dir() && is_document(entry.path()) {
            documents.push(entry.into_path());
        }
    }

    log::debug!("found {} documents under {}", documents.len(), root.display());
    Ok(documents)
}

/// Whether a path names a markdown document (case-sensitive `.md`).
pub fn is_document(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == DOCUMENT_EXTENSION)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::setup_fixtures;
    use std::fs;
    use tempfile::TempDir;

    fn relative(root: &Path, paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| {
                p.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn scan_finds_documents_depth_first_sorted() {
        let tmp = setup_fixtures();
        let root = tmp.path().join("content");
        let docs = scan(&root).unwrap();

        assert_eq!(
            relative(&root, &docs),
            vec![
                "about.md",
                "blog/first-post.md",
                "blog/second_post.md",
                "index.md",
                "notes/deep/nested-note.md",
            ]
        );
    }

    #[test]
    fn scan_ignores_non_documents() {
        let tmp = setup_fixtures();
        let root = tmp.path().join("content");
        let docs = scan(&root).unwrap();

        assert!(docs.iter().all(|p| is_document(p)));
        assert!(!docs.iter().any(|p| p.ends_with("notes/readme.txt")));
        assert!(!docs.iter().any(|p| p.ends_with("config.toml")));
    }

    #[test]
    fn scan_is_deterministic() {
        let tmp = setup_fixtures();
        let root = tmp.path().join("content");
        assert_eq!(scan(&root).unwrap(), scan(&root).unwrap());
    }

    #[test]
    fn scan_empty_directory_yields_nothing() {
        let tmp = TempDir::new().unwrap();
        assert!(scan(tmp.path()).unwrap().is_empty());
    }

    #[test]
    fn scan_missing_root_fails() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope");
        assert!(matches!(scan(&missing), Err(ScanError::NotFound(_))));
    }

    #[test]
    fn scan_file_root_fails() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("page.md");
        fs::write(&file, "# Page").unwrap();
        assert!(matches!(scan(&file), Err(ScanError::NotADirectory(_))));
    }

    #[test]
    fn extension_match_is_case_sensitive() {
        assert!(is_document(Path::new("a/b.md")));
        assert!(!is_document(Path::new("a/b.MD")));
        assert!(!is_document(Path::new("a/b.markdown")));
        assert!(!is_document(Path::new("a/md")));
    }

    #[test]
    fn directory_named_like_document_is_descended_not_collected() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("odd.md")).unwrap();
        fs::write(tmp.path().join("odd.md/inner.md"), "# Inner").unwrap();

        let docs = scan(tmp.path()).unwrap();
        assert_eq!(relative(tmp.path(), &docs), vec!["odd.md/inner.md"]);
    }
}
