//! Project scaffolding for `twig init`.
//!
//! Creates the conventional layout with sample content and a starter
//! template:
//!
//! ```text
//! <dir>/
//! ├── content/
//! │   ├── index.md
//! │   ├── about.md
//! │   └── blog/
//! │       └── first-post.md
//! ├── public/
//! ├── template.html
//! └── README.md
//! ```
//!
//! Existing files are never overwritten; they are reported as kept.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const SAMPLE_FILES: &[(&str, &str)] = &[
    ("content/index.md", include_str!("../scaffold/index.md")),
    ("content/about.md", include_str!("../scaffold/about.md")),
    (
        "content/blog/first-post.md",
        include_str!("../scaffold/first-post.md"),
    ),
    ("template.html", include_str!("../scaffold/template.html")),
    ("README.md", include_str!("../scaffold/README.md")),
];

const DIRECTORIES: &[&str] = &["content", "content/blog", "public"];

#[derive(Error, Debug)]
pub enum ScaffoldError {
    #[error("failed to create {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InitReport {
    pub created: Vec<PathBuf>,
    pub kept: Vec<PathBuf>,
}

/// Lay out a new project in `dir`.
pub fn init_project(dir: &Path) -> Result<InitReport, ScaffoldError> {
    for rel in DIRECTORIES {
        let path = dir.join(rel);
        fs::create_dir_all(&path).map_err(|source| ScaffoldError::Io { path, source })?;
    }

    let mut report = InitReport::default();
    for (rel, contents) in SAMPLE_FILES {
        let path = dir.join(rel);
        if path.exists() {
            report.kept.push(PathBuf::from(rel));
            continue;
        }
        fs::write(&path, contents).map_err(|source| ScaffoldError::Io {
            path: path.clone(),
            source,
        })?;
        report.created.push(PathBuf::from(rel));
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{BuildPaths, SiteBuilder};
    use crate::render::Layout;
    use tempfile::TempDir;

    #[test]
    fn init_creates_layout() {
        let tmp = TempDir::new().unwrap();
        let report = init_project(tmp.path()).unwrap();

        assert_eq!(report.created.len(), SAMPLE_FILES.len());
        assert!(report.kept.is_empty());
        assert!(tmp.path().join("content/blog/first-post.md").is_file());
        assert!(tmp.path().join("public").is_dir());
        assert!(tmp.path().join("template.html").is_file());
    }

    #[test]
    fn init_keeps_existing_files() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("template.html"), "mine").unwrap();

        let report = init_project(tmp.path()).unwrap();
        assert_eq!(report.kept, vec![PathBuf::from("template.html")]);
        assert_eq!(
            fs::read_to_string(tmp.path().join("template.html")).unwrap(),
            "mine"
        );
    }

    #[test]
    fn starter_template_parses() {
        assert!(Layout::parse(include_str!("../scaffold/template.html")).is_ok());
    }

    #[test]
    fn scaffolded_project_builds() {
        let tmp = TempDir::new().unwrap();
        init_project(tmp.path()).unwrap();

        let paths = BuildPaths::new(
            tmp.path().join("content"),
            tmp.path().join("public"),
            tmp.path().join("template.html"),
        );
        let report = SiteBuilder::new(paths).build().unwrap();
        // content/index.md is replaced by the generated index
        assert_eq!(report.pages.len(), 2);
        assert!(report.index_shadowed.is_some());
        assert!(report.skipped.is_empty());
        assert!(tmp.path().join("public/blog/first-post.html").is_file());
    }
}
