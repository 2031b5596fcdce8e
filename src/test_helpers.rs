//! Shared test utilities for the twig test suite.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let report = SiteBuilder::new(fixture_paths(&tmp)).build().unwrap();
//! let about = read_output(&tmp, "about.html");
//! ```
//!
//! The fixture layout after setup:
//!
//! ```text
//! <tmp>/
//! ├── content/            (copy of fixtures/content)
//! ├── template.html       (copy of fixtures/template.html)
//! └── public/             (created by the build)
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::pipeline::BuildPaths;

/// Copy `fixtures/` into a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Source, output and template paths inside a fixture directory.
pub fn fixture_paths(tmp: &TempDir) -> BuildPaths {
    BuildPaths::new(
        tmp.path().join("content"),
        tmp.path().join("public"),
        tmp.path().join("template.html"),
    )
}

/// Read a generated file by URL. Panics with the URL if it is missing.
pub fn read_output(tmp: &TempDir, url: &str) -> String {
    let path = tmp.path().join("public").join(url);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("output '{url}' not readable at {}: {e}", path.display()))
}
