//! Metadata and content extraction.
//!
//! Phase 2 of the build. For one document this derives:
//!
//! - **Title**: the first line that, after trimming, starts with `# `; the
//!   rest of that line is the title. Extra spaces between the marker and the
//!   text are dropped too, so `#   Title` gives "Title", not "  Title". Otherwise the file name without its
//!   extension, with `-` and `_` turned into spaces (`my-post.md` → "my post").
//! - **URL**: the path relative to the source root with `.md` swapped for
//!   `.html`, always `/`-separated (`blog/first-post.md` → `blog/first-post.html`).
//! - **Body**: the document converted to an HTML fragment by a [`Converter`].
//!
//! The timestamp is not assigned here: extraction may run on several threads,
//! and pages are stamped by the orchestrator as they enter the registry, in
//! discovery order.

use crate::config::MarkdownConfig;
use crate::types::Page;
use chrono::{DateTime, Utc};
use pulldown_cmark::{Options, Parser, html};
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Extension of generated pages.
pub const OUTPUT_EXTENSION: &str = "html";

/// A conversion failure reported by a [`Converter`].
#[derive(Error, Debug)]
#[error("{0}")]
pub struct ConvertError(pub String);

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to convert {path}: {source}")]
    Convert {
        path: PathBuf,
        #[source]
        source: ConvertError,
    },
}

impl ExtractError {
    pub fn path(&self) -> &Path {
        match self {
            ExtractError::Read { path, .. } | ExtractError::Convert { path, .. } => path,
        }
    }
}

/// Markup → HTML fragment. Implementations must be pure: the same input
/// always yields the same output.
pub trait Converter: Send + Sync {
    fn convert(&self, source: &str) -> Result<String, ConvertError>;
}

/// CommonMark converter backed by pulldown-cmark.
#[derive(Debug, Clone, Copy)]
pub struct Markdown {
    options: Options,
}

impl Markdown {
    pub fn new(config: &MarkdownConfig) -> Self {
        let mut options = Options::empty();
        options.set(Options::ENABLE_TABLES, config.tables);
        options.set(Options::ENABLE_STRIKETHROUGH, config.strikethrough);
        options.set(Options::ENABLE_FOOTNOTES, config.footnotes);
        options.set(Options::ENABLE_TASKLISTS, config.tasklists);
        options.set(Options::ENABLE_SMART_PUNCTUATION, config.smart_punctuation);
        Self { options }
    }
}

impl Default for Markdown {
    fn default() -> Self {
        Self::new(&MarkdownConfig::default())
    }
}

impl Converter for Markdown {
    fn convert(&self, source: &str) -> Result<String, ConvertError> {
        let parser = Parser::new_ext(source, self.options);
        let mut out = String::with_capacity(source.len() * 3 / 2);
        html::push_html(&mut out, parser);
        Ok(out)
    }
}

/// A document's derived data, waiting for its registry timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub source: PathBuf,
    pub title: String,
    pub body: String,
    pub url: String,
}

impl Extracted {
    pub fn into_page(self, created_at: DateTime<Utc>) -> Page {
        Page {
            title: self.title,
            body: self.body,
            created_at,
            url: self.url,
            description: None,
        }
    }
}

/// Read, convert and derive metadata for one document.
///
/// Invalid UTF-8 is replaced rather than rejected; only a failed read or a
/// failed conversion is an error.
pub fn extract(
    root: &Path,
    path: &Path,
    converter: &dyn Converter,
) -> Result<Extracted, ExtractError> {
    let bytes = fs::read(path).map_err(|source| ExtractError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8_lossy(&bytes);

    let body = converter
        .convert(&text)
        .map_err(|source| ExtractError::Convert {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(Extracted {
        source: path.to_path_buf(),
        title: derive_title(&text, path),
        body,
        url: derive_url(root, path),
    })
}

/// First top-level heading, else a title made from the file name.
pub fn derive_title(source: &str, path: &Path) -> String {
    source
        .lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix("# "))
        .map(|rest| rest.trim_start().to_string())
        .unwrap_or_else(|| title_from_filename(path))
}

fn title_from_filename(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().replace(['-', '_'], " "))
        .unwrap_or_default()
}

/// Output URL for a document: source-relative path, extension swapped.
///
/// Purely a function of the path; two documents can only share a URL if they
/// share a relative path.
pub fn derive_url(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let segments: Vec<String> = relative
        .with_extension(OUTPUT_EXTENSION)
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::INDEX_URL;
    use crate::test_helpers::setup_fixtures;
    use chrono::TimeZone;
    use tempfile::TempDir;

    struct FailingConverter;

    impl Converter for FailingConverter {
        fn convert(&self, _source: &str) -> Result<String, ConvertError> {
            Err(ConvertError("unsupported construct".into()))
        }
    }

    // =========================================================================
    // Title derivation
    // =========================================================================

    #[test]
    fn title_from_first_heading() {
        let title = derive_title("# Hello World\n\nBody", Path::new("x.md"));
        assert_eq!(title, "Hello World");
    }

    #[test]
    fn title_from_filename_when_no_heading() {
        let title = derive_title("just text\n\nmore", Path::new("content/my-post.md"));
        assert_eq!(title, "my post");
    }

    #[test]
    fn filename_fallback_replaces_underscores() {
        let title = derive_title("", Path::new("second_post-draft.md"));
        assert_eq!(title, "second post draft");
    }

    #[test]
    fn title_drops_extra_spaces_after_marker() {
        assert_eq!(derive_title("#   Spaced Out  \n", Path::new("x.md")), "Spaced Out");
    }

    #[test]
    fn title_ignores_deeper_headings() {
        let source = "## Section\n### Sub\n# Real Title\n";
        assert_eq!(derive_title(source, Path::new("x.md")), "Real Title");
    }

    #[test]
    fn first_heading_wins() {
        let source = "# One\n# Two\n";
        assert_eq!(derive_title(source, Path::new("x.md")), "One");
    }

    #[test]
    fn heading_line_is_trimmed() {
        let source = "intro\n   # Indented Title  \r\nbody";
        assert_eq!(derive_title(source, Path::new("x.md")), "Indented Title");
    }

    #[test]
    fn hash_without_space_is_not_a_heading() {
        let source = "#hashtag\n#\n";
        assert_eq!(derive_title(source, Path::new("tags.md")), "tags");
    }

    // =========================================================================
    // URL derivation
    // =========================================================================

    #[test]
    fn url_swaps_extension() {
        let root = Path::new("/site/content");
        assert_eq!(
            derive_url(root, Path::new("/site/content/about.md")),
            "about.html"
        );
    }

    #[test]
    fn url_keeps_subdirectories() {
        let root = Path::new("content");
        assert_eq!(
            derive_url(root, Path::new("content/blog/2024/first-post.md")),
            "blog/2024/first-post.html"
        );
    }

    #[test]
    fn url_for_root_index() {
        let root = Path::new("content");
        assert_eq!(derive_url(root, Path::new("content/index.md")), INDEX_URL);
    }

    #[test]
    fn url_keeps_inner_dots() {
        let root = Path::new("content");
        assert_eq!(
            derive_url(root, Path::new("content/v1.2-notes.md")),
            "v1.2-notes.html"
        );
    }

    #[test]
    fn url_is_pure_function_of_relative_path() {
        let a = derive_url(Path::new("/a/content"), Path::new("/a/content/x/y.md"));
        let b = derive_url(Path::new("other"), Path::new("other/x/y.md"));
        assert_eq!(a, b);
    }

    // =========================================================================
    // Conversion and extraction
    // =========================================================================

    #[test]
    fn markdown_converts_to_html() {
        let html = Markdown::default().convert("# Title\n\n*em*").unwrap();
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<em>em</em>"));
    }

    #[test]
    fn markdown_tables_follow_config() {
        let source = "| a | b |\n|---|---|\n| 1 | 2 |\n";
        let with = Markdown::default().convert(source).unwrap();
        assert!(with.contains("<table>"));

        let config = MarkdownConfig {
            tables: false,
            ..MarkdownConfig::default()
        };
        let without = Markdown::new(&config).convert(source).unwrap();
        assert!(!without.contains("<table>"));
    }

    #[test]
    fn extract_fixture_document() {
        let tmp = setup_fixtures();
        let root = tmp.path().join("content");
        let path = root.join("blog/first-post.md");

        let extracted = extract(&root, &path, &Markdown::default()).unwrap();
        assert_eq!(extracted.title, "My First Blog Post");
        assert_eq!(extracted.url, "blog/first-post.html");
        assert!(extracted.body.contains("<h1>My First Blog Post</h1>"));
        assert_eq!(extracted.source, path);
    }

    #[test]
    fn extract_missing_file_is_read_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("gone.md");
        let err = extract(tmp.path(), &path, &Markdown::default()).unwrap_err();
        assert!(matches!(err, ExtractError::Read { .. }));
        assert_eq!(err.path(), path.as_path());
    }

    #[test]
    fn extract_reports_converter_failure() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a.md");
        fs::write(&path, "# A").unwrap();
        let err = extract(tmp.path(), &path, &FailingConverter).unwrap_err();
        assert!(matches!(err, ExtractError::Convert { .. }));
    }

    #[test]
    fn extract_tolerates_invalid_utf8() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("latin1.md");
        fs::write(&path, b"# Caf\xe9\n").unwrap();
        let extracted = extract(tmp.path(), &path, &Markdown::default()).unwrap();
        assert!(extracted.title.starts_with("Caf"));
    }

    #[test]
    fn into_page_carries_fields() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let page = Extracted {
            source: PathBuf::from("content/a.md"),
            title: "A".into(),
            body: "<p>a</p>".into(),
            url: "a.html".into(),
        }
        .into_page(at);
        assert_eq!(page.title, "A");
        assert_eq!(page.url, "a.html");
        assert_eq!(page.created_at, at);
        assert_eq!(page.description, None);
    }
}
