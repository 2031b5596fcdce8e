//! Per-page rendering.
//!
//! Phase 4 of the build. Every page is rendered through the user's layout
//! template with the *whole* registry in scope, so the navigation of each page
//! lists every page, including those discovered after it.
//!
//! ## Template Variables
//!
//! The layout is a [Liquid](https://shopify.github.io/liquid/) template:
//!
//! | Variable | Value |
//! |----------|-------|
//! | `Title` | Page title, HTML-escaped |
//! | `Content` | Converted HTML body, inserted verbatim |
//! | `URL` | Page URL relative to the output root, HTML-escaped |
//! | `Date` | Page timestamp, formatted with `site.date_format` |
//! | `Description` | Reserved, currently always nil |
//! | `Root` | Relative prefix back to the output root (`""`, `"../"`, ...) |
//! | `AllPages` | Every page in registry order: `URL`, `Title`, `Date`, `Active` |
//!
//! `Active` is true for the page being rendered and for the index entry.
//!
//! Liquid never escapes output, so every text value is escaped before it is
//! handed to the template. `Content` is the only raw value. Do not add
//! `| escape` in the layout; it would escape twice.
//!
//! ```liquid
//! <nav>
//!   {% for p in AllPages %}
//!   <a href="{{ Root }}{{ p.URL }}"{% if p.Active %} class="active"{% endif %}>{{ p.Title }}</a>
//!   {% endfor %}
//! </nav>
//! <main>{{ Content }}</main>
//! ```
//!
//! Liquid rejects unknown variables at render time; such a failure affects
//! each page separately and is reported per page.

use crate::index::INDEX_URL;
use crate::types::{NavEntry, Page, format_date};
use liquid::model::Value;
use liquid::{Object, ParserBuilder, Template};
use maud::html;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to read template {path}: {source}")]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse template: {0}")]
    Template(#[source] liquid::Error),
    #[error("failed to render {url}: {source}")]
    Render {
        url: String,
        #[source]
        source: liquid::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RenderError {
    /// Whether the error concerns the template itself rather than one page.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RenderError::TemplateRead { .. } | RenderError::Template(_)
        )
    }
}

/// A parsed page layout.
pub struct Layout {
    template: Template,
}

impl std::fmt::Debug for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Layout").finish_non_exhaustive()
    }
}

impl Layout {
    /// Read and parse a layout file.
    pub fn load(path: &Path) -> Result<Self, RenderError> {
        let source = fs::read_to_string(path).map_err(|source| RenderError::TemplateRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&source)
    }

    pub fn parse(source: &str) -> Result<Self, RenderError> {
        let parser = ParserBuilder::with_stdlib()
            .build()
            .map_err(RenderError::Template)?;
        let template = parser.parse(source).map_err(RenderError::Template)?;
        Ok(Self { template })
    }

    /// Render one page with `pages` as its navigation.
    pub fn render(
        &self,
        page: &Page,
        pages: &[Page],
        date_format: &str,
    ) -> Result<String, RenderError> {
        let globals = page_globals(page, pages, date_format);
        self.template
            .render(&globals)
            .map_err(|source| RenderError::Render {
                url: page.url.clone(),
                source,
            })
    }
}

/// Navigation entries for `current_url`, in registry order.
pub fn nav_entries(current_url: &str, pages: &[Page], date_format: &str) -> Vec<NavEntry> {
    pages
        .iter()
        .map(|p| NavEntry {
            url: p.url.clone(),
            title: p.title.clone(),
            date: p.date(date_format),
            active: p.url == current_url || p.url == INDEX_URL,
        })
        .collect()
}

/// Prefix that leads from a page back to the output root.
///
/// `index.html` → `""`, `blog/post.html` → `"../"`.
pub fn relative_root(url: &str) -> String {
    "../".repeat(url.matches('/').count())
}

fn page_globals(page: &Page, pages: &[Page], date_format: &str) -> Object {
    let all_pages = nav_entries(&page.url, pages, date_format)
        .into_iter()
        .map(|entry| {
            let mut obj = Object::new();
            obj.insert("URL".into(), escaped(&entry.url));
            obj.insert("Title".into(), escaped(&entry.title));
            obj.insert("Date".into(), escaped(&entry.date));
            obj.insert("Active".into(), Value::scalar(entry.active));
            Value::Object(obj)
        })
        .collect();

    let mut globals = Object::new();
    globals.insert("Title".into(), escaped(&page.title));
    globals.insert("Content".into(), Value::scalar(page.body.clone()));
    globals.insert("URL".into(), escaped(&page.url));
    globals.insert(
        "Date".into(),
        escaped(&format_date(&page.created_at, date_format)),
    );
    globals.insert(
        "Description".into(),
        page.description
            .as_deref()
            .map(escaped)
            .unwrap_or(Value::Nil),
    );
    globals.insert("Root".into(), Value::scalar(relative_root(&page.url)));
    globals.insert("AllPages".into(), Value::Array(all_pages));
    globals
}

/// Text as a Liquid value with HTML special characters escaped.
fn escaped(text: &str) -> Value {
    Value::scalar(html! { (text) }.into_string())
}

/// Write a rendered page to `<output_root>/<url>`, creating parent
/// directories and replacing any existing file.
pub fn write_page(output_root: &Path, url: &str, html: &str) -> Result<PathBuf, RenderError> {
    let path = output_root.join(url);
    let write_err = |source| RenderError::Write {
        path: path.clone(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(&path, html).map_err(write_err)?;
    Ok(path)
}
