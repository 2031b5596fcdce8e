//! Index page generation.
//!
//! Phase 5 of the build. Renders the fixed landing page: a sidebar with every
//! page plus a listing of title, link and date, in registry order.
//!
//! ## Precedence
//!
//! The index is written to `<output>/index.html` after every other page. A
//! source document that maps to `index.html` (i.e. `content/index.md`) is
//! rendered first and then overwritten: the listing always wins. The
//! document still appears in the listing itself.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/). The layout is not user-editable;
//! titles are escaped automatically.

use crate::config::SiteConfig;
use crate::types::Page;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Conventional URL of the landing page.
pub const INDEX_URL: &str = "index.html";

const CSS: &str = include_str!("../static/index.css");

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("failed to write index {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Render the index and write it to `<output_root>/index.html`.
pub fn build_index(
    output_root: &Path,
    pages: &[Page],
    config: &SiteConfig,
) -> Result<PathBuf, IndexError> {
    let path = output_root.join(INDEX_URL);
    let markup = render_index(pages, config);
    fs::write(&path, markup.into_string()).map_err(|source| IndexError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Renders the index page.
pub fn render_index(pages: &[Page], config: &SiteConfig) -> Markup {
    let title = config.site.title.as_str();
    let date_format = config.site.date_format.as_str();

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(CSS)) }
            }
            body {
                div.layout {
                    (sidebar(pages))
                    div.main-content {
                        div.container {
                            h1 { (title) }
                            ul.page-list {
                                @for page in pages {
                                    li {
                                        a href=(page.url) { (page.title) }
                                        time datetime=(page.date("%Y-%m-%d")) {
                                            (page.date(date_format))
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Sidebar listing every page; the index entry is marked active.
fn sidebar(pages: &[Page]) -> Markup {
    html! {
        nav.sidebar {
            h3 { "Posts" }
            ul {
                @for page in pages {
                    @let is_active = page.url == INDEX_URL;
                    li {
                        a href=(page.url) class=[is_active.then_some("active")] {
                            (page.title)
                        }
                    }
                }
            }
        }
    }
}
