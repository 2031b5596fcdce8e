//! Shared types used across the build phases.
//!
//! A [`Page`] is created by [`crate::extract`], held by the
//! [`crate::registry`], and read by [`crate::render`] and [`crate::index`].

use chrono::{DateTime, Utc};
use std::fmt::Write;

/// Date format used when a configured format cannot be applied.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// One rendered unit: a document's derived title, converted body, timestamp
/// and output URL.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// First `# heading` of the document, or the filename with `-`/`_` → spaces
    pub title: String,
    /// Converted HTML fragment, inserted into the layout without escaping
    pub body: String,
    /// Wall-clock time at which the page entered the registry
    pub created_at: DateTime<Utc>,
    /// Output path relative to the output root, `/`-separated (`blog/post.html`)
    pub url: String,
    /// Reserved summary; nothing sets it yet
    pub description: Option<String>,
}

impl Page {
    /// Format `created_at` for display.
    pub fn date(&self, format: &str) -> String {
        format_date(&self.created_at, format)
    }
}

/// Navigation entry handed to templates, one per registry page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavEntry {
    pub url: String,
    pub title: String,
    pub date: String,
    /// True for the page being rendered and for the index entry
    pub active: bool,
}

/// Format a timestamp with a strftime-style pattern.
///
/// Falls back to [`DEFAULT_DATE_FORMAT`] when the pattern contains an invalid
/// specifier, instead of panicking inside `Display`.
pub fn format_date(date: &DateTime<Utc>, format: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", date.format(format)).is_err() {
        out.clear();
        let _ = write!(out, "{}", date.format(DEFAULT_DATE_FORMAT));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn page_at(y: i32, m: u32, d: u32) -> Page {
        Page {
            title: "t".into(),
            body: String::new(),
            created_at: Utc.with_ymd_and_hms(y, m, d, 12, 30, 0).unwrap(),
            url: "t.html".into(),
            description: None,
        }
    }

    #[test]
    fn date_uses_iso_format_by_default() {
        assert_eq!(page_at(2024, 3, 7).date(DEFAULT_DATE_FORMAT), "2024-03-07");
    }

    #[test]
    fn date_honors_custom_format() {
        assert_eq!(page_at(2024, 3, 7).date("%d/%m/%Y"), "07/03/2024");
    }

    #[test]
    fn invalid_format_falls_back_instead_of_panicking() {
        assert_eq!(page_at(2024, 3, 7).date("%Q"), "2024-03-07");
    }
}
