//! CLI output formatting for build results.
//!
//! # Information-First Display
//!
//! Each page leads with its position in the final registry order and its
//! title; the URL it was written to follows the arrow. Skipped work is listed
//! separately so a degraded build is visible at a glance, not only in the log.
//!
//! ```text
//! Pages
//! 001 Deeply Nested → notes/deep/nested-note.html
//! 002 About → about.html
//!
//! Index → index.html
//!     Replaces: content/index.md
//!
//! Skipped
//!     content/broken.md (extract)
//!         failed to read content/broken.md: No such file or directory
//!
//! Generated 2 pages + index → public (1 skipped)
//! ```
//!
//! `format_*` functions are pure and return lines; `print_*` wrappers write
//! them to stdout.

use crate::pipeline::BuildReport;
use crate::scaffold::InitReport;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

pub fn format_build_output(report: &BuildReport) -> Vec<String> {
    let mut lines = Vec::new();

    if !report.pages.is_empty() {
        lines.push("Pages".to_string());
        for (i, page) in report.pages.iter().enumerate() {
            lines.push(format!(
                "{} {} → {}",
                format_index(i + 1),
                page.title,
                page.url
            ));
        }
        lines.push(String::new());
    }

    lines.push(format!("Index → {}", crate::index::INDEX_URL));
    if let Some(doc) = &report.index_shadowed {
        lines.push(format!("{}Replaces: {}", indent(1), doc));
    }

    if !report.skipped.is_empty() {
        lines.push(String::new());
        lines.push("Skipped".to_string());
        for skip in &report.skipped {
            lines.push(format!("{}{} ({})", indent(1), skip.target, skip.stage));
            lines.push(format!("{}{}", indent(2), skip.reason));
        }
    }

    lines.push(String::new());
    let mut summary = format!(
        "Generated {} + index → {}",
        plural(report.pages.len(), "page"),
        report.output_dir.display()
    );
    if report.is_degraded() {
        summary.push_str(&format!(" ({} skipped)", report.skipped.len()));
    }
    lines.push(summary);
    lines
}

pub fn print_build_output(report: &BuildReport) {
    for line in format_build_output(report) {
        println!("{}", line);
    }
}

pub fn format_init_output(report: &InitReport) -> Vec<String> {
    let mut lines = Vec::new();
    for path in &report.created {
        lines.push(format!("Created {}", path.display()));
    }
    for path in &report.kept {
        lines.push(format!("Kept {} (already exists)", path.display()));
    }
    lines.push(String::new());
    lines.push("Next steps:".to_string());
    lines.push(format!("{}1. Add markdown files to the 'content' directory", indent(1)));
    lines.push(format!("{}2. Run 'twig' to build your site", indent(1)));
    lines.push(format!("{}3. Run 'twig build --serve' to preview locally", indent(1)));
    lines
}

pub fn print_init_output(report: &InitReport) {
    for line in format_init_output(report) {
        println!("{}", line);
    }
}
