//! # Twig
//!
//! A minimal static site generator. A directory tree of markdown documents is
//! turned into a set of linked HTML pages that share one layout template, plus
//! a generated index page listing every document.
//!
//! # Architecture: Phase-Barrier Pipeline
//!
//! Every page's navigation shows the complete, sorted set of pages, so nothing
//! can be rendered until every document has been read. The build is a strict
//! sequence of phases with a barrier before rendering:
//!
//! ```text
//! 1. Scan       content/   →  [paths]          (walk the tree, all-or-nothing)
//! 2. Extract    [paths]    →  PageRegistry     (title, url, html; per-file best effort)
//! 3. Sort       registry   →  SortedRegistry   (newest first, stable, exactly once)
//! 4. Render     registry   →  public/**.html   (layout template, per-page best effort)
//! 5. Index      registry   →  public/index.html (always last, always wins)
//! ```
//!
//! The orchestration and its state machine live in [`pipeline`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Walks the source tree and returns document paths in a deterministic order |
//! | [`extract`] | Title and URL derivation, markdown conversion through the [`extract::Converter`] seam |
//! | [`registry`] | The ordered page collection; sorting turns it into a read-only [`registry::SortedRegistry`] |
//! | [`render`] | Per-page layout rendering with Liquid and writing pages to disk |
//! | [`index`] | The fixed index/listing page, rendered with Maud |
//! | [`pipeline`] | Build orchestrator: phases, error policy, [`pipeline::BuildReport`] |
//! | [`config`] | Optional `config.toml` loading, merging and validation |
//! | [`clock`] | Injectable time source for page timestamps |
//! | [`types`] | Shared types (`Page`, `NavEntry`) |
//! | [`output`] | CLI output formatting for build results |
//! | [`serve`] | Local preview server for the output directory |
//! | [`scaffold`] | `twig init`: sample content and a starter template |
//!
//! # Design Decisions
//!
//! ## Timestamps Are Process Time
//!
//! A page's `created_at` is the moment it entered the registry, not a file or
//! front-matter date. Within one build, "newest first" therefore means
//! "reverse discovery order". Tests inject a [`clock::Clock`] to make output
//! byte-for-byte reproducible.
//!
//! ## Liquid for the Layout, Maud for the Index
//!
//! The page layout belongs to the user and is read at runtime, so it is a
//! Liquid template. The index layout is fixed and ships with the binary, so it
//! is compile-time checked Maud markup with automatic escaping.
//!
//! ## Errors: Fatal vs. Degraded
//!
//! Scanning, output-directory creation, template parsing and index writing
//! abort the build. A document that cannot be read or converted, or a page that
//! cannot be rendered or written, is logged and skipped; the build still
//! succeeds and lists the omission in its [`pipeline::BuildReport`].

pub mod clock;
pub mod config;
pub mod extract;
pub mod index;
pub mod output;
pub mod pipeline;
pub mod registry;
pub mod render;
pub mod scaffold;
pub mod scan;
pub mod serve;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
