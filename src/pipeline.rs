//! Build orchestration.
//!
//! Sequences the phases and applies the error policy:
//!
//! ```text
//! Scanning → Extracting → Sorting → Rendering → IndexBuilding → Done
//!     │                                 │              │
//!     └──────────── Failed ◄────────────┴──────────────┘
//! ```
//!
//! | Phase | On error |
//! |-------|----------|
//! | output dir creation | fatal, before scanning starts |
//! | Scanning | fatal |
//! | Extracting | document skipped, logged, recorded in the report |
//! | Sorting | cannot fail |
//! | Rendering | template read/parse is fatal; a page that fails to render or write is skipped |
//! | IndexBuilding | fatal, there is no fallback index |
//!
//! ## Phase Barrier
//!
//! Pages are rendered exactly once, after the registry has been fully
//! populated and sorted. Every page therefore sees the final navigation; no
//! provisional render is ever written.
//!
//! ## Parallel Extraction
//!
//! Reading and converting documents has no cross-document dependency, so it
//! runs on a rayon pool. Results are collected in discovery order, then the
//! orchestrator thread stamps and appends them one by one: the registry has a
//! single writer, and timestamps increase in discovery order.

use crate::clock::{Clock, SystemClock};
use crate::config::{self, SiteConfig};
use crate::extract::{self, Converter, ExtractError, Extracted, Markdown};
use crate::index::{self, INDEX_URL, IndexError};
use crate::registry::{PageRegistry, SortedRegistry};
use crate::render::{self, Layout, RenderError};
use crate::scan::{self, ScanError};
use log::{debug, info, warn};
use rayon::prelude::*;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Template(RenderError),
    #[error(transparent)]
    Index(#[from] IndexError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    Idle,
    Scanning,
    Extracting,
    Sorting,
    Rendering,
    IndexBuilding,
    Done,
    Failed,
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuildState::Idle => "idle",
            BuildState::Scanning => "scanning",
            BuildState::Extracting => "extracting",
            BuildState::Sorting => "sorting",
            BuildState::Rendering => "rendering",
            BuildState::IndexBuilding => "building index",
            BuildState::Done => "done",
            BuildState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// The three resolved locations a build needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPaths {
    pub source: PathBuf,
    pub output: PathBuf,
    pub template: PathBuf,
}

impl BuildPaths {
    pub fn new(
        source: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        template: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source: source.into(),
            output: output.into(),
            template: template.into(),
        }
    }
}

/// Phase in which a unit of work was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipStage {
    Extract,
    Render,
}

impl fmt::Display for SkipStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipStage::Extract => f.write_str("extract"),
            SkipStage::Render => f.write_str("render"),
        }
    }
}

/// A document or page left out of the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    /// Source path for extraction failures, output URL for render failures
    pub target: String,
    pub stage: SkipStage,
    pub reason: String,
}

/// A page that made it to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenPage {
    pub title: String,
    pub url: String,
    pub path: PathBuf,
}

/// Outcome of a successful (possibly degraded) build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub output_dir: PathBuf,
    /// Pages on disk, in final registry order. A page replaced by the index
    /// is not listed.
    pub pages: Vec<WrittenPage>,
    pub skipped: Vec<Skipped>,
    pub index_path: PathBuf,
    /// Source document whose rendered page was replaced by the index
    pub index_shadowed: Option<String>,
}

impl BuildReport {
    pub fn is_degraded(&self) -> bool {
        !self.skipped.is_empty()
    }
}

/// Runs one build of a source tree into an output directory.
pub struct SiteBuilder {
    paths: BuildPaths,
    config: SiteConfig,
    clock: Box<dyn Clock>,
    converter: Option<Box<dyn Converter>>,
    state: BuildState,
}

impl SiteBuilder {
    pub fn new(paths: BuildPaths) -> Self {
        Self {
            paths,
            config: SiteConfig::default(),
            clock: Box::new(SystemClock),
            converter: None,
            state: BuildState::Idle,
        }
    }

    pub fn with_config(mut self, config: SiteConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Replace the markdown converter built from `[markdown]` config.
    pub fn with_converter(mut self, converter: impl Converter + 'static) -> Self {
        self.converter = Some(Box::new(converter));
        self
    }

    pub fn paths(&self) -> &BuildPaths {
        &self.paths
    }

    pub fn state(&self) -> BuildState {
        self.state
    }

    /// Run every phase. Fatal errors leave the builder in [`BuildState::Failed`].
    pub fn build(&mut self) -> Result<BuildReport, BuildError> {
        let result = self.run();
        if result.is_err() {
            self.transition(BuildState::Failed);
        }
        result
    }

    fn run(&mut self) -> Result<BuildReport, BuildError> {
        fs::create_dir_all(&self.paths.output).map_err(|source| BuildError::OutputDir {
            path: self.paths.output.clone(),
            source,
        })?;

        self.transition(BuildState::Scanning);
        let documents = scan::scan(&self.paths.source)?;

        self.transition(BuildState::Extracting);
        let mut skipped = Vec::new();
        let registry = self.extract_all(&documents, &mut skipped);

        self.transition(BuildState::Sorting);
        let registry = registry.sort_by_recency_desc();

        self.transition(BuildState::Rendering);
        let layout = Layout::load(&self.paths.template).map_err(BuildError::Template)?;
        let mut pages = self.render_all(&layout, &registry, &mut skipped);

        self.transition(BuildState::IndexBuilding);
        let index_shadowed = self.take_shadowed_page(&mut pages, &documents);
        if let Some(doc) = &index_shadowed {
            info!("{doc} maps to {INDEX_URL}; replaced by the generated index");
        }
        let index_path = index::build_index(&self.paths.output, registry.snapshot(), &self.config)?;

        self.transition(BuildState::Done);
        if !skipped.is_empty() {
            warn!(
                "build finished with {} skipped item(s); output may be incomplete",
                skipped.len()
            );
        }

        Ok(BuildReport {
            output_dir: self.paths.output.clone(),
            pages,
            skipped,
            index_path,
            index_shadowed,
        })
    }

    fn transition(&mut self, next: BuildState) {
        debug!("build: {} → {}", self.state, next);
        self.state = next;
    }

    /// Extract every document, then stamp and register the successes in
    /// discovery order.
    fn extract_all(&self, documents: &[PathBuf], skipped: &mut Vec<Skipped>) -> PageRegistry {
        let default_converter;
        let converter: &dyn Converter = match &self.converter {
            Some(custom) => custom.as_ref(),
            None => {
                default_converter = Markdown::new(&self.config.markdown);
                &default_converter
            }
        };

        let threads = config::effective_threads(&self.config.processing);
        let results = extract_parallel(&self.paths.source, documents, converter, threads);

        let mut registry = PageRegistry::new();
        for result in results {
            match result {
                Ok(extracted) => registry.append(extracted.into_page(self.clock.now())),
                Err(err) => {
                    warn!("skipping {}: {err}", err.path().display());
                    skipped.push(Skipped {
                        target: err.path().display().to_string(),
                        stage: SkipStage::Extract,
                        reason: error_chain(&err),
                    });
                }
            }
        }
        debug!("registered {} of {} documents", registry.len(), documents.len());
        registry
    }

    /// Remove the page the index is about to overwrite and return the
    /// document it came from. Nothing is shadowed unless that page was written.
    fn take_shadowed_page(
        &self,
        pages: &mut Vec<WrittenPage>,
        documents: &[PathBuf],
    ) -> Option<String> {
        let pos = pages.iter().position(|p| p.url == INDEX_URL)?;
        pages.remove(pos);
        documents
            .iter()
            .find(|doc| extract::derive_url(&self.paths.source, doc) == INDEX_URL)
            .map(|doc| doc.display().to_string())
    }

    fn render_all(
        &self,
        layout: &Layout,
        registry: &SortedRegistry,
        skipped: &mut Vec<Skipped>,
    ) -> Vec<WrittenPage> {
        let pages = registry.snapshot();
        let date_format = self.config.site.date_format.as_str();
        let mut written = Vec::with_capacity(pages.len());

        for page in registry {
            let outcome = layout
                .render(page, pages, date_format)
                .and_then(|html| render::write_page(&self.paths.output, &page.url, &html));
            match outcome {
                Ok(path) => written.push(WrittenPage {
                    title: page.title.clone(),
                    url: page.url.clone(),
                    path,
                }),
                Err(err) => {
                    warn!("skipping page {}: {err}", page.url);
                    skipped.push(Skipped {
                        target: page.url.clone(),
                        stage: SkipStage::Render,
                        reason: error_chain(&err),
                    });
                }
            }
        }
        written
    }
}

fn extract_parallel(
    root: &Path,
    documents: &[PathBuf],
    converter: &dyn Converter,
    threads: usize,
) -> Vec<Result<Extracted, ExtractError>> {
    let run = || -> Vec<Result<Extracted, ExtractError>> {
        documents
            .par_iter()
            .map(|path| extract::extract(root, path, converter))
            .collect()
    };
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool.install(run),
        Err(err) => {
            warn!("could not start worker pool ({err}); extracting sequentially");
            documents
                .iter()
                .map(|path| extract::extract(root, path, converter))
                .collect()
        }
    }
}

/// Error message including its sources, `outer: inner: innermost`.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        let text = inner.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = inner.source();
    }
    message
}
