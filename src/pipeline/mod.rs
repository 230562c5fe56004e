//! End-to-end analysis: walk, extract, merge, freeze.
//!
//! Extraction is the only parallel stage. Per-file results are re-sorted by path
//! before the single-threaded merge so the graph never depends on completion order.

use crate::analyzers::{extract_file, FileFacts, GoExtractor, PatternExtractor};
use crate::builders::GraphBuilder;
use crate::config::ExtractionConfig;
use crate::core::{CancellationToken, Diagnostic, TemporalGraph};
use crate::errors::Result;
use crate::io::FileWalker;
use crate::progress::{ProgressManager, TEMPLATE_EXTRACTION};
use indicatif::{ParallelProgressIterator, ProgressBar};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, info_span, warn};

/// The frozen graph plus everything that went wrong along the way.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub root: PathBuf,
    pub graph: TemporalGraph,
    pub diagnostics: Vec<Diagnostic>,
    pub files_scanned: usize,
    pub cancelled: bool,
}

pub struct AnalysisPipeline<'a> {
    config: &'a ExtractionConfig,
    progress: ProgressManager,
    cancel: CancellationToken,
}

impl<'a> AnalysisPipeline<'a> {
    pub fn new(config: &'a ExtractionConfig) -> Self {
        Self {
            config,
            progress: ProgressManager::hidden(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressManager) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Fails only when the root cannot be walked or the configuration is invalid;
    /// per-file problems end up in [`Analysis::diagnostics`].
    pub fn run(&self, root: &Path) -> Result<Analysis> {
        let span = info_span!("analysis", root = %root.display(), parallel = self.config.parallel);
        let _guard = span.enter();

        let files = FileWalker::from_config(root.to_path_buf(), self.config)?.walk()?;
        info!(file_count = files.len(), "Discovered source files");

        let extractor = GoExtractor::from_config(self.config)
            .map_err(|e| crate::errors::Error::config(format!("{:#}", e)))?;

        let facts = {
            let _span = info_span!("extraction").entered();
            let bar = self.progress.create_bar(files.len() as u64, TEMPLATE_EXTRACTION);
            bar.set_message("Extracting");
            let mut facts = if self.config.parallel {
                self.extract_parallel(&files, &extractor, bar.clone())
            } else {
                self.extract_sequential(&files, &extractor, &bar)
            };
            bar.finish_and_clear();
            facts.sort_by(|a, b| a.path.cmp(&b.path));
            facts
        };

        let mut builder = GraphBuilder::new();
        for file in facts {
            builder.add_file(file);
        }

        let (graph, diagnostics) = {
            let _span = info_span!("graph_building", nodes = builder.len()).entered();
            builder.build(&self.cancel)
        };

        for diagnostic in &diagnostics {
            warn!("{}", diagnostic);
        }
        debug!(
            nodes = graph.len(),
            max_depth = graph.stats().max_depth,
            cycles = graph.stats().cycle_count,
            "Graph frozen"
        );

        Ok(Analysis {
            root: root.to_path_buf(),
            graph,
            diagnostics,
            files_scanned: files.len(),
            cancelled: self.cancel.is_cancelled(),
        })
    }

    fn extract_parallel(
        &self,
        files: &[PathBuf],
        extractor: &dyn PatternExtractor,
        bar: ProgressBar,
    ) -> Vec<FileFacts> {
        files
            .par_iter()
            .progress_with(bar)
            .filter(|_| !self.cancel.is_cancelled())
            .map(|path| extract_file(path, extractor))
            .collect()
    }

    fn extract_sequential(
        &self,
        files: &[PathBuf],
        extractor: &dyn PatternExtractor,
        bar: &ProgressBar,
    ) -> Vec<FileFacts> {
        let mut facts = Vec::with_capacity(files.len());
        for path in files {
            if self.cancel.is_cancelled() {
                debug!("Extraction cancelled after {} files", facts.len());
                break;
            }
            facts.push(extract_file(path, extractor));
            bar.inc(1);
        }
        facts
    }
}

/// Analyze `root` with defaults for progress and cancellation.
pub fn analyze_path(root: &Path, config: &ExtractionConfig) -> Result<Analysis> {
    AnalysisPipeline::new(config).run(root)
}
