//! Static call-graph extraction and linting for Temporal Go workflow code.
//!
//! The pipeline runs in three stages, each handing an owned value downstream:
//!
//! 1. [`analyzers`]: parse each `.go` file with tree-sitter and extract workflow,
//!    activity and handler declarations with their call sites.
//! 2. [`builders`]: merge per-file facts, resolve edges and freeze a
//!    [`core::TemporalGraph`] with structural statistics from [`analysis`].
//! 3. [`rules`]: run the closed rule catalog over the frozen graph and produce a
//!    sorted, capped [`rules::LintResult`].
//!
//! [`io`] renders graphs and lint results; [`tui`] browses them interactively.

pub mod analysis;
pub mod analyzers;
pub mod builders;
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod errors;
pub mod io;
pub mod llm;
pub mod pipeline;
pub mod progress;
pub mod rules;
pub mod tui;

pub use crate::analyzers::{GoExtractor, PatternExtractor};
pub use crate::builders::GraphBuilder;
pub use crate::config::TempographConfig;
pub use crate::core::{CancellationToken, NodeKind, TemporalGraph, TemporalNode};
pub use crate::pipeline::{analyze_path, Analysis, AnalysisPipeline};
pub use crate::rules::{Issue, LintEngine, LintResult, RuleKind, Severity};
