//! Optional post-collection verification and fix enhancement.
//!
//! An [`IssueEnhancer`] may drop issues it confidently judges false positives and
//! may replace an issue's suggestion or fix. It never adds issues and never
//! touches severity. Any failure leaves the issue exactly as the rule produced it.

use super::{CodeFix, Issue, TextReplacement};
use crate::config::EnhancementConfig;
use crate::core::TemporalGraph;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

const MAX_OBSERVED_PATTERNS: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verification {
    pub valid: bool,
    pub confidence: f64,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnhancedFix {
    pub code: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub imports: Vec<String>,
}

/// Source lines around a flagged line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceContext {
    pub file: PathBuf,
    /// Line number of `lines[0]`.
    pub start_line: usize,
    pub lines: Vec<String>,
}

impl SourceContext {
    /// Reads `radius` lines either side of `line`; `None` when the file is unreadable.
    pub fn read(file: &Path, line: usize, radius: usize) -> Option<Self> {
        let content = std::fs::read_to_string(file).ok()?;
        Some(Self::from_source(file, &content, line, radius))
    }

    pub fn from_source(file: &Path, content: &str, line: usize, radius: usize) -> Self {
        let first = line.saturating_sub(radius).max(1);
        let lines = content
            .lines()
            .skip(first - 1)
            .take(line + radius + 1 - first)
            .map(str::to_string)
            .collect();
        Self {
            file: file.to_path_buf(),
            start_line: first,
            lines,
        }
    }

    /// Numbered listing, the way it is shown to the service.
    pub fn render(&self) -> String {
        self.lines
            .iter()
            .enumerate()
            .map(|(i, text)| format!("{:>5} | {}", self.start_line + i, text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub trait IssueEnhancer: Send + Sync {
    fn verify(&self, issue: &Issue, context: &SourceContext) -> anyhow::Result<Verification>;

    fn enhance_fix(
        &self,
        issue: &Issue,
        context: &SourceContext,
        observed_patterns: &[String],
    ) -> anyhow::Result<EnhancedFix>;
}

/// Option settings already used in the corpus, offered as house style.
pub fn observed_patterns(graph: &TemporalGraph) -> Vec<String> {
    let mut patterns = BTreeSet::new();
    for options in graph.nodes().filter_map(|n| n.activity_options.as_ref()) {
        let fields = [
            ("StartToCloseTimeout", &options.start_to_close_timeout),
            ("ScheduleToCloseTimeout", &options.schedule_to_close_timeout),
            ("ScheduleToStartTimeout", &options.schedule_to_start_timeout),
            ("HeartbeatTimeout", &options.heartbeat_timeout),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                patterns.insert(format!("{}: {}", field, value));
            }
        }
        if let Some(attempts) = options.retry_policy.as_ref().and_then(|r| r.maximum_attempts) {
            patterns.insert(format!("RetryPolicy.MaximumAttempts: {}", attempts));
        }
    }
    patterns.into_iter().take(MAX_OBSERVED_PATTERNS).collect()
}

pub fn apply_enhancements(
    issues: Vec<Issue>,
    enhancer: &dyn IssueEnhancer,
    config: &EnhancementConfig,
    graph: &TemporalGraph,
) -> Vec<Issue> {
    let patterns = observed_patterns(graph);
    let mut kept = Vec::with_capacity(issues.len());

    for mut issue in issues {
        let Some(context) = SourceContext::read(&issue.file, issue.line, config.context_lines)
        else {
            kept.push(issue);
            continue;
        };

        if config.verify {
            match enhancer.verify(&issue, &context) {
                Ok(verdict) if !verdict.valid && verdict.confidence >= config.confidence_threshold => {
                    log::info!(
                        "Dropping {} at {}: {}",
                        issue.rule_id,
                        issue.location(),
                        verdict.reason
                    );
                    continue;
                }
                Ok(verdict) => {
                    if let Some(suggestion) = verdict.suggestion.filter(|s| !s.trim().is_empty()) {
                        issue.suggestion = suggestion;
                    }
                }
                Err(e) => log::warn!("Verification failed for {}: {:#}", issue.location(), e),
            }
        }

        if config.enhance {
            match enhancer.enhance_fix(&issue, &context, &patterns) {
                Ok(fix) if !fix.code.trim().is_empty() => issue.fix = Some(to_code_fix(&issue, fix)),
                Ok(_) => {}
                Err(e) => log::warn!("Fix enhancement failed for {}: {:#}", issue.location(), e),
            }
        }

        kept.push(issue);
    }
    kept
}

fn to_code_fix(issue: &Issue, fix: EnhancedFix) -> CodeFix {
    let mut description = fix.explanation;
    if !fix.imports.is_empty() {
        description.push_str(&format!(" (imports: {})", fix.imports.join(", ")));
    }
    let mut code = fix.code;
    if !code.ends_with('\n') {
        code.push('\n');
    }
    CodeFix {
        description,
        replacements: vec![TextReplacement::insert_before(
            issue.file.clone(),
            issue.line,
            code,
        )],
    }
}
