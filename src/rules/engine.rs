//! Rule orchestration: collect, enhance, filter, cap, sort, verdict.

use super::enhance::apply_enhancements;
use super::{Issue, IssueEnhancer, RuleContext, RuleKind, Severity};
use crate::config::{EnhancementConfig, LintConfig};
use crate::core::{CancellationToken, TemporalGraph};
use crate::errors::{Error, Result, EXIT_FINDINGS, EXIT_OK};
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info_span};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LintResult {
    pub issues: Vec<Issue>,
    pub error_count: usize,
    pub warn_count: usize,
    pub info_count: usize,
    pub exit_code: i32,
}

impl LintResult {
    pub fn is_failing(&self) -> bool {
        self.exit_code != EXIT_OK
    }

    pub fn total(&self) -> usize {
        self.issues.len()
    }
}

pub struct LintEngine {
    config: LintConfig,
    rules: Vec<RuleKind>,
    severities: HashMap<RuleKind, Severity>,
    long_running: Vec<Regex>,
    enhancer: Option<(Box<dyn IssueEnhancer>, EnhancementConfig)>,
}

impl LintEngine {
    /// Validates rule references and patterns up front so a bad configuration
    /// fails before any analysis output.
    pub fn new(config: LintConfig) -> Result<Self> {
        let enabled = resolve_rules(&config.enable)?;
        let disabled = resolve_rules(&config.disable)?;
        let rules = RuleKind::ALL
            .into_iter()
            .filter(|rule| enabled.is_empty() || enabled.contains(rule))
            .filter(|rule| !disabled.contains(rule))
            .collect();

        let mut severities = HashMap::new();
        for (reference, severity) in &config.severity_overrides {
            let rule = RuleKind::from_reference(reference)
                .ok_or_else(|| Error::config(format!("unknown rule '{}'", reference)))?;
            severities.insert(rule, *severity);
        }

        let long_running = config
            .long_running_patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            config,
            rules,
            severities,
            long_running,
            enhancer: None,
        })
    }

    pub fn with_enhancer(
        mut self,
        enhancer: Box<dyn IssueEnhancer>,
        config: EnhancementConfig,
    ) -> Self {
        self.enhancer = Some((enhancer, config));
        self
    }

    pub fn rules(&self) -> &[RuleKind] {
        &self.rules
    }

    pub fn severity_of(&self, rule: RuleKind) -> Severity {
        self.severities
            .get(&rule)
            .copied()
            .unwrap_or_else(|| rule.default_severity())
    }

    pub fn run(&self, graph: &TemporalGraph, cancel: &CancellationToken) -> LintResult {
        let _span = info_span!("lint", rules = self.rules.len()).entered();

        let mut issues = self.collect(graph, cancel);
        if let Some((enhancer, config)) = &self.enhancer {
            if !cancel.is_cancelled() {
                let before = issues.len();
                issues = apply_enhancements(issues, enhancer.as_ref(), config, graph);
                debug!(removed = before - issues.len(), "enhancement applied");
            }
        }

        let result = self.finish(issues);
        debug!(
            errors = result.error_count,
            warnings = result.warn_count,
            infos = result.info_count,
            "lint complete"
        );
        result
    }

    fn collect(&self, graph: &TemporalGraph, cancel: &CancellationToken) -> Vec<Issue> {
        let ctx = RuleContext {
            thresholds: self.config.thresholds,
            long_running: &self.long_running,
            cancel,
        };

        let mut issues = Vec::new();
        for rule in &self.rules {
            if cancel.is_cancelled() {
                debug!(rule = rule.id(), "cancelled before rule");
                break;
            }
            let severity = self.severity_of(*rule);
            let found = rule.check(graph, &ctx);
            debug!(rule = rule.id(), count = found.len(), "rule evaluated");
            issues.extend(found.into_iter().map(|mut issue| {
                issue.severity = severity;
                issue
            }));
        }
        issues
    }

    /// Filter by minimum severity, apply the cap, sort and compute the verdict.
    fn finish(&self, issues: Vec<Issue>) -> LintResult {
        let cap = match self.config.max_issues {
            0 => usize::MAX,
            n => n,
        };

        let mut result = LintResult {
            issues: Vec::new(),
            error_count: 0,
            warn_count: 0,
            info_count: 0,
            exit_code: EXIT_OK,
        };
        for issue in issues
            .into_iter()
            .filter(|issue| issue.severity >= self.config.min_severity)
        {
            if result.issues.len() >= cap {
                break;
            }
            match issue.severity {
                Severity::Error => result.error_count += 1,
                Severity::Warning => result.warn_count += 1,
                Severity::Info => result.info_count += 1,
            }
            result.issues.push(issue);
        }

        sort_issues(&mut result.issues);
        result.exit_code = verdict(
            result.error_count,
            result.warn_count,
            self.config.fail_on_warning,
        );
        result
    }
}

/// Severity descending, then file ascending, then line ascending; stable otherwise.
pub fn sort_issues(issues: &mut [Issue]) {
    issues.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| a.file.cmp(&b.file))
            .then_with(|| a.line.cmp(&b.line))
    });
}

pub fn verdict(errors: usize, warnings: usize, fail_on_warning: bool) -> i32 {
    if errors > 0 || (fail_on_warning && warnings > 0) {
        EXIT_FINDINGS
    } else {
        EXIT_OK
    }
}

fn resolve_rules(references: &[String]) -> Result<Vec<RuleKind>> {
    references
        .iter()
        .flat_map(|r| r.split(','))
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(|r| {
            RuleKind::from_reference(r).ok_or_else(|| Error::config(format!("unknown rule '{}'", r)))
        })
        .collect()
}
