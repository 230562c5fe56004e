//! Configuration for extraction, linting and the enhancement hook.
//!
//! Values come from `.tempograph.toml` (see [`loader`]) and are then overridden by
//! command-line flags. Every section has serde defaults so a partial file is valid.

pub mod loader;

pub use loader::{find_config_file, load_config, parse_config, CONFIG_FILE_NAME};

use crate::rules::Severity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TempographConfig {
    pub extraction: ExtractionConfig,
    pub lint: LintConfig,
    pub enhancement: EnhancementConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Regexes matched against function names to classify workflows.
    pub workflow_name_patterns: Vec<String>,
    pub activity_name_patterns: Vec<String>,
    /// Type text of the first non-receiver parameter that marks a workflow.
    pub workflow_context_types: Vec<String>,
    pub activity_context_types: Vec<String>,
    pub include_tests: bool,
    pub include_vendor: bool,
    /// Glob patterns of paths to skip.
    pub exclude: Vec<String>,
    pub parallel: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            workflow_name_patterns: vec!["Workflow$".to_string()],
            activity_name_patterns: vec!["Activity$".to_string()],
            workflow_context_types: vec!["workflow.Context".to_string()],
            activity_context_types: vec!["context.Context".to_string()],
            include_tests: false,
            include_vendor: false,
            exclude: Vec::new(),
            parallel: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ThresholdsConfig {
    pub max_fan_out: usize,
    pub max_call_depth: usize,
    /// Call-site count at which a workflow is expected to use versioning.
    pub versioning_complexity: usize,
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self {
            max_fan_out: 15,
            max_call_depth: 10,
            versioning_complexity: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LintConfig {
    pub min_severity: Severity,
    /// When non-empty, only these rules (by ID or name) run.
    pub enable: Vec<String>,
    pub disable: Vec<String>,
    pub thresholds: ThresholdsConfig,
    /// Zero means unlimited.
    pub max_issues: usize,
    pub fail_on_warning: bool,
    /// Per-rule severity overrides keyed by rule ID or name.
    pub severity_overrides: BTreeMap<String, Severity>,
    /// Regexes marking activity names as likely long-running.
    pub long_running_patterns: Vec<String>,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            min_severity: Severity::Info,
            enable: Vec::new(),
            disable: Vec::new(),
            thresholds: ThresholdsConfig::default(),
            max_issues: 0,
            fail_on_warning: false,
            severity_overrides: BTreeMap::new(),
            long_running_patterns: default_long_running_patterns(),
        }
    }
}

/// Words that mark an activity name as likely long-running, with their common inflections.
const LONG_RUNNING_WORDS: &str = "Process(?:es|ing|or)?|Batch(?:es|ed)?|Bulk|Import(?:s|er|ing)?\
    |Export(?:s|er|ing)?|Sync(?:s|er|ing)?|Migrat(?:e|es|ion|ions|or)|Upload(?:s|er|ing)?\
    |Download(?:s|er|ing)?|Poll(?:s|er|ing)?|Stream(?:s|er|ing)?|Scan(?:s|ner|ning)?\
    |Backup(?:s)?|Train(?:ing)?|Crawl(?:s|er|ing)?|Transcod(?:e|es|er|ing)";

/// Whole-word matches only: a word starts the name, follows `_`, or begins a
/// camel-case hump, and ends at the name end, `_`, a digit or the next hump.
/// `AsyncNotify` and `Upstream` therefore do not match.
pub fn default_long_running_patterns() -> Vec<String> {
    let word_end = "(?:$|[A-Z0-9_])";
    vec![
        format!("(?:^|_)(?i:{LONG_RUNNING_WORDS}){word_end}"),
        format!("[a-z0-9](?:{LONG_RUNNING_WORDS}){word_end}"),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EnhancementConfig {
    /// Ask the external service to confirm each issue and drop confident false positives.
    pub verify: bool,
    /// Ask the external service for a context-aware suggestion and fix.
    pub enhance: bool,
    pub confidence_threshold: f64,
    /// Lines of source shown on each side of the flagged line.
    pub context_lines: usize,
    pub model: Option<String>,
}

impl Default for EnhancementConfig {
    fn default() -> Self {
        Self {
            verify: false,
            enhance: false,
            confidence_threshold: 0.8,
            context_lines: 5,
            model: None,
        }
    }
}

impl EnhancementConfig {
    pub fn is_requested(&self) -> bool {
        self.verify || self.enhance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds() {
        let thresholds = ThresholdsConfig::default();
        assert_eq!(thresholds.max_fan_out, 15);
        assert_eq!(thresholds.max_call_depth, 10);
        assert_eq!(thresholds.versioning_complexity, 5);
    }

    #[test]
    fn test_default_long_running_patterns_compile() {
        for pattern in default_long_running_patterns() {
            assert!(regex::Regex::new(&pattern).is_ok());
        }
    }

    #[test]
    fn test_long_running_patterns_match_whole_words() {
        let patterns: Vec<regex::Regex> = default_long_running_patterns()
            .iter()
            .map(|p| regex::Regex::new(p).unwrap())
            .collect();
        let matches = |name: &str| patterns.iter().any(|re| re.is_match(name));

        for name in [
            "BulkImportActivity",
            "ProcessBatchActivity",
            "SyncInventoryActivity",
            "NightlyBackupActivity",
            "VideoTranscodingActivity",
            "data_migration_activity",
            "Export2Activity",
        ] {
            assert!(matches(name), "{name} should be long-running");
        }
        for name in [
            "AsyncNotifyActivity",
            "ReportErrorActivity",
            "UpstreamActivity",
            "ImportantNoticeActivity",
            "resyncCacheActivity",
            "SendEmailActivity",
        ] {
            assert!(!matches(name), "{name} should not be long-running");
        }
    }

    #[test]
    fn test_enhancement_requested() {
        let mut config = EnhancementConfig::default();
        assert!(!config.is_requested());
        config.enhance = true;
        assert!(config.is_requested());
    }
}
