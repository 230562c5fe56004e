mod common;

use common::{analyze, clean_corpus, faulty_corpus, write};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use tempfile::TempDir;
use tempograph::config::LintConfig;
use tempograph::errors::{EXIT_FINDINGS, EXIT_OK};
use tempograph::{CancellationToken, LintEngine, LintResult, Severity, TemporalGraph};

fn lint(graph: &TemporalGraph, config: LintConfig) -> LintResult {
    LintEngine::new(config)
        .unwrap()
        .run(graph, &CancellationToken::new())
}

fn ids(result: &LintResult) -> Vec<&str> {
    result.issues.iter().map(|i| i.rule_id.as_str()).collect()
}

#[test]
fn test_clean_corpus_only_warns() {
    let dir = clean_corpus();
    let result = lint(&analyze(dir.path()).graph, LintConfig::default());

    assert_eq!(ids(&result), vec!["TA031"]);
    assert_eq!(result.issues[0].node_name, "OrderWorkflow");
    assert_eq!(result.warn_count, 1);
    assert_eq!(result.exit_code, EXIT_OK);
}

#[test]
fn test_strict_mode_fails_on_warning() {
    let dir = clean_corpus();
    let config = LintConfig {
        fail_on_warning: true,
        ..LintConfig::default()
    };
    let result = lint(&analyze(dir.path()).graph, config);
    assert_eq!(result.exit_code, EXIT_FINDINGS);
}

#[test]
fn test_faulty_corpus_reports_errors_first() {
    let dir = faulty_corpus();
    let result = lint(&analyze(dir.path()).graph, LintConfig::default());

    assert_eq!(ids(&result), vec!["TA002", "TA040", "TA031"]);
    assert_eq!(result.error_count, 2);
    assert_eq!(result.warn_count, 1);
    assert_eq!(result.exit_code, EXIT_FINDINGS);

    let mismatch = &result.issues[1];
    assert_eq!(mismatch.node_name, "RefundWorkflow");
    assert!(mismatch.message.contains("passes 2 argument(s) but it declares 1"));
    assert!(mismatch.file.ends_with("refund.go"));
}

#[test]
fn test_error_fix_carries_snippet() {
    let dir = faulty_corpus();
    let result = lint(&analyze(dir.path()).graph, LintConfig::default());
    let timeout = result.issues.iter().find(|i| i.rule_id == "TA002").unwrap();
    let fix = timeout.fix.as_ref().expect("timeout fix");
    assert!(fix.replacements[0].new_text.contains("StartToCloseTimeout"));
}

#[test]
fn test_min_severity_error_hides_warnings() {
    let dir = faulty_corpus();
    let config = LintConfig {
        min_severity: Severity::Error,
        ..LintConfig::default()
    };
    let result = lint(&analyze(dir.path()).graph, config);
    assert_eq!(ids(&result), vec!["TA002", "TA040"]);
    assert_eq!(result.warn_count, 0);
}

#[test]
fn test_severity_override_changes_verdict() {
    let dir = faulty_corpus();
    let mut overrides = BTreeMap::new();
    overrides.insert("TA002".to_string(), Severity::Info);
    overrides.insert("argument-mismatch".to_string(), Severity::Warning);
    let config = LintConfig {
        severity_overrides: overrides,
        ..LintConfig::default()
    };
    let result = lint(&analyze(dir.path()).graph, config);
    assert_eq!(result.error_count, 0);
    assert_eq!(result.exit_code, EXIT_OK);
    assert_eq!(result.issues.last().unwrap().rule_id, "TA002");
}

#[test]
fn test_heartbeat_and_versioning_thresholds() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "import.go",
        indoc::indoc! {r#"
            package imports

            import (
                "context"
                "time"

                "go.temporal.io/sdk/temporal"
                "go.temporal.io/sdk/workflow"
            )

            func BulkImportActivity(ctx context.Context, batch string) error {
                return nil
            }

            func ImportWorkflow(ctx workflow.Context, batches []string) error {
                ctx = workflow.WithActivityOptions(ctx, workflow.ActivityOptions{
                    StartToCloseTimeout: time.Hour,
                    RetryPolicy:         &temporal.RetryPolicy{MaximumAttempts: 5},
                })
                _ = workflow.ExecuteActivity(ctx, BulkImportActivity, "a").Get(ctx, nil)
                _ = workflow.ExecuteActivity(ctx, BulkImportActivity, "b").Get(ctx, nil)
                _ = workflow.ExecuteActivity(ctx, BulkImportActivity, "c").Get(ctx, nil)
                return nil
            }
        "#},
    );
    let graph = analyze(dir.path()).graph;

    let result = lint(&graph, LintConfig::default());
    assert_eq!(ids(&result), vec!["TA003"]);

    let mut config = LintConfig::default();
    config.thresholds.versioning_complexity = 3;
    let result = lint(&graph, config);
    assert_eq!(ids(&result), vec!["TA003", "TA030"]);
}

#[test]
fn test_cap_keeps_counts_consistent() {
    let dir = faulty_corpus();
    let config = LintConfig {
        max_issues: 1,
        ..LintConfig::default()
    };
    let result = lint(&analyze(dir.path()).graph, config);
    assert_eq!(result.issues.len(), 1);
    assert_eq!(
        result.error_count + result.warn_count + result.info_count,
        result.issues.len()
    );
}

#[test]
fn test_enable_restricts_catalog() {
    let dir = faulty_corpus();
    let config = LintConfig {
        enable: vec!["TA031".to_string()],
        ..LintConfig::default()
    };
    let result = lint(&analyze(dir.path()).graph, config);
    assert_eq!(ids(&result), vec!["TA031"]);
    assert_eq!(result.exit_code, EXIT_OK);
}
