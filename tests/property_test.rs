use proptest::prelude::*;
use std::path::PathBuf;
use tempograph::config::LintConfig;
use tempograph::rules::engine::sort_issues;
use tempograph::rules::{Category, Issue};
use tempograph::{
    CancellationToken, GraphBuilder, LintEngine, NodeKind, Severity, TemporalGraph, TemporalNode,
};

fn severity() -> impl Strategy<Value = Severity> {
    prop_oneof![
        Just(Severity::Info),
        Just(Severity::Warning),
        Just(Severity::Error)
    ]
}

fn issue() -> impl Strategy<Value = Issue> {
    (severity(), 0usize..4, 1usize..200).prop_map(|(severity, file, line)| Issue {
        rule_id: "TA000".into(),
        rule_name: "generated".into(),
        severity,
        category: Category::Maintenance,
        message: String::new(),
        rationale: String::new(),
        suggestion: String::new(),
        fix: None,
        node_name: "Node".into(),
        node_kind: NodeKind::Workflow,
        file: PathBuf::from(format!("pkg/file{file}.go")),
        line,
    })
}

fn bare_activities(count: usize) -> TemporalGraph {
    let mut builder = GraphBuilder::new();
    for i in 0..count {
        builder.add_node(TemporalNode::new(
            format!("Step{i:03}Activity"),
            NodeKind::Activity,
            PathBuf::from(format!("steps/step{}.go", i % 3)),
            i + 1,
        ));
    }
    builder.build(&CancellationToken::new()).0
}

proptest! {
    #[test]
    fn sorted_issues_are_ordered(mut issues in prop::collection::vec(issue(), 0..40)) {
        sort_issues(&mut issues);
        for pair in issues.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            prop_assert!(a.severity >= b.severity);
            if a.severity == b.severity {
                prop_assert!(a.file <= b.file);
                if a.file == b.file {
                    prop_assert!(a.line <= b.line);
                }
            }
        }
    }

    #[test]
    fn capped_counts_match_issues(count in 0usize..25, cap in 0usize..30) {
        let config = LintConfig {
            max_issues: cap,
            ..LintConfig::default()
        };
        let result = LintEngine::new(config)
            .unwrap()
            .run(&bare_activities(count), &CancellationToken::new());

        let uncapped = count * 2;
        let expected = if cap == 0 { uncapped } else { uncapped.min(cap) };
        prop_assert_eq!(result.issues.len(), expected);
        prop_assert_eq!(
            result.error_count + result.warn_count + result.info_count,
            result.issues.len()
        );
    }
}
