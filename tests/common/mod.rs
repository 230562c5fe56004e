//! Shared Go fixtures for the integration tests.
#![allow(dead_code)]

use indoc::indoc;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use tempograph::config::ExtractionConfig;
use tempograph::{analyze_path, Analysis};

pub const ACTIVITIES_GO: &str = indoc! {r#"
    package orders

    import (
        "context"
    )

    // ChargeActivity charges the customer for an order.
    func ChargeActivity(ctx context.Context, orderID string, amount int) (string, error) {
        return "receipt-" + orderID, nil
    }

    func NotifyActivity(ctx context.Context, orderID string) error {
        return nil
    }
"#};

/// A workflow with complete options and one unreceived signal.
pub const ORDER_WORKFLOW_GO: &str = indoc! {r#"
    package orders

    import (
        "time"

        "go.temporal.io/sdk/temporal"
        "go.temporal.io/sdk/workflow"
    )

    func OrderWorkflow(ctx workflow.Context, orderID string) error {
        ao := workflow.ActivityOptions{
            StartToCloseTimeout: time.Minute,
            RetryPolicy: &temporal.RetryPolicy{
                MaximumAttempts: 3,
            },
        }
        ctx = workflow.WithActivityOptions(ctx, ao)

        var receipt string
        if err := workflow.ExecuteActivity(ctx, ChargeActivity, orderID, 100).Get(ctx, &receipt); err != nil {
            return err
        }
        _ = workflow.GetSignalChannel(ctx, "cancel")
        return workflow.ExecuteActivity(ctx, NotifyActivity, orderID).Get(ctx, nil)
    }
"#};

/// Options without a timeout and a call with the wrong number of arguments.
pub const REFUND_WORKFLOW_GO: &str = indoc! {r#"
    package orders

    import (
        "go.temporal.io/sdk/temporal"
        "go.temporal.io/sdk/workflow"
    )

    func RefundActivity(ctx context.Context, orderID string) error {
        return nil
    }

    func RefundWorkflow(ctx workflow.Context, orderID string) error {
        ao := workflow.ActivityOptions{
            RetryPolicy: &temporal.RetryPolicy{MaximumAttempts: 2},
        }
        ctx = workflow.WithActivityOptions(ctx, ao)
        return workflow.ExecuteActivity(ctx, RefundActivity, orderID, "extra").Get(ctx, nil)
    }
"#};

pub const ORDER_WORKFLOW_TEST_GO: &str = indoc! {r#"
    package orders

    import "go.temporal.io/sdk/workflow"

    func FakeWorkflow(ctx workflow.Context) error {
        return nil
    }
"#};

pub fn write(dir: &Path, relative: &str, content: &str) {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// A corpus with warnings but no errors.
pub fn clean_corpus() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "orders/activities.go", ACTIVITIES_GO);
    write(dir.path(), "orders/order_workflow.go", ORDER_WORKFLOW_GO);
    write(dir.path(), "orders/order_workflow_test.go", ORDER_WORKFLOW_TEST_GO);
    dir
}

/// The clean corpus plus a file that triggers error-level findings.
pub fn faulty_corpus() -> TempDir {
    let dir = clean_corpus();
    write(dir.path(), "orders/refund.go", REFUND_WORKFLOW_GO);
    dir
}

pub fn analyze(dir: &Path) -> Analysis {
    analyze_path(dir, &ExtractionConfig::default()).unwrap()
}
