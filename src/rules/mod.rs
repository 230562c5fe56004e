//! The closed rule catalog and the engine that runs it.
//!
//! Every rule is a stateless predicate over a frozen [`TemporalGraph`]. The
//! catalog is a fixed enum so each variant must supply an ID, a category, a
//! default severity and a check.

pub mod engine;
pub mod enhance;
pub mod issue;
mod maintenance;
mod performance;
mod reliability;
mod structural;
mod type_safety;

pub use engine::{LintEngine, LintResult};
pub use enhance::{EnhancedFix, IssueEnhancer, SourceContext, Verification};
pub use issue::{Category, CodeFix, Issue, Severity, TextReplacement};

use crate::config::ThresholdsConfig;
use crate::core::{CancellationToken, TemporalGraph};
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuleKind {
    ActivityMissingRetryPolicy,
    ActivityMissingTimeout,
    ActivityMissingHeartbeat,
    CircularDependency,
    OrphanNode,
    HighFanOut,
    DeepCallChain,
    MissingVersioning,
    SignalWithoutHandler,
    QueryWithoutTypedReturn,
    ContinueAsNewReview,
    ArgumentMismatch,
}

/// Inputs shared by every rule invocation in one run.
pub struct RuleContext<'a> {
    pub thresholds: ThresholdsConfig,
    pub long_running: &'a [Regex],
    pub cancel: &'a CancellationToken,
}

impl RuleKind {
    pub const ALL: [RuleKind; 12] = [
        RuleKind::ActivityMissingRetryPolicy,
        RuleKind::ActivityMissingTimeout,
        RuleKind::ActivityMissingHeartbeat,
        RuleKind::CircularDependency,
        RuleKind::OrphanNode,
        RuleKind::HighFanOut,
        RuleKind::DeepCallChain,
        RuleKind::MissingVersioning,
        RuleKind::SignalWithoutHandler,
        RuleKind::QueryWithoutTypedReturn,
        RuleKind::ContinueAsNewReview,
        RuleKind::ArgumentMismatch,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            RuleKind::ActivityMissingRetryPolicy => "TA001",
            RuleKind::ActivityMissingTimeout => "TA002",
            RuleKind::ActivityMissingHeartbeat => "TA003",
            RuleKind::CircularDependency => "TA010",
            RuleKind::OrphanNode => "TA011",
            RuleKind::HighFanOut => "TA020",
            RuleKind::DeepCallChain => "TA021",
            RuleKind::MissingVersioning => "TA030",
            RuleKind::SignalWithoutHandler => "TA031",
            RuleKind::QueryWithoutTypedReturn => "TA032",
            RuleKind::ContinueAsNewReview => "TA033",
            RuleKind::ArgumentMismatch => "TA040",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RuleKind::ActivityMissingRetryPolicy => "activity-missing-retry-policy",
            RuleKind::ActivityMissingTimeout => "activity-missing-timeout",
            RuleKind::ActivityMissingHeartbeat => "activity-missing-heartbeat",
            RuleKind::CircularDependency => "circular-dependency",
            RuleKind::OrphanNode => "orphan-node",
            RuleKind::HighFanOut => "high-fan-out",
            RuleKind::DeepCallChain => "deep-call-chain",
            RuleKind::MissingVersioning => "missing-versioning",
            RuleKind::SignalWithoutHandler => "signal-without-handler",
            RuleKind::QueryWithoutTypedReturn => "query-without-typed-return",
            RuleKind::ContinueAsNewReview => "continue-as-new-review",
            RuleKind::ArgumentMismatch => "argument-mismatch",
        }
    }

    pub fn category(&self) -> Category {
        match self {
            RuleKind::ActivityMissingRetryPolicy
            | RuleKind::ActivityMissingTimeout
            | RuleKind::ActivityMissingHeartbeat => Category::Reliability,
            RuleKind::CircularDependency | RuleKind::OrphanNode => Category::Structural,
            RuleKind::HighFanOut | RuleKind::DeepCallChain => Category::Performance,
            RuleKind::MissingVersioning
            | RuleKind::SignalWithoutHandler
            | RuleKind::QueryWithoutTypedReturn
            | RuleKind::ContinueAsNewReview => Category::Maintenance,
            RuleKind::ArgumentMismatch => Category::TypeSafety,
        }
    }

    pub fn default_severity(&self) -> Severity {
        match self {
            RuleKind::ActivityMissingTimeout
            | RuleKind::CircularDependency
            | RuleKind::ArgumentMismatch => Severity::Error,
            RuleKind::ActivityMissingRetryPolicy
            | RuleKind::ActivityMissingHeartbeat
            | RuleKind::HighFanOut
            | RuleKind::DeepCallChain
            | RuleKind::SignalWithoutHandler => Severity::Warning,
            RuleKind::OrphanNode
            | RuleKind::MissingVersioning
            | RuleKind::QueryWithoutTypedReturn
            | RuleKind::ContinueAsNewReview => Severity::Info,
        }
    }

    pub fn rationale(&self) -> &'static str {
        match self {
            RuleKind::ActivityMissingRetryPolicy => {
                "Without an explicit retry policy an activity relies on server defaults, which retry forever with unbounded backoff and can hide persistent failures."
            }
            RuleKind::ActivityMissingTimeout => {
                "Activity options without a StartToClose or ScheduleToClose timeout are rejected at schedule time or let a stuck worker hold the task indefinitely."
            }
            RuleKind::ActivityMissingHeartbeat => {
                "Long-running activities that never heartbeat are only detected as dead when their full timeout elapses, delaying retries on worker loss."
            }
            RuleKind::CircularDependency => {
                "Workflows that start each other in a cycle can recurse without bound and make replay histories impossible to reason about."
            }
            RuleKind::OrphanNode => {
                "An exported activity or workflow that nothing in the scanned code calls may be dead code or registered only from outside the corpus."
            }
            RuleKind::HighFanOut => {
                "A workflow dispatching many distinct calls grows large histories and concentrates too much orchestration logic in one function."
            }
            RuleKind::DeepCallChain => {
                "Deep chains of child workflows multiply latency and failure surface, and make cancellation and retries hard to follow."
            }
            RuleKind::MissingVersioning => {
                "Complex workflows change over time; without GetVersion markers a deployment can break replay of executions already in flight."
            }
            RuleKind::SignalWithoutHandler => {
                "Signals delivered to a channel that is never received are buffered silently and their payloads are lost when the workflow completes."
            }
            RuleKind::QueryWithoutTypedReturn => {
                "Query handlers returning interface{} or nothing give callers no contract to decode against."
            }
            RuleKind::ContinueAsNewReview => {
                "ContinueAsNew restarts the run with fresh history; the triggering condition and the carried-over arguments deserve review."
            }
            RuleKind::ArgumentMismatch => {
                "Temporal serializes arguments at runtime, so a call whose arguments or result binding disagree with the target signature only fails in production."
            }
        }
    }

    pub fn suggestion(&self) -> &'static str {
        match self {
            RuleKind::ActivityMissingRetryPolicy => {
                "Set RetryPolicy in the ActivityOptions with MaximumAttempts and a BackoffCoefficient."
            }
            RuleKind::ActivityMissingTimeout => {
                "Set StartToCloseTimeout (or ScheduleToCloseTimeout) in the ActivityOptions."
            }
            RuleKind::ActivityMissingHeartbeat => {
                "Set HeartbeatTimeout and call activity.RecordHeartbeat periodically from the activity."
            }
            RuleKind::CircularDependency => {
                "Break the cycle, for example with ContinueAsNew or by moving shared work into an activity."
            }
            RuleKind::OrphanNode => {
                "Remove the declaration or confirm it is registered and invoked from elsewhere."
            }
            RuleKind::HighFanOut => {
                "Group related calls into child workflows or fewer, coarser activities."
            }
            RuleKind::DeepCallChain => "Flatten the chain of child workflows.",
            RuleKind::MissingVersioning => {
                "Guard behavior changes with workflow.GetVersion so running executions replay correctly."
            }
            RuleKind::SignalWithoutHandler => {
                "Receive from the signal channel, or add it to a workflow.Selector with AddReceive."
            }
            RuleKind::QueryWithoutTypedReturn => {
                "Return a concrete type from the query handler, e.g. (Status, error)."
            }
            RuleKind::ContinueAsNewReview => {
                "Make sure ContinueAsNew is guarded by a history-size or iteration condition and carries all required state."
            }
            RuleKind::ArgumentMismatch => {
                "Match the call's arguments and result binding to the target's declared signature."
            }
        }
    }

    /// Looks a rule up by ID (`TA001`) or name (`activity-missing-retry-policy`).
    pub fn from_reference(reference: &str) -> Option<RuleKind> {
        let reference = reference.trim();
        RuleKind::ALL.into_iter().find(|rule| {
            rule.id().eq_ignore_ascii_case(reference) || rule.name().eq_ignore_ascii_case(reference)
        })
    }

    pub fn check(&self, graph: &TemporalGraph, ctx: &RuleContext) -> Vec<Issue> {
        match self {
            RuleKind::ActivityMissingRetryPolicy => reliability::missing_retry_policy(graph),
            RuleKind::ActivityMissingTimeout => reliability::missing_timeout(graph),
            RuleKind::ActivityMissingHeartbeat => {
                reliability::missing_heartbeat(graph, ctx.long_running)
            }
            RuleKind::CircularDependency => structural::circular_dependency(graph, ctx.cancel),
            RuleKind::OrphanNode => structural::orphan_nodes(graph),
            RuleKind::HighFanOut => performance::high_fan_out(graph, ctx.thresholds.max_fan_out),
            RuleKind::DeepCallChain => {
                performance::deep_call_chain(graph, ctx.thresholds.max_call_depth, ctx.cancel)
            }
            RuleKind::MissingVersioning => {
                maintenance::missing_versioning(graph, ctx.thresholds.versioning_complexity)
            }
            RuleKind::SignalWithoutHandler => maintenance::signal_without_handler(graph),
            RuleKind::QueryWithoutTypedReturn => maintenance::query_without_typed_return(graph),
            RuleKind::ContinueAsNewReview => maintenance::continue_as_new_review(graph),
            RuleKind::ArgumentMismatch => type_safety::argument_mismatch(graph),
        }
    }
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.id(), self.name())
    }
}
