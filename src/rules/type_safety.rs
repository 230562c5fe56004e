use super::{Issue, RuleKind};
use crate::core::{CallSite, Parameter, TemporalGraph, TemporalNode, UNKNOWN_TYPE};

fn payload_parameters(target: &TemporalNode) -> (usize, bool) {
    let payload: Vec<&Parameter> = target
        .parameters
        .iter()
        // Framework-supplied contexts are not part of the payload.
        .filter(|p| !p.is_context)
        .collect();
    let variadic = payload.iter().any(|p| p.type_text.starts_with("..."));
    (payload.len(), variadic)
}

fn arity_mismatch(call: &CallSite, target: &TemporalNode) -> Option<String> {
    // Zero means the argument list was not captured.
    if call.arg_count == 0 {
        return None;
    }
    let (expected, variadic) = payload_parameters(target);
    let matches = if variadic {
        call.arg_count + 1 >= expected
    } else {
        call.arg_count == expected
    };
    (!matches).then(|| {
        format!(
            "Call to '{}' passes {} argument(s) but it declares {}",
            target.name, call.arg_count, expected
        )
    })
}

fn result_mismatch(call: &CallSite, target: &TemporalNode) -> Option<String> {
    let bound = call.result_type.as_deref().filter(|t| *t != UNKNOWN_TYPE)?;
    let declared = target.value_return_type()?;
    (bound != declared).then(|| {
        format!(
            "Result of '{}' is bound to {} but it returns {}",
            target.name, bound, declared
        )
    })
}

pub(super) fn argument_mismatch(graph: &TemporalGraph) -> Vec<Issue> {
    let mut issues = Vec::new();
    for node in graph.nodes() {
        for call in node.calls.iter().filter(|c| c.kind.is_execution()) {
            let Some(target) = graph.get(&call.target) else {
                continue;
            };
            for message in [arity_mismatch(call, target), result_mismatch(call, target)]
                .into_iter()
                .flatten()
            {
                issues.push(
                    Issue::anchored(RuleKind::ArgumentMismatch, node, message).at_line(call.line),
                );
            }
        }
    }
    issues
}
