//! Plan builder: structural validation of planner output.
//!
//! The builder never reorders. Step indices are exactly `1..=n` in the order
//! the planner emitted them; ordering for rollout is the sequencer's job.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use super::task::{Plan, Task};
use crate::error::PlanError;

/// Extracts the candidate task array from raw planner output.
///
/// Models often wrap the array in prose or a code fence. When the whole text
/// is not a JSON array, the span from the first `[` to the last `]` is tried.
///
/// # Errors
///
/// Returns [`PlanError::MalformedPlan`] when no JSON array can be recovered.
pub fn parse_planner_output(text: &str) -> Result<Vec<Value>, PlanError> {
    if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(text.trim()) {
        return Ok(items);
    }

    let (Some(start), Some(end)) = (text.find('['), text.rfind(']')) else {
        return Err(PlanError::MalformedPlan("no bracketed JSON array found".into()));
    };
    if end < start {
        return Err(PlanError::MalformedPlan("no bracketed JSON array found".into()));
    }

    match serde_json::from_str::<Value>(&text[start..=end]) {
        Ok(Value::Array(items)) => Ok(items),
        Ok(other) => Err(PlanError::MalformedPlan(format!("expected an array, found {other}"))),
        Err(e) => Err(PlanError::MalformedPlan(e.to_string())),
    }
}

/// Validates candidate task objects against a label vocabulary.
#[derive(Debug, Clone)]
pub struct PlanBuilder {
    vocabulary: BTreeSet<String>,
}

impl PlanBuilder {
    /// Creates a builder that accepts only the given labels.
    pub fn new<I, S>(vocabulary: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { vocabulary: vocabulary.into_iter().map(Into::into).collect() }
    }

    /// Builds a plan from raw candidate task objects.
    ///
    /// # Errors
    ///
    /// - [`PlanError::InvalidTask`] for a missing or mis-shaped field, or a self-dependency.
    /// - [`PlanError::UnknownLabel`] for a label outside the vocabulary.
    /// - [`PlanError::UnsatisfiableDependency`] for a dependency outside `1..=n`.
    /// - [`PlanError::CyclicDependency`] when the dependency graph has a cycle.
    pub fn build(&self, raw: &[Value]) -> Result<Plan, PlanError> {
        let len = raw.len();
        let tasks = raw
            .iter()
            .enumerate()
            .map(|(i, candidate)| self.build_task(i + 1, len, candidate))
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(cycle) = find_cycle(&tasks) {
            return Err(PlanError::CyclicDependency { cycle });
        }
        Ok(Plan::new(tasks))
    }

    fn build_task(&self, step: usize, len: usize, candidate: &Value) -> Result<Task, PlanError> {
        let obj = candidate.as_object().ok_or_else(|| invalid(step, "expected a JSON object"))?;

        let title = match obj.get("title") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            Some(Value::String(_)) => return Err(invalid(step, "title is empty")),
            Some(_) => return Err(invalid(step, "title must be a string")),
            None => return Err(invalid(step, "missing field 'title'")),
        };
        let body = match obj.get("body") {
            Some(Value::String(s)) => s.clone(),
            Some(_) => return Err(invalid(step, "body must be a string")),
            None => return Err(invalid(step, "missing field 'body'")),
        };

        let labels = string_set(obj, "labels", step)?;
        if let Some(label) = labels.iter().find(|l| !self.vocabulary.contains(*l)) {
            return Err(PlanError::UnknownLabel { step, label: label.clone() });
        }
        let assignees = string_set(obj, "assignees", step)?;

        let ai_ready = match obj.get("ai_ready") {
            None => true,
            Some(Value::Bool(b)) => *b,
            Some(_) => return Err(invalid(step, "ai_ready must be a boolean")),
        };

        let dependencies = dependency_set(obj, step, len)?;

        Ok(Task { title, body, labels, assignees, ai_ready, dependencies })
    }
}

fn invalid(step: usize, reason: impl Into<String>) -> PlanError {
    PlanError::InvalidTask { step, reason: reason.into() }
}

fn string_set(
    obj: &Map<String, Value>,
    field: &str,
    step: usize,
) -> Result<BTreeSet<String>, PlanError> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(BTreeSet::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(String::from)
                    .ok_or_else(|| invalid(step, format!("{field} must contain only strings")))
            })
            .collect(),
        Some(_) => Err(invalid(step, format!("{field} must be an array of strings"))),
    }
}

fn dependency_set(
    obj: &Map<String, Value>,
    step: usize,
    len: usize,
) -> Result<BTreeSet<usize>, PlanError> {
    let items = match obj.get("dependencies") {
        None | Some(Value::Null) => return Ok(BTreeSet::new()),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(invalid(step, "dependencies must be an array of integers")),
    };

    let mut deps = BTreeSet::new();
    for item in items {
        let dependency = match item.as_u64() {
            Some(n) => usize::try_from(n).unwrap_or(usize::MAX),
            None if item.is_i64() => {
                return Err(invalid(step, format!("dependency {item} is not a step index")));
            }
            None => return Err(invalid(step, "dependencies must be an array of integers")),
        };
        if dependency == step {
            return Err(invalid(step, "task depends on itself"));
        }
        if dependency == 0 || dependency > len {
            return Err(PlanError::UnsatisfiableDependency { step, dependency });
        }
        deps.insert(dependency);
    }
    Ok(deps)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Three-colour DFS over `step -> dependency` edges.
///
/// Dependencies must already be range-checked. Returns the first cycle found
/// as a closed walk, e.g. `[2, 3, 2]`.
fn find_cycle(tasks: &[Task]) -> Option<Vec<usize>> {
    let mut colors = vec![Color::White; tasks.len()];
    let mut path = Vec::new();
    (1..=tasks.len()).find_map(|step| {
        if colors[step - 1] == Color::White {
            visit(step, tasks, &mut colors, &mut path)
        } else {
            None
        }
    })
}

fn visit(
    step: usize,
    tasks: &[Task],
    colors: &mut [Color],
    path: &mut Vec<usize>,
) -> Option<Vec<usize>> {
    colors[step - 1] = Color::Gray;
    path.push(step);

    for &dep in &tasks[step - 1].dependencies {
        match colors[dep - 1] {
            Color::Gray => {
                let start = path.iter().position(|&s| s == dep).unwrap_or(0);
                let mut cycle = path[start..].to_vec();
                cycle.push(dep);
                return Some(cycle);
            }
            Color::White => {
                if let Some(cycle) = visit(dep, tasks, colors, path) {
                    return Some(cycle);
                }
            }
            Color::Black => {}
        }
    }

    path.pop();
    colors[step - 1] = Color::Black;
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn builder() -> PlanBuilder {
        PlanBuilder::new(["api", "ui", "infra", "docs", "test", "p1", "p2", "p3"])
    }

    fn candidate(title: &str, deps: &[usize]) -> Value {
        json!({
            "title": title,
            "body": "do it",
            "labels": ["api"],
            "assignees": [],
            "ai_ready": true,
            "dependencies": deps,
        })
    }

    #[test]
    fn extracts_array_wrapped_in_prose() {
        let text = "Here is the plan:\n[{\"title\": \"Write tests\", \"body\": \"\"}]\nEnjoy!";
        let raw = parse_planner_output(text).unwrap();
        assert_eq!(raw.len(), 1);
        let plan = builder().build(&raw).unwrap();
        assert_eq!(plan.task(1).unwrap().title, "Write tests");
    }

    #[test]
    fn extracts_array_from_code_fence() {
        let text = "```json\n[{\"title\": \"a\", \"body\": \"b\"}]\n```";
        assert_eq!(parse_planner_output(text).unwrap().len(), 1);
    }

    #[test]
    fn rejects_output_without_array() {
        let err = parse_planner_output("I could not produce a plan.").unwrap_err();
        assert!(matches!(err, PlanError::MalformedPlan(_)));
    }

    #[test]
    fn rejects_broken_json_between_brackets() {
        let err = parse_planner_output("plan: [{\"title\": ]").unwrap_err();
        assert!(matches!(err, PlanError::MalformedPlan(_)));
    }

    #[test]
    fn rejects_top_level_object() {
        let err = parse_planner_output(r#"{"tasks": 1}"#).unwrap_err();
        assert!(matches!(err, PlanError::MalformedPlan(_)));
    }

    #[test]
    fn preserves_received_order() {
        let raw = vec![candidate("second", &[2]), candidate("first", &[])];
        let plan = builder().build(&raw).unwrap();
        assert_eq!(plan.task(1).unwrap().title, "second");
        assert_eq!(plan.task(2).unwrap().title, "first");
    }

    #[test]
    fn missing_title_is_invalid_task() {
        let raw = vec![json!({"body": "x"})];
        let err = builder().build(&raw).unwrap_err();
        assert_eq!(
            err,
            PlanError::InvalidTask { step: 1, reason: "missing field 'title'".into() }
        );
    }

    #[test]
    fn blank_title_is_invalid_task() {
        let raw = vec![json!({"title": "   ", "body": "x"})];
        assert!(matches!(builder().build(&raw), Err(PlanError::InvalidTask { step: 1, .. })));
    }

    #[test]
    fn wrong_shape_ai_ready_is_invalid_task() {
        let raw = vec![json!({"title": "a", "body": "b", "ai_ready": "yes"})];
        assert!(matches!(builder().build(&raw), Err(PlanError::InvalidTask { .. })));
    }

    #[test]
    fn non_object_candidate_is_invalid_task() {
        let raw = vec![candidate("ok", &[]), json!("just a string")];
        assert!(matches!(builder().build(&raw), Err(PlanError::InvalidTask { step: 2, .. })));
    }

    #[test]
    fn ai_ready_defaults_to_true() {
        let raw = vec![json!({"title": "a", "body": "b"})];
        assert!(builder().build(&raw).unwrap().task(1).unwrap().ai_ready);
    }

    #[test]
    fn unknown_label_is_rejected_not_dropped() {
        let raw = vec![json!({"title": "a", "body": "b", "labels": ["api", "backend"]})];
        assert_eq!(
            builder().build(&raw).unwrap_err(),
            PlanError::UnknownLabel { step: 1, label: "backend".into() }
        );
    }

    #[test]
    fn self_dependency_is_invalid_task() {
        let raw = vec![candidate("a", &[]), candidate("b", &[2])];
        assert!(matches!(builder().build(&raw), Err(PlanError::InvalidTask { step: 2, .. })));
    }

    #[test]
    fn out_of_range_dependency_is_unsatisfiable() {
        let raw = vec![candidate("a", &[3]), candidate("b", &[])];
        assert_eq!(
            builder().build(&raw).unwrap_err(),
            PlanError::UnsatisfiableDependency { step: 1, dependency: 3 }
        );
    }

    #[test]
    fn zero_dependency_is_unsatisfiable() {
        let raw = vec![candidate("a", &[0])];
        assert_eq!(
            builder().build(&raw).unwrap_err(),
            PlanError::UnsatisfiableDependency { step: 1, dependency: 0 }
        );
    }

    #[test]
    fn negative_dependency_is_invalid_task() {
        let raw = vec![json!({"title": "a", "body": "b", "dependencies": [-1]})];
        assert!(matches!(builder().build(&raw), Err(PlanError::InvalidTask { .. })));
    }

    #[test]
    fn detects_two_node_cycle() {
        let raw = vec![candidate("a", &[2]), candidate("b", &[1])];
        assert_eq!(
            builder().build(&raw).unwrap_err(),
            PlanError::CyclicDependency { cycle: vec![1, 2, 1] }
        );
    }

    #[test]
    fn detects_cycle_behind_acyclic_prefix() {
        let raw = vec![
            candidate("root", &[]),
            candidate("a", &[1, 4]),
            candidate("b", &[2]),
            candidate("c", &[3]),
        ];
        assert_eq!(
            builder().build(&raw).unwrap_err(),
            PlanError::CyclicDependency { cycle: vec![2, 4, 3, 2] }
        );
    }

    #[test]
    fn diamond_is_not_a_cycle() {
        let raw = vec![
            candidate("a", &[]),
            candidate("b", &[1]),
            candidate("c", &[1]),
            candidate("d", &[2, 3]),
        ];
        assert_eq!(builder().build(&raw).unwrap().len(), 4);
    }

    #[test]
    fn empty_input_builds_empty_plan() {
        assert!(builder().build(&[]).unwrap().is_empty());
    }
}
