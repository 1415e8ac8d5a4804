//! Dependency sequencing over a [`Plan`].
//!
//! Both functions are pure. A plan read back from an artifact may have been
//! edited by hand, so [`topological_order`] re-checks every reference and
//! reports cycles instead of assuming the builder's guarantees.

use std::collections::BTreeSet;

use crate::error::PlanError;
use crate::plan::Plan;

/// Steps not yet completed whose dependencies are all completed, ascending.
#[must_use]
pub fn unblocked(plan: &Plan, completed: &BTreeSet<usize>) -> BTreeSet<usize> {
    plan.steps()
        .filter(|(step, task)| {
            !completed.contains(step) && task.dependencies.is_subset(completed)
        })
        .map(|(step, _)| step)
        .collect()
}

/// Orders every step so that each comes after all of its dependencies.
///
/// Kahn's algorithm in rounds: each round appends the whole unblocked set in
/// ascending order and marks it completed. The result is total or an error,
/// never a partial order.
///
/// # Errors
///
/// - [`PlanError::UnsatisfiableDependency`] when a task names a step outside
///   the plan.
/// - [`PlanError::CyclicDependency`] when no step can make progress; `cycle`
///   lists the stuck steps in ascending order.
pub fn topological_order(plan: &Plan) -> Result<Vec<usize>, PlanError> {
    for (step, task) in plan.steps() {
        if let Some(&dependency) =
            task.dependencies.iter().find(|&&d| d == 0 || d > plan.len())
        {
            return Err(PlanError::UnsatisfiableDependency { step, dependency });
        }
    }

    let mut order = Vec::with_capacity(plan.len());
    let mut done = BTreeSet::new();
    while order.len() < plan.len() {
        let ready = unblocked(plan, &done);
        if ready.is_empty() {
            let cycle = plan.steps().map(|(s, _)| s).filter(|s| !done.contains(s)).collect();
            return Err(PlanError::CyclicDependency { cycle });
        }
        order.extend(ready.iter().copied());
        done.extend(ready);
    }
    Ok(order)
}
