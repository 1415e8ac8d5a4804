//! Planner collaborator: asks the model to decompose a specification.

use serde_json::Value;

use super::builder::{parse_planner_output, PlanBuilder};
use super::mock::mock_plan;
use super::task::Plan;
use crate::config::Config;
use crate::context::ServiceContext;
use crate::error::{LlmError, PlanningError};
use crate::ports::llm::CompletionRequest;

/// Where candidate tasks come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerKind {
    /// The configured planner model.
    Model,
    /// The offline template in [`mock`](super::mock).
    Mock,
}

/// Sends the planner instruction and `spec` to the model and extracts the
/// candidate task array from its answer.
///
/// # Errors
///
/// Returns [`PlanningError::Llm`] if the call fails and
/// [`PlanningError::Plan`] if no task array can be recovered.
pub async fn request_plan(
    ctx: &ServiceContext,
    config: &Config,
    spec: &str,
) -> Result<Vec<Value>, PlanningError> {
    let request = CompletionRequest {
        model: config.planner.model.clone(),
        system: Some(config.planner_instruction()),
        prompt: spec.to_string(),
        max_tokens: config.planner.max_tokens,
        temperature: 0.0,
    };
    tracing::info!(model = %request.model, "requesting plan");
    let response =
        ctx.llm.complete(&request).await.map_err(|e| LlmError(e.to_string()))?;
    tracing::debug!(
        prompt_tokens = response.prompt_tokens,
        completion_tokens = response.completion_tokens,
        "planner responded"
    );
    Ok(parse_planner_output(&response.text)?)
}

/// Produces a validated plan for `spec`.
///
/// # Errors
///
/// Propagates model failures and every [`PlanError`](crate::error::PlanError)
/// the builder raises.
pub async fn plan_from_spec(
    ctx: &ServiceContext,
    config: &Config,
    spec: &str,
    kind: PlannerKind,
) -> Result<Plan, PlanningError> {
    let raw = match kind {
        PlannerKind::Model => request_plan(ctx, config, spec).await?,
        PlannerKind::Mock => mock_plan(spec),
    };
    let plan = PlanBuilder::new(config.labels.iter().cloned()).build(&raw)?;
    tracing::info!(steps = plan.len(), "plan built");
    Ok(plan)
}
