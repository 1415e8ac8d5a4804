//! Planning: candidate tasks from a collaborator, validated into a [`Plan`].

pub mod builder;
pub mod mock;
pub mod planner;
pub mod task;

pub use builder::{parse_planner_output, PlanBuilder};
pub use planner::{plan_from_spec, request_plan, PlannerKind};
pub use task::{Plan, Task};
