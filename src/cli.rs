//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI parser for `stagger`.
#[derive(Debug, Parser)]
#[command(
    name = "stagger",
    version,
    about = "Plan feature work into dependency-ordered issues and release them to an agent one at a time"
)]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Plan a specification and create its issues in dependency order.
    Plan(PlanArgs),
    /// Mark closed issues completed and trigger the next eligible task.
    Advance,
    /// Show the rollout state of every planned step.
    Status,
    /// Validate the work that closed an issue and comment the verdict.
    Validate {
        /// Issue number to validate.
        issue: u64,
    },
}

/// Arguments for `stagger plan`.
#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Markdown specification to plan. Not needed with `--resume`.
    #[arg(required_unless_present = "resume")]
    pub spec_path: Option<PathBuf>,
    /// Use the offline template planner instead of the model.
    #[arg(long)]
    pub mock: bool,
    /// Print and save the plan without touching the tracker.
    #[arg(long)]
    pub dry_run: bool,
    /// Continue the saved rollout, creating only the missing issues.
    #[arg(long, conflicts_with_all = ["mock", "dry_run"])]
    pub resume: bool,
    /// Do not ask for confirmation.
    #[arg(long, short = 'y')]
    pub yes: bool,
}
