//! Workflows behind the command-line subcommands

pub mod orchestration;

pub use orchestration::{
    execute_release, plan_release, run_build_workflow, run_release_workflow, ReleaseArgs,
    ReleasePlan, WorkflowResult,
};
