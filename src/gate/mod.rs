//! Pre-commit gate
//!
//! Runs ordered external commands with fail-fast semantics:
//! - checks: format, lint, test
//! - commit steps: describe, advance, push, only once every check passed

pub mod executor;
pub mod step;

pub use executor::StepExecutor;
pub use step::GateStep;

use tracing::info;

use crate::config::PrecommitConfig;
use crate::error::Result;

/// Runs every step in order and stops at the first failure.
pub fn run_steps(steps: &[GateStep]) -> Result<()> {
    for step in steps {
        StepExecutor::execute(step)?;
    }
    Ok(())
}

/// Runs the configured checks, then the commit steps unless `skip_commit`.
///
/// A failing check means no commit step is attempted.
pub fn run_precommit(config: &PrecommitConfig, skip_commit: bool) -> Result<()> {
    let checks = GateStep::from_configs(&config.checks)?;
    run_steps(&checks)?;
    info!(count = checks.len(), "all checks passed");

    if skip_commit {
        return Ok(());
    }
    run_steps(&GateStep::from_configs(&config.commit)?)
}
