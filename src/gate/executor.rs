use std::process::Command;

use tracing::{info, warn};

use crate::error::{ReleaseError, Result};
use crate::gate::GateStep;

/// Executes gate steps as child processes
pub struct StepExecutor;

impl StepExecutor {
    /// Execute a step, inheriting stdin, stdout and stderr
    ///
    /// Interactive steps such as a commit description editor need the
    /// terminal, so output is not captured.
    ///
    /// # Returns
    /// * `Ok(())` if the command exits with code 0
    /// * `Err` with a gate failure if it cannot be spawned or exits non-zero
    pub fn execute(step: &GateStep) -> Result<()> {
        info!(step = %step.name, command = %step, "running gate step");

        let status = Command::new(&step.program)
            .args(&step.args)
            .envs(&step.env)
            .status()
            .map_err(|e| {
                ReleaseError::gate(
                    step.name.clone(),
                    format!("cannot run '{}': {}", step.program, e),
                )
            })?;

        if !status.success() {
            let reason = match status.code() {
                Some(code) => format!("'{}' exited with code {}", step, code),
                None => format!("'{}' was terminated by a signal", step),
            };
            warn!(step = %step.name, %reason, "gate step failed");
            return Err(ReleaseError::gate(step.name.clone(), reason));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_missing_program_fails() {
        let step = GateStep::new("fmt", "/nonexistent/path/to/tool", vec![]);
        let err = StepExecutor::execute(&step).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::GateFailure);
        assert!(err.to_string().contains("cannot run"));
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_code_reported() {
        let step = GateStep::new(
            "clippy",
            "sh",
            vec!["-c".to_string(), "exit 3".to_string()],
        );
        let err = StepExecutor::execute(&step).unwrap_err();
        assert!(err.to_string().contains("exited with code 3"));
    }

    #[cfg(unix)]
    #[test]
    fn test_env_is_passed() {
        let step = GateStep::new(
            "build",
            "sh",
            vec!["-c".to_string(), "test \"$TOOL_REVISION\" = 20240115-a1b2c3d".to_string()],
        )
        .with_env("TOOL_REVISION", "20240115-a1b2c3d");
        StepExecutor::execute(&step).unwrap();
    }
}
