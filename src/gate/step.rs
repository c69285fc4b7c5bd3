use std::collections::HashMap;
use std::fmt;

use crate::config::StepConfig;
use crate::error::{ReleaseError, Result};

/// One external command of a gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateStep {
    /// Name reported when the step fails
    pub name: String,
    pub program: String,
    pub args: Vec<String>,
    /// Extra environment variables for the child process
    pub env: HashMap<String, String>,
}

impl GateStep {
    pub fn new(name: impl Into<String>, program: impl Into<String>, args: Vec<String>) -> Self {
        GateStep {
            name: name.into(),
            program: program.into(),
            args,
            env: HashMap::new(),
        }
    }

    /// Builds a step from its configured command line.
    ///
    /// Returns `None` for an empty command.
    pub fn from_command(name: impl Into<String>, command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(GateStep::new(name, program.clone(), args.to_vec()))
    }

    /// Builds every configured step, rejecting any with an empty command.
    pub fn from_configs(configs: &[StepConfig]) -> Result<Vec<Self>> {
        configs
            .iter()
            .map(|c| {
                GateStep::from_command(c.name.clone(), &c.command).ok_or_else(|| {
                    ReleaseError::config(format!(
                        "precommit step '{}' has an empty command",
                        c.name
                    ))
                })
            })
            .collect()
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for GateStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}
