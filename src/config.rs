use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{ReleaseError, Result};
use crate::version::BumpLevel;

/// File name looked up in the working directory and the user config directory.
pub const CONFIG_FILE_NAME: &str = "release-kit.toml";

/// Represents the complete configuration for release-kit.
///
/// Every section is optional; a missing file yields the defaults below.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub release: ReleaseConfig,

    #[serde(default)]
    pub precommit: PrecommitConfig,

    #[serde(default)]
    pub build: BuildConfig,
}

/// An external command run as one gate step.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct StepConfig {
    pub name: String,
    pub command: Vec<String>,
}

impl StepConfig {
    fn new(name: &str, command: &[&str]) -> Self {
        StepConfig {
            name: name.to_string(),
            command: command.iter().map(|s| s.to_string()).collect(),
        }
    }
}

fn default_manifest() -> String {
    "Cargo.toml".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_true() -> bool {
    true
}

fn default_commit_message() -> String {
    "chore(release): Release v{version}".to_string()
}

fn default_tag_name() -> String {
    "v{version}".to_string()
}

fn default_tag_message() -> String {
    "Release v{version}".to_string()
}

/// Settings of the `release` workflow.
///
/// The message and tag templates substitute `{version}`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ReleaseConfig {
    #[serde(default = "default_manifest")]
    pub manifest: String,

    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default)]
    pub default_level: BumpLevel,

    #[serde(default = "default_true")]
    pub push_branch: bool,

    #[serde(default = "default_commit_message")]
    pub commit_message: String,

    #[serde(default = "default_tag_name")]
    pub tag_name: String,

    #[serde(default = "default_tag_message")]
    pub tag_message: String,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        ReleaseConfig {
            manifest: default_manifest(),
            remote: default_remote(),
            default_level: BumpLevel::default(),
            push_branch: true,
            commit_message: default_commit_message(),
            tag_name: default_tag_name(),
            tag_message: default_tag_message(),
        }
    }
}

fn default_checks() -> Vec<StepConfig> {
    vec![
        StepConfig::new("fmt", &["cargo", "fmt", "--all"]),
        StepConfig::new(
            "clippy",
            &["cargo", "clippy", "--all-targets", "--", "-D", "warnings"],
        ),
        StepConfig::new("test", &["cargo", "test"]),
    ]
}

fn default_commit_steps() -> Vec<StepConfig> {
    vec![
        StepConfig::new("describe", &["jj", "describe"]),
        StepConfig::new("advance", &["jj", "new"]),
        StepConfig::new("push", &["jj", "git", "push"]),
    ]
}

/// Settings of the pre-commit gate.
///
/// `checks` run first, in order; `commit` steps only run once all checks passed.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PrecommitConfig {
    #[serde(default = "default_checks")]
    pub checks: Vec<StepConfig>,

    #[serde(default = "default_commit_steps")]
    pub commit: Vec<StepConfig>,
}

impl Default for PrecommitConfig {
    fn default() -> Self {
        PrecommitConfig {
            checks: default_checks(),
            commit: default_commit_steps(),
        }
    }
}

fn default_build_command() -> Vec<String> {
    vec![
        "cargo".to_string(),
        "build".to_string(),
        "--release".to_string(),
    ]
}

fn default_revision_env() -> String {
    "TOOL_REVISION".to_string()
}

/// Settings of the `build` workflow.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BuildConfig {
    #[serde(default = "default_build_command")]
    pub command: Vec<String>,

    #[serde(default = "default_revision_env")]
    pub revision_env: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            command: default_build_command(),
            revision_env: default_revision_env(),
        }
    }
}

/// Substitutes `{version}` in a configured template.
pub fn render_template(template: &str, version: &str) -> String {
    template.replace("{version}", version)
}

/// Parses configuration from a TOML string.
pub fn parse_config(content: &str) -> Result<Config> {
    toml::from_str(content).map_err(|e| ReleaseError::config(e.to_string()))
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `release-kit.toml` in current directory
/// 3. `release-kit.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If a file exists but cannot be read or parsed, or the custom path is missing
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        read_config_file(Path::new(path))?
    } else if Path::new(CONFIG_FILE_NAME).exists() {
        read_config_file(Path::new(CONFIG_FILE_NAME))?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            read_config_file(&config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let config = parse_config(&config_str)?;
    validate(&config)?;
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| ReleaseError::config(format!("Cannot read '{}': {}", path.display(), e)))
}

fn validate(config: &Config) -> Result<()> {
    if !config.release.tag_name.contains("{version}") {
        return Err(ReleaseError::config(format!(
            "release.tag_name '{}' must contain {{version}}",
            config.release.tag_name
        )));
    }
    if config.build.command.is_empty() {
        return Err(ReleaseError::config("build.command must not be empty"));
    }
    let steps = config
        .precommit
        .checks
        .iter()
        .chain(config.precommit.commit.iter());
    for step in steps {
        if step.command.is_empty() {
            return Err(ReleaseError::config(format!(
                "precommit step '{}' has an empty command",
                step.name
            )));
        }
    }
    Ok(())
}
