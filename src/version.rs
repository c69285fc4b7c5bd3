use std::fmt;
use std::str::FromStr;

use semver::{BuildMetadata, Prerelease, Version};
use serde::{Deserialize, Serialize};

use crate::error::{ReleaseError, Result};

/// Version of this binary as reported by `--version`.
pub const RELEASE_KIT_VERSION: &str = env!("CARGO_PKG_VERSION");
const REVISION_SUFFIX: Option<&str> = option_env!("RELEASE_KIT_REVISION");

/// Returns the tool version with the build revision appended.
///
/// The revision is baked in at compile time from `RELEASE_KIT_REVISION`
/// (normally produced by `release-kit build`) and falls back to `dev`.
pub fn tool_version() -> String {
    let suffix = REVISION_SUFFIX.unwrap_or("dev");
    format!("{}-{}", RELEASE_KIT_VERSION, suffix)
}

/// Granularity of a semantic version increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BumpLevel {
    Major,
    #[default]
    Minor,
    Patch,
}

impl BumpLevel {
    /// Applies this bump to a version.
    ///
    /// Increments the selected component and resets the lower ones:
    /// - **Major**: major += 1, minor = 0, patch = 0
    /// - **Minor**: minor += 1, patch = 0
    /// - **Patch**: patch += 1
    ///
    /// Pre-release and build metadata are always dropped.
    pub fn apply(&self, version: &Version) -> Version {
        let mut next = version.clone();
        match self {
            BumpLevel::Major => {
                next.major += 1;
                next.minor = 0;
                next.patch = 0;
            }
            BumpLevel::Minor => {
                next.minor += 1;
                next.patch = 0;
            }
            BumpLevel::Patch => {
                next.patch += 1;
            }
        }
        next.pre = Prerelease::EMPTY;
        next.build = BuildMetadata::EMPTY;
        next
    }
}

impl FromStr for BumpLevel {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "major" => Ok(BumpLevel::Major),
            "minor" => Ok(BumpLevel::Minor),
            "patch" => Ok(BumpLevel::Patch),
            other => Err(ReleaseError::invalid_input(format!(
                "Unknown bump level '{}', expected one of major, minor, patch",
                other
            ))),
        }
    }
}

impl fmt::Display for BumpLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BumpLevel::Major => write!(f, "major"),
            BumpLevel::Minor => write!(f, "minor"),
            BumpLevel::Patch => write!(f, "patch"),
        }
    }
}

/// Parses a manifest version string.
pub fn parse_version(raw: &str) -> Result<Version> {
    Version::parse(raw.trim())
        .map_err(|e| ReleaseError::invalid_input(format!("Invalid version '{}': {}", raw, e)))
}
