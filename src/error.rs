use thiserror::Error;

/// Broad failure category of a release-kit operation.
///
/// Every [`ReleaseError`] maps onto exactly one kind so that callers can tell
/// a bad argument from a failed gate or a failed push without string matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unrecognised bump level, missing manifest, manifest without a version
    InvalidInput,
    /// A format, lint, test or other external step exited non-zero
    GateFailure,
    /// Commit, tag or push failed
    VcsFailure,
    /// Not inside a repository, no commit history, unreadable files
    EnvironmentFailure,
    /// Configuration file could not be read or parsed
    Config,
}

/// Unified error type for release-kit operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Gate step '{step}' failed: {reason}")]
    Gate { step: String, reason: String },

    #[error("Version control operation failed: {0}")]
    Vcs(String),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Environment error: {0}")]
    Environment(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in release-kit
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    /// Create an invalid input error with context
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        ReleaseError::InvalidInput(msg.into())
    }

    /// Create a gate failure for the named step
    pub fn gate(step: impl Into<String>, reason: impl Into<String>) -> Self {
        ReleaseError::Gate {
            step: step.into(),
            reason: reason.into(),
        }
    }

    /// Create a version control error with context
    pub fn vcs(msg: impl Into<String>) -> Self {
        ReleaseError::Vcs(msg.into())
    }

    /// Create an environment error with context
    pub fn environment(msg: impl Into<String>) -> Self {
        ReleaseError::Environment(msg.into())
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::Config(msg.into())
    }

    /// The failure category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReleaseError::InvalidInput(_) => ErrorKind::InvalidInput,
            ReleaseError::Gate { .. } => ErrorKind::GateFailure,
            ReleaseError::Vcs(_) | ReleaseError::Git(_) => ErrorKind::VcsFailure,
            ReleaseError::Environment(_) | ReleaseError::Io(_) => ErrorKind::EnvironmentFailure,
            ReleaseError::Config(_) => ErrorKind::Config,
        }
    }
}
