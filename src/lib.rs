pub mod cli;
pub mod config;
pub mod error;
pub mod gate;
pub mod git;
pub mod manifest;
pub mod revision;
pub mod ui;
pub mod version;

pub use error::{ErrorKind, ReleaseError, Result};
