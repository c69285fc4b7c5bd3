//! Git operations abstraction layer
//!
//! The release and revision workflows only talk to version control through
//! the [Repository] trait. Two implementations exist:
//!
//! - [repository::Git2Repository]: a real implementation using the `git2` crate
//! - [mock::MockRepository]: an in-memory implementation for tests
//!
//! ```rust
//! # use release_kit::git::Repository;
//! # fn example<R: Repository>(repo: &R) -> release_kit::Result<()> {
//! let head = repo.head_info()?;
//! println!("HEAD is {}", head.short_hash);
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::{MockFailure, MockRepository, Operation};
pub use repository::Git2Repository;

use crate::error::Result;

/// Metadata of the commit at HEAD
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadInfo {
    /// Abbreviated commit id
    pub short_hash: String,
    /// Committer time, seconds since the Unix epoch
    pub time: i64,
    /// Committer UTC offset in minutes
    pub offset_minutes: i32,
}

/// Version control operations needed by release-kit
///
/// Every method is a single fallible step; implementations never retry and
/// never undo earlier steps.
pub trait Repository {
    /// Returns the HEAD commit's abbreviated id and commit time.
    ///
    /// # Returns
    /// * `Err` with an environment error if the repository has no commits
    fn head_info(&self) -> Result<HeadInfo>;

    /// Whether tracked files in the working tree or index differ from HEAD.
    ///
    /// Untracked and ignored files do not make a tree dirty.
    fn is_dirty(&self) -> Result<bool>;

    /// Short name of the checked-out branch.
    ///
    /// # Returns
    /// * `Err` if HEAD is detached
    fn current_branch(&self) -> Result<String>;

    /// Whether a tag with this name exists locally.
    fn tag_exists(&self, name: &str) -> Result<bool>;

    /// Stages every working-tree change and commits it on HEAD.
    ///
    /// # Returns
    /// * `Ok(String)` - Id of the new commit
    /// * `Err` - If there is nothing to commit or the commit cannot be written
    fn commit_all(&self, message: &str) -> Result<String>;

    /// Creates an annotated tag on HEAD.
    ///
    /// # Returns
    /// * `Err` - If the tag already exists or HEAD cannot be resolved
    fn create_annotated_tag(&self, name: &str, message: &str) -> Result<()>;

    /// Pushes the local branch `refs/heads/<branch>` to the remote.
    fn push_branch(&self, remote: &str, branch: &str) -> Result<()>;

    /// Pushes the tag `refs/tags/<tag>` to the remote.
    fn push_tag(&self, remote: &str, tag: &str) -> Result<()>;
}
