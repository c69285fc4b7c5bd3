use std::collections::HashSet;
use std::sync::Mutex;

use crate::error::{ReleaseError, Result};
use crate::git::{HeadInfo, Repository};

/// A side effect recorded by [MockRepository]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Commit { message: String },
    Tag { name: String, message: String },
    PushBranch { remote: String, branch: String },
    PushTag { remote: String, tag: String },
}

/// Step at which a [MockRepository] should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    Commit,
    Tag,
    PushBranch,
    PushTag,
}

/// Mock repository for testing without actual git operations
///
/// Records every mutating call so tests can assert which steps ran.
pub struct MockRepository {
    head: Option<HeadInfo>,
    dirty: bool,
    branch: String,
    tags: Mutex<HashSet<String>>,
    fail_on: Option<MockFailure>,
    operations: Mutex<Vec<Operation>>,
}

impl MockRepository {
    /// Create a new mock repository with no commits on branch `main`
    pub fn new() -> Self {
        MockRepository {
            head: None,
            dirty: false,
            branch: "main".to_string(),
            tags: Mutex::new(HashSet::new()),
            fail_on: None,
            operations: Mutex::new(Vec::new()),
        }
    }

    /// Set the HEAD commit
    pub fn with_head(mut self, short_hash: impl Into<String>, time: i64, offset_minutes: i32) -> Self {
        self.head = Some(HeadInfo {
            short_hash: short_hash.into(),
            time,
            offset_minutes,
        });
        self
    }

    pub fn with_dirty(mut self, dirty: bool) -> Self {
        self.dirty = dirty;
        self
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    /// Add an existing tag
    pub fn with_tag(self, name: impl Into<String>) -> Self {
        self.lock_tags().insert(name.into());
        self
    }

    /// Make the given step return an error
    pub fn failing_on(mut self, step: MockFailure) -> Self {
        self.fail_on = Some(step);
        self
    }

    /// All side effects performed so far, in order
    pub fn operations(&self) -> Vec<Operation> {
        self.lock_operations().clone()
    }

    fn lock_tags(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        self.tags.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_operations(&self) -> std::sync::MutexGuard<'_, Vec<Operation>> {
        self.operations.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check(&self, step: MockFailure) -> Result<()> {
        if self.fail_on == Some(step) {
            return Err(ReleaseError::vcs(format!("injected {:?} failure", step)));
        }
        Ok(())
    }

    fn record(&self, operation: Operation) {
        self.lock_operations().push(operation);
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn head_info(&self) -> Result<HeadInfo> {
        self.head
            .clone()
            .ok_or_else(|| ReleaseError::environment("Repository has no commits yet"))
    }

    fn is_dirty(&self) -> Result<bool> {
        Ok(self.dirty)
    }

    fn current_branch(&self) -> Result<String> {
        Ok(self.branch.clone())
    }

    fn tag_exists(&self, name: &str) -> Result<bool> {
        Ok(self.lock_tags().contains(name))
    }

    fn commit_all(&self, message: &str) -> Result<String> {
        self.check(MockFailure::Commit)?;
        self.record(Operation::Commit {
            message: message.to_string(),
        });
        Ok("0".repeat(40))
    }

    fn create_annotated_tag(&self, name: &str, message: &str) -> Result<()> {
        self.check(MockFailure::Tag)?;
        if !self.lock_tags().insert(name.to_string()) {
            return Err(ReleaseError::vcs(format!("Tag '{}' already exists", name)));
        }
        self.record(Operation::Tag {
            name: name.to_string(),
            message: message.to_string(),
        });
        Ok(())
    }

    fn push_branch(&self, remote: &str, branch: &str) -> Result<()> {
        self.check(MockFailure::PushBranch)?;
        self.record(Operation::PushBranch {
            remote: remote.to_string(),
            branch: branch.to_string(),
        });
        Ok(())
    }

    fn push_tag(&self, remote: &str, tag: &str) -> Result<()> {
        self.check(MockFailure::PushTag)?;
        self.record(Operation::PushTag {
            remote: remote.to_string(),
            tag: tag.to_string(),
        });
        Ok(())
    }
}
