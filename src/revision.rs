//! Build revision strings derived from the checkout.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use tracing::debug;

use crate::error::{ReleaseError, Result};
use crate::git::{HeadInfo, Repository};

/// Suffix appended when the working tree differs from HEAD.
pub const DIRTY_SUFFIX: &str = "-dev";

/// A sortable identifier of the current checkout, `{date}-{hash}[-dev]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
    /// Commit date as `YYYYMMDD`, in the committer's own offset
    pub date: String,
    pub hash: String,
    pub dirty: bool,
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.date, self.hash)?;
        if self.dirty {
            f.write_str(DIRTY_SUFFIX)?;
        }
        Ok(())
    }
}

/// Formats a commit timestamp as `YYYYMMDD` in the commit's UTC offset.
pub fn commit_date(head: &HeadInfo) -> Result<String> {
    let offset = FixedOffset::east_opt(head.offset_minutes * 60).ok_or_else(|| {
        ReleaseError::vcs(format!("Invalid commit UTC offset: {} minutes", head.offset_minutes))
    })?;
    let time = DateTime::from_timestamp(head.time, 0)
        .ok_or_else(|| ReleaseError::vcs(format!("Invalid commit timestamp: {}", head.time)))?;
    Ok(time.with_timezone(&offset).format("%Y%m%d").to_string())
}

/// Reads HEAD and the working tree state and composes the revision.
///
/// Read-only; fails if the repository has no commits.
pub fn compose<R: Repository + ?Sized>(repo: &R) -> Result<Revision> {
    let head = repo.head_info()?;
    let revision = Revision {
        date: commit_date(&head)?,
        hash: head.short_hash,
        dirty: repo.is_dirty()?,
    };
    debug!(revision = %revision, "composed revision");
    Ok(revision)
}
