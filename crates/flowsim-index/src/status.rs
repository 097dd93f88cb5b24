//! Working set status summary.
//!
//! Groups every working file by its lifecycle state, the way a `status`
//! command prints it.

use flowsim_types::FileId;
use serde::{Deserialize, Serialize};

use crate::entry::FileStatus;

/// Complete status of the working set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkdirStatus {
    /// Files not under version control.
    pub untracked: Vec<StatusEntry>,
    /// Tracked files edited since they were tracked or unstaged.
    pub unstaged_changes: Vec<StatusEntry>,
    /// Snapshots waiting in the staging area (including soft deletions).
    pub staged: Vec<StatusEntry>,
    /// Modified files, staged or not.
    pub modified: Vec<StatusEntry>,
    /// Files whose snapshot no longer matches the working content.
    pub changed_since_staging: Vec<FileId>,
    /// Clean committed files.
    pub committed: Vec<StatusEntry>,
    /// Soft-deleted files awaiting confirmation.
    pub deleted: Vec<StatusEntry>,
}

impl WorkdirStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if nothing is pending anywhere.
    pub fn is_clean(&self) -> bool {
        self.untracked.is_empty()
            && self.unstaged_changes.is_empty()
            && self.staged.is_empty()
            && self.modified.is_empty()
            && self.deleted.is_empty()
    }

    pub fn has_staged_changes(&self) -> bool {
        !self.staged.is_empty()
    }
}

/// A single line of status output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub id: FileId,
    pub name: String,
    pub status: FileStatus,
}

impl StatusEntry {
    pub fn new(id: FileId, name: impl Into<String>, status: FileStatus) -> Self {
        Self {
            id,
            name: name.into(),
            status,
        }
    }
}
