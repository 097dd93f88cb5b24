//! Working-set file types and the lifecycle state they carry.

use std::fmt;

use flowsim_types::{ContentId, FileId};
use serde::{Deserialize, Serialize};

/// The public status code of a file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileStatus {
    Untracked,
    Tracked,
    Staged,
    Committed,
    Modified,
    Deleted,
}

impl FileStatus {
    /// Numeric code used by status displays (`UNTRACKED = 0` .. `DELETED = 5`).
    pub const fn code(self) -> u8 {
        match self {
            Self::Untracked => 0,
            Self::Tracked => 1,
            Self::Staged => 2,
            Self::Committed => 3,
            Self::Modified => 4,
            Self::Deleted => 5,
        }
    }

    /// Inverse of [`FileStatus::code`].
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Untracked),
            1 => Some(Self::Tracked),
            2 => Some(Self::Staged),
            3 => Some(Self::Committed),
            4 => Some(Self::Modified),
            5 => Some(Self::Deleted),
            _ => None,
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Untracked => "untracked",
            Self::Tracked => "tracked",
            Self::Staged => "staged",
            Self::Committed => "committed",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
        };
        f.write_str(s)
    }
}

/// Lifecycle state of a working file.
///
/// This is the single source of truth for transition eligibility. The
/// `tracked`/`modified` flags are derived from it; whether a file is staged
/// is answered by the staging area.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileState {
    /// Known to the working set but not under version control.
    #[default]
    Untracked,
    /// Under version control and not staged. `dirty` records an edit made
    /// while tracked; the status stays `Tracked` until the file is staged.
    Tracked { dirty: bool },
    /// Snapshot in the staging area matches the working content.
    Staged,
    /// Recorded in history and unchanged since.
    Committed,
    /// Changed after being staged or committed, or rolled back by a revert.
    Modified,
    /// Soft-deleted while staged; waits for unstage, stage or commit.
    Deleted,
}

impl FileState {
    /// The public status code for this state.
    pub const fn status(self) -> FileStatus {
        match self {
            Self::Untracked => FileStatus::Untracked,
            Self::Tracked { .. } => FileStatus::Tracked,
            Self::Staged => FileStatus::Staged,
            Self::Committed => FileStatus::Committed,
            Self::Modified => FileStatus::Modified,
            Self::Deleted => FileStatus::Deleted,
        }
    }

    pub const fn is_tracked(self) -> bool {
        !matches!(self, Self::Untracked)
    }

    pub const fn is_modified(self) -> bool {
        matches!(self, Self::Tracked { dirty: true } | Self::Modified)
    }

    pub const fn is_deleted(self) -> bool {
        matches!(self, Self::Deleted)
    }

    /// States from which `stage` records a new snapshot.
    pub const fn is_stageable(self) -> bool {
        matches!(self, Self::Tracked { .. } | Self::Modified)
    }

    /// State after the file's content is edited, or `None` if edits are refused.
    pub const fn after_edit(self) -> Option<Self> {
        match self {
            Self::Untracked => Some(Self::Untracked),
            Self::Tracked { .. } => Some(Self::Tracked { dirty: true }),
            Self::Staged | Self::Committed | Self::Modified => Some(Self::Modified),
            Self::Deleted => None,
        }
    }
}

/// A file in the simulated working set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingFile {
    /// Creation-ordered identity.
    pub id: FileId,
    /// Display name. Not required to be unique.
    pub name: String,
    /// Current working content.
    pub content: String,
    /// Lifecycle state.
    pub state: FileState,
}

impl WorkingFile {
    /// A new, empty, untracked file.
    pub fn new(id: FileId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            content: String::new(),
            state: FileState::Untracked,
        }
    }

    pub fn status(&self) -> FileStatus {
        self.state.status()
    }

    /// Digest of the current working content.
    pub fn content_id(&self) -> ContentId {
        ContentId::of(&self.content)
    }
}

/// Flat, flag-carrying view of a file for display layers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileView {
    pub id: FileId,
    pub name: String,
    pub content: String,
    pub status: FileStatus,
    pub code: u8,
    pub tracked: bool,
    pub staged: bool,
    pub modified: bool,
}

impl FileView {
    pub(crate) fn new(file: &WorkingFile, staged: bool) -> Self {
        Self {
            id: file.id,
            name: file.name.clone(),
            content: file.content.clone(),
            status: file.status(),
            code: file.status().code(),
            tracked: file.state.is_tracked(),
            staged,
            modified: file.state.is_modified(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_file_is_untracked_and_empty() {
        let file = WorkingFile::new(FileId::new(1), "a.txt");
        assert_eq!(file.status(), FileStatus::Untracked);
        assert!(file.content.is_empty());
        assert_eq!(file.content_id(), ContentId::empty());
    }

    #[test]
    fn codes_roundtrip() {
        for code in 0..6 {
            let status = FileStatus::from_code(code).unwrap();
            assert_eq!(status.code(), code);
        }
        assert_eq!(FileStatus::from_code(6), None);
    }

    #[test]
    fn derived_flags() {
        assert!(!FileState::Untracked.is_tracked());
        assert!(FileState::Tracked { dirty: false }.is_tracked());
        assert!(!FileState::Tracked { dirty: false }.is_modified());
        assert!(FileState::Tracked { dirty: true }.is_modified());
        assert!(FileState::Modified.is_modified());
        assert!(!FileState::Committed.is_modified());
    }

    #[test]
    fn edit_transitions() {
        assert_eq!(
            FileState::Tracked { dirty: false }.after_edit(),
            Some(FileState::Tracked { dirty: true })
        );
        assert_eq!(FileState::Staged.after_edit(), Some(FileState::Modified));
        assert_eq!(FileState::Committed.after_edit(), Some(FileState::Modified));
        assert_eq!(FileState::Untracked.after_edit(), Some(FileState::Untracked));
        assert_eq!(FileState::Deleted.after_edit(), None);
    }

    #[test]
    fn only_tracked_and_modified_are_stageable() {
        assert!(FileState::Tracked { dirty: true }.is_stageable());
        assert!(FileState::Modified.is_stageable());
        assert!(!FileState::Untracked.is_stageable());
        assert!(!FileState::Staged.is_stageable());
        assert!(!FileState::Committed.is_stageable());
        assert!(!FileState::Deleted.is_stageable());
    }

    #[test]
    fn view_carries_derived_flags() {
        let mut file = WorkingFile::new(FileId::new(9), "b.txt");
        file.state = FileState::Tracked { dirty: true };
        let view = FileView::new(&file, false);
        assert_eq!(view.code, 1);
        assert!(view.tracked);
        assert!(view.modified);
        assert!(!view.staged);
    }
}
