use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identity::FileId;

/// Classification of change events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// A file was added to the working set.
    FileCreated,
    /// An untracked file became tracked.
    FileTracked,
    /// A file's content changed.
    FileEdited,
    /// A snapshot of the file entered (or replaced one in) the staging area.
    FileStaged,
    /// A file left the staging area and went back to the working set.
    FileUnstaged,
    /// A staged file was soft-deleted and awaits confirmation.
    FileDeleted,
    /// A file left the working set for good.
    FileRemoved,
    /// A staged snapshot was recorded in the file's history.
    FileCommitted,
    /// A file's content was rolled back to an earlier version.
    FileReverted,
    /// A revert brought back a file that had been removed.
    FileRestored,
    /// A branch was created.
    BranchCreated,
    /// A commit was recorded on a branch.
    CodeCommitted,
    /// A branch was merged into another.
    BranchMerged,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::FileCreated => "FileCreated",
            Self::FileTracked => "FileTracked",
            Self::FileEdited => "FileEdited",
            Self::FileStaged => "FileStaged",
            Self::FileUnstaged => "FileUnstaged",
            Self::FileDeleted => "FileDeleted",
            Self::FileRemoved => "FileRemoved",
            Self::FileCommitted => "FileCommitted",
            Self::FileReverted => "FileReverted",
            Self::FileRestored => "FileRestored",
            Self::BranchCreated => "BranchCreated",
            Self::CodeCommitted => "CodeCommitted",
            Self::BranchMerged => "BranchMerged",
        };
        write!(f, "{s}")
    }
}

/// What a change event refers to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeTarget {
    /// A file in the working set (or one that just left it).
    File(FileId),
    /// A branch by name.
    Branch(String),
    /// A merge edge.
    Merge { source: String, target: String },
}

impl fmt::Display for ChangeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(id) => write!(f, "file {id}"),
            Self::Branch(name) => write!(f, "branch {name}"),
            Self::Merge { source, target } => write!(f, "{source} -> {target}"),
        }
    }
}

/// Notification that an operation was accepted and changed state.
///
/// Events are what a UI layer keys its transient visual cues on. The engines
/// never depend on anyone consuming them.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Classification of the change.
    pub kind: EventKind,
    /// The file, branch or edge that changed.
    pub target: ChangeTarget,
}

impl ChangeEvent {
    /// Event about a file.
    pub fn file(kind: EventKind, id: FileId) -> Self {
        Self {
            kind,
            target: ChangeTarget::File(id),
        }
    }

    /// Event about a branch.
    pub fn branch(kind: EventKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            target: ChangeTarget::Branch(name.into()),
        }
    }

    /// Event about a merge edge.
    pub fn merge(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            kind: EventKind::BranchMerged,
            target: ChangeTarget::Merge {
                source: source.into(),
                target: target.into(),
            },
        }
    }

    /// The file this event is about, if any.
    pub fn file_id(&self) -> Option<FileId> {
        match self.target {
            ChangeTarget::File(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.target)
    }
}
