//! Error types for the index crate.

use flowsim_types::{ErrorKind, FileId};

use crate::entry::FileStatus;

/// Errors that can occur during worktree operations.
///
/// Every variant is a rejection: the worktree is left exactly as it was
/// before the call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexError {
    /// No file with this id is in the working set.
    #[error("file not found: {0}")]
    FileNotFound(FileId),

    /// The file exists but has no snapshot in the staging area.
    #[error("file {0} is not staged")]
    NotStaged(FileId),

    /// The file has never been committed.
    #[error("no history for file {0}")]
    NoHistory(FileId),

    /// The requested version index is past the end of the file's history.
    #[error("file {id} has no version {index} (history holds {len})")]
    VersionNotFound { id: FileId, index: usize, len: usize },

    /// The operation is not allowed from the file's current status.
    #[error("cannot {operation} file {id} while it is {status}")]
    InvalidTransition {
        id: FileId,
        operation: &'static str,
        status: FileStatus,
    },

    /// An argument was rejected before touching any state.
    #[error("validation error: {0}")]
    Validation(String),

    /// The worktree breaks one of its own invariants.
    #[error("corrupt worktree: {0}")]
    Corrupt(String),
}

impl IndexError {
    /// Map this error onto the shared rejection taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FileNotFound(_) | Self::NoHistory(_) | Self::VersionNotFound { .. } => {
                ErrorKind::NotFound
            }
            Self::NotStaged(_) | Self::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Corrupt(_) => ErrorKind::Corrupt,
        }
    }
}

/// Convenience alias for index results.
pub type IndexResult<T> = Result<T, IndexError>;
