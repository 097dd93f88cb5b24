//! Error types for branch operations.

use flowsim_types::ErrorKind;
use thiserror::Error;

use crate::types::BranchKind;

/// Errors that can occur during branch operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefError {
    /// The branch does not exist.
    #[error("branch not found: {name}")]
    NotFound { name: String },

    /// A branch with this name already exists.
    #[error("branch already exists: {name}")]
    AlreadyExists { name: String },

    /// The branch name is malformed or names no known branch kind.
    #[error("invalid branch name: {name}: {reason}")]
    InvalidBranchName { name: String, reason: String },

    /// The new branch's kind may not be created from the source's kind.
    #[error("{kind} branch {name} cannot be created from {source_kind} (allowed: {})", list(.allowed))]
    CreationDenied {
        name: String,
        kind: BranchKind,
        source_kind: BranchKind,
        allowed: &'static [BranchKind],
    },

    /// Commits may not be made directly on this branch.
    #[error("{kind} branch {branch} does not accept direct commits")]
    CommitDenied { branch: String, kind: BranchKind },

    /// The merge is not permitted.
    #[error("cannot merge {branch} into {target}: {reason}")]
    MergeDenied {
        branch: String,
        target: String,
        reason: String,
    },

    /// Every feature branch slot is taken.
    #[error("at most {limit} feature branches may exist")]
    FeatureLimit { limit: usize },

    /// Commit message is over the length limit.
    #[error("commit message is {len} characters, limit is {max}")]
    MessageTooLong { len: usize, max: usize },

    /// A commit message or version tag cannot be written into the graph.
    #[error("invalid label {label:?}: {reason}")]
    InvalidLabel { label: String, reason: String },

    /// Restored branch state breaks an engine invariant.
    #[error("corrupt branch state: {0}")]
    Corrupt(String),
}

impl RefError {
    /// Map this error onto the shared rejection taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::CreationDenied { .. } | Self::CommitDenied { .. } | Self::MergeDenied { .. } => {
                ErrorKind::PolicyViolation
            }
            Self::FeatureLimit { .. } => ErrorKind::CapacityExceeded,
            Self::AlreadyExists { .. }
            | Self::InvalidBranchName { .. }
            | Self::MessageTooLong { .. }
            | Self::InvalidLabel { .. } => ErrorKind::Validation,
            Self::Corrupt(_) => ErrorKind::Corrupt,
        }
    }
}

fn list(kinds: &[BranchKind]) -> String {
    if kinds.is_empty() {
        return "none".into();
    }
    kinds
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Convenience type alias for branch operations.
pub type Result<T> = std::result::Result<T, RefError>;
