use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("invalid file id: {0:?}")]
    InvalidFileId(String),
}

/// Classification of a rejected operation.
///
/// Every engine error maps onto exactly one kind. A rejection of any kind
/// leaves the engine state unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// A referenced file, branch or version does not exist.
    NotFound,
    /// The operation is not allowed from the current file status.
    InvalidTransition,
    /// The branch rule table forbids the operation.
    PolicyViolation,
    /// A fixed capacity (feature branch slots) is exhausted.
    CapacityExceeded,
    /// An argument failed validation (message length, blank name, ...).
    Validation,
    /// Restored state breaks an engine invariant.
    Corrupt,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotFound => "not found",
            Self::InvalidTransition => "invalid transition",
            Self::PolicyViolation => "policy violation",
            Self::CapacityExceeded => "capacity exceeded",
            Self::Validation => "validation error",
            Self::Corrupt => "corrupt state",
        };
        f.write_str(s)
    }
}
