use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Identity of a simulated file.
///
/// Ids are allocated from a monotonically increasing counter owned by the
/// worktree, so ordering by id is ordering by creation. An id is never
/// reused, even after the file is removed, which lets a revert re-materialize
/// a file under its original identity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(u64);

impl FileId {
    /// Wrap a raw id value.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw id value.
    pub const fn get(self) -> u64 {
        self.0
    }

    /// The id allocated after this one.
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Debug for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileId({})", self.0)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl FromStr for FileId {
    type Err = TypeError;

    /// Accepts both `7` and `#7`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().strip_prefix('#').unwrap_or(s.trim());
        digits
            .parse::<u64>()
            .map(Self)
            .map_err(|_| TypeError::InvalidFileId(s.to_string()))
    }
}

impl From<u64> for FileId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}
