//! Persisted simulation state.
//!
//! A snapshot is one flat JSON object:
//!
//! ```text
//! { next_file_id, files, staging_area, repo, branches, links, graph }
//! ```
//!
//! The first four fields belong to the file lifecycle engine, the last three
//! to the branch rule engine. Nothing is validated here; see
//! [`Simulator::restore`](crate::Simulator::restore).

use std::fs;
use std::path::Path;

use flowsim_index::Worktree;
use flowsim_refs::BranchEngine;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SdkError, SdkResult};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(flatten)]
    pub worktree: Worktree,
    #[serde(flatten)]
    pub branches: BranchEngine,
}

impl Snapshot {
    pub fn to_json(&self) -> SdkResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> SdkResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Write the snapshot to `path` as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> SdkResult<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?).map_err(|e| SdkError::io(path, e))?;
        debug!(path = %path.display(), "saved snapshot");
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> SdkResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| SdkError::io(path, e))?;
        Self::from_json(&text)
    }
}
