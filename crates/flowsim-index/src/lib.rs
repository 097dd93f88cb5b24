//! File lifecycle engine for flowsim.
//!
//! Owns the simulated working set, the staging area sitting between the
//! working set and the history, and the per-file version chains that commits
//! append to and reverts roll back.
//!
//! # Key Types
//!
//! - [`Worktree`] -- The engine and its command surface
//! - [`WorkingFile`] / [`FileState`] -- A file and its lifecycle state
//! - [`FileStatus`] -- The six public status codes
//! - [`StagingArea`] / [`StagedEntry`] -- Snapshots queued for the next commit
//! - [`History`] / [`RepoFile`] / [`Version`] -- Newest-first version chains
//! - [`WorkdirStatus`] -- Grouped summary for status displays

pub mod entry;
pub mod error;
pub mod history;
pub mod staging;
pub mod status;
pub mod worktree;

pub use entry::{FileState, FileStatus, FileView, WorkingFile};
pub use error::{IndexError, IndexResult};
pub use history::{History, LogEntry, RepoFile, Version};
pub use staging::{StagedEntry, StagingArea};
pub use status::{StatusEntry, WorkdirStatus};
pub use worktree::Worktree;
