//! High-level SDK for flowsim.
//!
//! [`Simulator`] is the single owner of simulation state: the file lifecycle
//! engine, the branch rule engine and the events both produce. This is the
//! entry point for front-ends such as the `flowsim` CLI.

pub mod config;
pub mod error;
pub mod simulator;
pub mod snapshot;

pub use config::SimConfig;
pub use error::{SdkError, SdkResult};
pub use simulator::Simulator;
pub use snapshot::Snapshot;

// Re-export key types
pub use flowsim_index::{
    FileStatus, FileView, LogEntry, RepoFile, StatusEntry, Version, WorkdirStatus,
};
pub use flowsim_refs::{Branch, BranchCommit, BranchKind, GraphDescription, MergeEdge, RuleConfig};
pub use flowsim_types::{ChangeEvent, ErrorKind, EventKind, FileId};
