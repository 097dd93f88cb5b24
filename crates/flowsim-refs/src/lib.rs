//! Branch rule engine for flowsim.
//!
//! Models a git-flow branch topology: one `master`, a `develop` line,
//! `release`/`hotfix` branches and up to three concurrent `feature`
//! branches. Every creation, commit and merge request is checked against a
//! fixed rule table before it is accepted, and each accepted request appends
//! a fragment to a mermaid `gitGraph` description that a renderer consumes.
//!
//! # Modules
//!
//! - [`error`] -- Rejection types
//! - [`types`] -- [`Branch`], [`BranchKind`], [`BranchCommit`], [`MergeEdge`]
//! - [`names`] -- Branch name validation and kind inference
//! - [`policy`] -- The static [`RuleTable`]
//! - [`config`] -- Tunable limits ([`RuleConfig`])
//! - [`graph`] -- The append-only [`GraphDescription`]
//! - [`engine`] -- The [`BranchEngine`] command surface

pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod names;
pub mod policy;
pub mod types;

pub use config::RuleConfig;
pub use engine::BranchEngine;
pub use error::{RefError, Result};
pub use graph::GraphDescription;
pub use names::{infer_kind, validate_branch_name, validate_label};
pub use policy::RuleTable;
pub use types::{Branch, BranchCommit, BranchKind, MergeEdge};
