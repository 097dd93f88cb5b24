//! Core branch types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Workflow role of a branch.
///
/// The kind, not the name, decides what a branch may be created from, whether
/// it takes direct commits, and what may be merged into it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchKind {
    Master,
    Develop,
    Release,
    Hotfix,
    Feature,
}

impl BranchKind {
    /// Every kind, in graph order from top to bottom.
    pub const ALL: [BranchKind; 5] = [
        Self::Feature,
        Self::Develop,
        Self::Release,
        Self::Hotfix,
        Self::Master,
    ];

    /// The name prefix that selects this kind.
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Master => "master",
            Self::Develop => "develop",
            Self::Release => "release",
            Self::Hotfix => "hotfix",
            Self::Feature => "feature",
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.prefix() == prefix)
    }
}

impl fmt::Display for BranchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// An entry in a branch's local commit list.
///
/// Persisted untagged: `{"message": ..}` for commits, `{"tag": ..}` for
/// version tags on master.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BranchCommit {
    /// A direct commit.
    Message { message: String },
    /// A version tag recorded by a merge into master.
    Tag { tag: String },
}

impl BranchCommit {
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }

    pub fn tag(tag: impl Into<String>) -> Self {
        Self::Tag { tag: tag.into() }
    }

    /// The message or tag text.
    pub fn label(&self) -> &str {
        match self {
            Self::Message { message } => message,
            Self::Tag { tag } => tag,
        }
    }
}

/// A branch in the simulated repository.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    /// Unique branch name (e.g. "develop", "feature-login").
    pub name: String,
    #[serde(rename = "type")]
    pub kind: BranchKind,
    /// Vertical position in the rendered graph.
    pub order: i32,
    /// Local commits and tags, oldest first.
    pub commits: Vec<BranchCommit>,
}

impl Branch {
    pub fn new(name: impl Into<String>, kind: BranchKind, order: i32) -> Self {
        Self {
            name: name.into(),
            kind,
            order,
            commits: Vec::new(),
        }
    }

    /// Version tags on this branch, oldest first.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.commits.iter().filter_map(|c| match c {
            BranchCommit::Tag { tag } => Some(tag.as_str()),
            BranchCommit::Message { .. } => None,
        })
    }
}

/// A recorded merge. Used only for rendering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeEdge {
    pub source: String,
    pub target: String,
}

impl MergeEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}
