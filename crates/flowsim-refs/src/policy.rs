//! The git-flow rule table.
//!
//! Every rule is a membership check against a fixed adjacency list keyed by
//! branch kind. Names never enter into it.

use crate::types::BranchKind;
use BranchKind::*;

/// Static policy tables for branch creation, commits and merges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RuleTable;

impl RuleTable {
    /// Kinds a branch of `kind` may be created from.
    pub const fn allowed_parents(kind: BranchKind) -> &'static [BranchKind] {
        match kind {
            Develop | Hotfix => &[Master],
            Release => &[Develop],
            Feature => &[Develop, Feature],
            Master => &[],
        }
    }

    /// Kinds that may be merged into a branch of `target` kind.
    pub const fn allowed_merge_sources(target: BranchKind) -> &'static [BranchKind] {
        match target {
            Master => &[Hotfix, Release],
            Develop => &[Feature, Release, Hotfix],
            Feature => &[Feature, Develop],
            Release => &[Develop, Hotfix],
            Hotfix => &[],
        }
    }

    /// Whether direct commits are accepted on a branch of `kind`.
    pub const fn can_commit(kind: BranchKind) -> bool {
        !matches!(kind, Master)
    }

    pub fn can_create(kind: BranchKind, source: BranchKind) -> bool {
        Self::allowed_parents(kind).contains(&source)
    }

    pub fn can_merge(source: BranchKind, target: BranchKind) -> bool {
        Self::allowed_merge_sources(target).contains(&source)
    }

    /// Fixed graph order for non-feature kinds; features take `2 - slot`.
    pub const fn fixed_order(kind: BranchKind) -> Option<i32> {
        match kind {
            Develop => Some(3),
            Release => Some(4),
            Hotfix => Some(5),
            Master => Some(6),
            Feature => None,
        }
    }

    /// Graph order of the feature branch occupying `slot`.
    pub const fn feature_order(slot: usize) -> i32 {
        2 - slot as i32
    }
}
