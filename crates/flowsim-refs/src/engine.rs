//! The branch rule engine.
//!
//! [`BranchEngine`] owns the branch map, the merge-edge log and the graph
//! description. Each request is checked in full before anything changes; a
//! rejected request is logged at `warn` and leaves all three untouched.

use std::collections::BTreeMap;

use flowsim_types::{ChangeEvent, EventKind};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::RuleConfig;
use crate::error::{RefError, Result};
use crate::graph::GraphDescription;
use crate::names::{infer_kind, validate_label};
use crate::policy::RuleTable;
use crate::types::{Branch, BranchCommit, BranchKind, MergeEdge};

/// Name of the single master branch.
pub const MASTER: &str = "master";

const MASTER_ORDER: i32 = 6;

/// Branches, merge edges and graph text under a fixed git-flow policy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchEngine {
    #[serde(with = "branch_list")]
    branches: BTreeMap<String, Branch>,
    /// Accepted merges, oldest first.
    links: Vec<MergeEdge>,
    graph: GraphDescription,
    #[serde(skip)]
    rules: RuleConfig,
    #[serde(skip)]
    events: Vec<ChangeEvent>,
}

impl Default for BranchEngine {
    fn default() -> Self {
        Self::new(RuleConfig::default())
    }
}

impl BranchEngine {
    /// An engine holding only master, tagged with `rules.initial_tag`.
    pub fn new(rules: RuleConfig) -> Self {
        let mut master = Branch::new(MASTER, BranchKind::Master, MASTER_ORDER);
        master.commits.push(BranchCommit::tag(&rules.initial_tag));
        Self {
            branches: BTreeMap::from([(MASTER.to_string(), master)]),
            links: Vec::new(),
            graph: GraphDescription::new(&rules.initial_tag),
            rules,
            events: Vec::new(),
        }
    }

    /// Replace the limits. Used after restoring persisted state, which does
    /// not carry them.
    pub fn with_rules(mut self, rules: RuleConfig) -> Self {
        self.rules = rules;
        self
    }

    // ---------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------

    pub fn rules(&self) -> &RuleConfig {
        &self.rules
    }

    pub fn branch(&self, name: &str) -> Option<&Branch> {
        self.branches.get(name)
    }

    /// All branches, top of the graph first.
    pub fn branches(&self) -> Vec<&Branch> {
        let mut list: Vec<&Branch> = self.branches.values().collect();
        list.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.name.cmp(&b.name)));
        list
    }

    pub fn merges(&self) -> &[MergeEdge] {
        &self.links
    }

    pub fn graph(&self) -> &GraphDescription {
        &self.graph
    }

    pub fn feature_count(&self) -> usize {
        self.branches
            .values()
            .filter(|b| b.kind == BranchKind::Feature)
            .count()
    }

    /// Take the events recorded since the last call.
    pub fn drain_events(&mut self) -> Vec<ChangeEvent> {
        std::mem::take(&mut self.events)
    }

    // ---------------------------------------------------------------
    // Operations
    // ---------------------------------------------------------------

    /// Create branch `name` off `source`. The kind comes from the name prefix.
    pub fn create_branch(&mut self, name: &str, source: &str) -> Result<()> {
        let result = self.try_create_branch(name, source);
        if let Err(err) = &result {
            warn!(branch = name, source, error = %err, "branch creation rejected");
        }
        result
    }

    fn try_create_branch(&mut self, name: &str, source: &str) -> Result<()> {
        let kind = infer_kind(name)?;
        if self.branches.contains_key(name) {
            return Err(RefError::AlreadyExists { name: name.into() });
        }
        let source_kind = self.require(source)?.kind;
        if !RuleTable::can_create(kind, source_kind) {
            return Err(RefError::CreationDenied {
                name: name.into(),
                kind,
                source_kind,
                allowed: RuleTable::allowed_parents(kind),
            });
        }
        let order = match RuleTable::fixed_order(kind) {
            Some(order) => order,
            None => {
                let slot = self.feature_count();
                if slot >= self.rules.max_feature_branches {
                    return Err(RefError::FeatureLimit {
                        limit: self.rules.max_feature_branches,
                    });
                }
                RuleTable::feature_order(slot)
            }
        };

        self.branches
            .insert(name.to_string(), Branch::new(name, kind, order));
        self.graph.branch(source, name, order);
        debug!(branch = name, source, %kind, order, "created branch");
        self.events
            .push(ChangeEvent::branch(EventKind::BranchCreated, name));
        Ok(())
    }

    /// Record a direct commit on `branch`.
    pub fn commit_code(&mut self, branch: &str, message: &str) -> Result<()> {
        let result = self.try_commit_code(branch, message);
        if let Err(err) = &result {
            warn!(branch, error = %err, "commit rejected");
        }
        result
    }

    fn try_commit_code(&mut self, branch: &str, message: &str) -> Result<()> {
        validate_label(message)?;
        let len = message.chars().count();
        if len > self.rules.max_commit_message_len {
            return Err(RefError::MessageTooLong {
                len,
                max: self.rules.max_commit_message_len,
            });
        }
        let kind = self.require(branch)?.kind;
        if !RuleTable::can_commit(kind) {
            return Err(RefError::CommitDenied {
                branch: branch.into(),
                kind,
            });
        }

        if let Some(target) = self.branches.get_mut(branch) {
            target.commits.push(BranchCommit::message(message));
        }
        self.graph.commit(branch, message);
        debug!(branch, msg = message, "committed code");
        self.events
            .push(ChangeEvent::branch(EventKind::CodeCommitted, branch));
        Ok(())
    }

    /// Merge `source` into `target`. A version given for a master target is
    /// appended to master as a tag.
    pub fn merge_branch(
        &mut self,
        source: &str,
        target: &str,
        version: Option<&str>,
    ) -> Result<()> {
        let result = self.try_merge_branch(source, target, version);
        if let Err(err) = &result {
            warn!(source, target, error = %err, "merge rejected");
        }
        result
    }

    fn try_merge_branch(
        &mut self,
        source: &str,
        target: &str,
        version: Option<&str>,
    ) -> Result<()> {
        let source_kind = self.require(source)?.kind;
        let target_kind = self.require(target)?.kind;
        if source == target {
            return Err(RefError::MergeDenied {
                branch: source.into(),
                target: target.into(),
                reason: "a branch cannot be merged into itself".into(),
            });
        }
        if !RuleTable::can_merge(source_kind, target_kind) {
            return Err(RefError::MergeDenied {
                branch: source.into(),
                target: target.into(),
                reason: format!("{source_kind} branches cannot be merged into {target_kind}"),
            });
        }
        // Only merges into master are tagged; a blank version means no tag.
        let tag = match version {
            Some(version) if target_kind == BranchKind::Master && !version.trim().is_empty() => {
                validate_label(version)?;
                Some(version)
            }
            _ => None,
        };

        if let (Some(tag), Some(master)) = (tag, self.branches.get_mut(target)) {
            master.commits.push(BranchCommit::tag(tag));
        }
        self.links.push(MergeEdge::new(source, target));
        self.graph.merge(source, target, tag);
        debug!(source, target, tag, "merged branch");
        self.events.push(ChangeEvent::merge(source, target));
        Ok(())
    }

    // ---------------------------------------------------------------
    // Integrity
    // ---------------------------------------------------------------

    /// Verify the branch invariants of restored state.
    pub fn check_invariants(&self) -> Result<()> {
        let corrupt = |msg: String| -> Result<()> { Err(RefError::Corrupt(msg)) };

        let masters = self
            .branches
            .values()
            .filter(|b| b.kind == BranchKind::Master)
            .count();
        if masters != 1 || !self.branches.contains_key(MASTER) {
            return corrupt(format!("expected exactly one master branch, found {masters}"));
        }

        for (key, branch) in &self.branches {
            if *key != branch.name {
                return corrupt(format!("branch {} stored under name {key}", branch.name));
            }
            match infer_kind(&branch.name) {
                Ok(kind) if kind == branch.kind => {}
                _ => return corrupt(format!("branch {} has kind {}", branch.name, branch.kind)),
            }
            if let Some(order) = RuleTable::fixed_order(branch.kind) {
                if order != branch.order {
                    return corrupt(format!("branch {} has order {}", branch.name, branch.order));
                }
            }
        }

        let features = self.feature_count();
        if features > self.rules.max_feature_branches {
            return corrupt(format!(
                "{features} feature branches exceed the limit of {}",
                self.rules.max_feature_branches
            ));
        }

        for edge in &self.links {
            if !self.branches.contains_key(&edge.source)
                || !self.branches.contains_key(&edge.target)
            {
                return corrupt(format!(
                    "merge {} -> {} names an unknown branch",
                    edge.source, edge.target
                ));
            }
        }

        if !self.graph.has_header() {
            return corrupt("graph description lost its header".into());
        }
        Ok(())
    }

    fn require(&self, name: &str) -> Result<&Branch> {
        self.branches
            .get(name)
            .ok_or_else(|| RefError::NotFound { name: name.into() })
    }
}

/// Branches are persisted as a list in name order.
mod branch_list {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serializer};

    use crate::types::Branch;

    pub fn serialize<S: Serializer>(
        branches: &BTreeMap<String, Branch>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(branches.values())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<String, Branch>, D::Error> {
        let list = Vec::<Branch>::deserialize(deserializer)?;
        Ok(list.into_iter().map(|b| (b.name.clone(), b)).collect())
    }
}
