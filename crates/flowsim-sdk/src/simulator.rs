//! The simulator facade.

use flowsim_index::{FileView, History, IndexError, LogEntry, RepoFile, WorkdirStatus, Worktree};
use flowsim_refs::{Branch, BranchEngine, GraphDescription, MergeEdge};
use flowsim_types::{ChangeEvent, FileId};
use tracing::{debug, info};

use crate::config::SimConfig;
use crate::error::SdkResult;
use crate::snapshot::Snapshot;

/// Owns the file lifecycle engine, the branch rule engine and the events
/// they emit.
///
/// Every command forwards to one engine and then collects that engine's
/// events, so [`Simulator::drain_events`] yields them in acceptance order.
#[derive(Clone, Debug)]
pub struct Simulator {
    config: SimConfig,
    worktree: Worktree,
    branches: BranchEngine,
    events: Vec<ChangeEvent>,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

impl Simulator {
    /// A fresh simulation: an empty working set and a tagged master branch.
    pub fn new(config: SimConfig) -> Self {
        Self {
            worktree: Worktree::new(),
            branches: BranchEngine::new(config.rules.clone()),
            config,
            events: Vec::new(),
        }
    }

    /// Resume from `config.state_file`, or start fresh if it does not exist.
    pub fn open(config: SimConfig) -> SdkResult<Self> {
        if !config.state_file.exists() {
            debug!(path = %config.state_file.display(), "no saved state, starting fresh");
            return Ok(Self::new(config));
        }
        let snapshot = Snapshot::load(&config.state_file)?;
        Self::restore(snapshot, config)
    }

    /// Write the current state to `config.state_file`.
    pub fn save(&self) -> SdkResult<()> {
        self.snapshot().save(&self.config.state_file)
    }

    pub fn snapshot(&self) -> Snapshot {
        let mut snapshot = Snapshot {
            worktree: self.worktree.clone(),
            branches: self.branches.clone(),
        };
        snapshot.worktree.drain_events();
        snapshot.branches.drain_events();
        snapshot
    }

    /// Rebuild a simulator from persisted state, rejecting state that breaks
    /// either engine's invariants.
    pub fn restore(snapshot: Snapshot, config: SimConfig) -> SdkResult<Self> {
        let Snapshot { worktree, branches } = snapshot;
        let branches = branches.with_rules(config.rules.clone());
        worktree.check_invariants()?;
        branches.check_invariants()?;
        info!(
            files = worktree.len(),
            branches = branches.branches().len(),
            "restored simulation state"
        );
        Ok(Self {
            config,
            worktree,
            branches,
            events: Vec::new(),
        })
    }

    // ---- Queries ----

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn worktree(&self) -> &Worktree {
        &self.worktree
    }

    pub fn branch_engine(&self) -> &BranchEngine {
        &self.branches
    }

    pub fn file(&self, id: FileId) -> Option<FileView> {
        self.worktree.view(id)
    }

    pub fn files(&self) -> Vec<FileView> {
        self.worktree.views()
    }

    pub fn status(&self) -> WorkdirStatus {
        self.worktree.status()
    }

    pub fn repo(&self) -> &History {
        self.worktree.history()
    }

    pub fn history(&self, id: FileId) -> SdkResult<&RepoFile> {
        Ok(self
            .worktree
            .history()
            .get(id)
            .ok_or(IndexError::NoHistory(id))?)
    }

    pub fn log(&self) -> Vec<LogEntry> {
        self.worktree.history().log()
    }

    pub fn branch(&self, name: &str) -> Option<&Branch> {
        self.branches.branch(name)
    }

    pub fn branches(&self) -> Vec<&Branch> {
        self.branches.branches()
    }

    pub fn merges(&self) -> &[MergeEdge] {
        self.branches.merges()
    }

    pub fn graph(&self) -> &GraphDescription {
        self.branches.graph()
    }

    /// Take every event recorded since the last call, oldest first.
    pub fn drain_events(&mut self) -> Vec<ChangeEvent> {
        std::mem::take(&mut self.events)
    }

    // ---- File commands ----

    pub fn create_file(&mut self, name: &str) -> SdkResult<FileId> {
        let id = self.worktree.create(name);
        self.collect();
        Ok(id?)
    }

    pub fn track_file(&mut self, id: FileId) -> SdkResult<()> {
        let result = self.worktree.track(id);
        self.collect();
        Ok(result?)
    }

    pub fn edit_file(&mut self, id: FileId, content: &str) -> SdkResult<()> {
        let result = self.worktree.edit(id, content);
        self.collect();
        Ok(result?)
    }

    pub fn stage_file(&mut self, id: FileId) -> SdkResult<()> {
        let result = self.worktree.stage(id);
        self.collect();
        Ok(result?)
    }

    pub fn unstage_file(&mut self, id: FileId) -> SdkResult<()> {
        let result = self.worktree.unstage(id);
        self.collect();
        Ok(result?)
    }

    pub fn delete_file(&mut self, id: FileId) -> SdkResult<()> {
        let result = self.worktree.delete(id);
        self.collect();
        Ok(result?)
    }

    /// Commit the staged snapshots of `ids`. Returns the committed ids.
    pub fn commit_files(&mut self, ids: &[FileId], message: &str) -> SdkResult<Vec<FileId>> {
        let result = self.worktree.commit(ids, message);
        self.collect();
        Ok(result?)
    }

    /// Roll file `id` back to `versions[index]` of its history.
    pub fn revert_file(&mut self, id: FileId, index: usize) -> SdkResult<()> {
        let result = self.worktree.revert(id, index);
        self.collect();
        Ok(result?)
    }

    // ---- Branch commands ----

    pub fn create_branch(&mut self, name: &str, source: &str) -> SdkResult<()> {
        let result = self.branches.create_branch(name, source);
        self.collect();
        Ok(result?)
    }

    pub fn commit_code(&mut self, branch: &str, message: &str) -> SdkResult<()> {
        let result = self.branches.commit_code(branch, message);
        self.collect();
        Ok(result?)
    }

    pub fn merge_branch(
        &mut self,
        source: &str,
        target: &str,
        version: Option<&str>,
    ) -> SdkResult<()> {
        let result = self.branches.merge_branch(source, target, version);
        self.collect();
        Ok(result?)
    }

    fn collect(&mut self) {
        self.events.extend(self.worktree.drain_events());
        self.events.extend(self.branches.drain_events());
    }
}
