//! The file lifecycle engine.
//!
//! [`Worktree`] owns the working set, the staging area and the history, and
//! is the only thing allowed to move a file between them. Every operation
//! validates first and mutates after, so a rejected call leaves all three
//! untouched.

use std::collections::BTreeMap;

use flowsim_types::{ChangeEvent, EventKind, FileId, Timestamp};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entry::{FileState, FileView, WorkingFile};
use crate::error::{IndexError, IndexResult};
use crate::history::{History, Version};
use crate::staging::{StagedEntry, StagingArea};
use crate::status::{StatusEntry, WorkdirStatus};

/// Working set, staging area and per-file history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worktree {
    /// Id handed to the next created file.
    next_file_id: FileId,
    /// The working set, keyed by id.
    #[serde(with = "file_list")]
    files: BTreeMap<FileId, WorkingFile>,
    /// Snapshots queued for the next commit.
    staging_area: StagingArea,
    /// Committed version chains.
    repo: History,
    /// Events not yet collected by the caller.
    #[serde(skip)]
    events: Vec<ChangeEvent>,
}

impl Default for Worktree {
    fn default() -> Self {
        Self::new()
    }
}

impl Worktree {
    /// An empty worktree. The first file gets id 1.
    pub fn new() -> Self {
        Self {
            next_file_id: FileId::new(1),
            files: BTreeMap::new(),
            staging_area: StagingArea::new(),
            repo: History::new(),
            events: Vec::new(),
        }
    }

    // ---------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------

    /// Number of files in the working set.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn get(&self, id: FileId) -> Option<&WorkingFile> {
        self.files.get(&id)
    }

    /// Working files in creation order.
    pub fn files(&self) -> impl Iterator<Item = &WorkingFile> {
        self.files.values()
    }

    pub fn staging_area(&self) -> &StagingArea {
        &self.staging_area
    }

    pub fn history(&self) -> &History {
        &self.repo
    }

    pub fn is_staged(&self, id: FileId) -> bool {
        self.staging_area.contains(id)
    }

    /// Staged snapshots in id order.
    pub fn staged_entries(&self) -> impl Iterator<Item = &StagedEntry> {
        self.staging_area.iter()
    }

    /// Flag-carrying view of one file.
    pub fn view(&self, id: FileId) -> Option<FileView> {
        self.files
            .get(&id)
            .map(|f| FileView::new(f, self.is_staged(id)))
    }

    /// Flag-carrying views of the whole working set, in creation order.
    pub fn views(&self) -> Vec<FileView> {
        self.files
            .values()
            .map(|f| FileView::new(f, self.is_staged(f.id)))
            .collect()
    }

    /// Group the working set by lifecycle state.
    pub fn status(&self) -> WorkdirStatus {
        let mut result = WorkdirStatus::new();

        for file in self.files.values() {
            let entry = StatusEntry::new(file.id, &file.name, file.status());
            let staged = self.staging_area.get(file.id);

            if let Some(snapshot) = staged {
                if !file.state.is_deleted() && snapshot.differs_from(file) {
                    result.changed_since_staging.push(file.id);
                }
                result.staged.push(entry.clone());
            }

            match file.state {
                FileState::Untracked => result.untracked.push(entry),
                FileState::Tracked { dirty: true } => result.unstaged_changes.push(entry),
                FileState::Tracked { dirty: false } | FileState::Staged => {}
                FileState::Modified => result.modified.push(entry),
                FileState::Committed => result.committed.push(entry),
                FileState::Deleted => result.deleted.push(entry),
            }
        }

        result
    }

    /// Take the events recorded since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<ChangeEvent> {
        std::mem::take(&mut self.events)
    }

    // ---------------------------------------------------------------
    // Working set operations
    // ---------------------------------------------------------------

    /// Add a new, empty, untracked file.
    pub fn create(&mut self, name: &str) -> IndexResult<FileId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(IndexError::Validation("file name must not be empty".into()));
        }

        let id = self.next_file_id;
        self.next_file_id = id.next();
        self.files.insert(id, WorkingFile::new(id, name));

        debug!(file = %id, name, "created file");
        self.emit(EventKind::FileCreated, id);
        Ok(id)
    }

    /// Put an untracked file under version control.
    pub fn track(&mut self, id: FileId) -> IndexResult<()> {
        let file = self.file_mut(id)?;
        if file.state != FileState::Untracked {
            return Err(Self::refuse(file, "track"));
        }

        file.state = FileState::Tracked { dirty: false };
        debug!(file = %id, "tracked file");
        self.emit(EventKind::FileTracked, id);
        Ok(())
    }

    /// Replace a file's content.
    ///
    /// A staged or committed file becomes modified. A tracked file keeps its
    /// status and is only marked dirty; it counts as modified once staged.
    pub fn edit(&mut self, id: FileId, content: &str) -> IndexResult<()> {
        let file = self.file_mut(id)?;
        let next = file
            .state
            .after_edit()
            .ok_or_else(|| Self::refuse(file, "edit"))?;

        file.content = content.to_string();
        file.state = next;
        debug!(file = %id, status = %next.status(), "edited file");
        self.emit(EventKind::FileEdited, id);
        Ok(())
    }

    /// Snapshot a tracked or modified file into the staging area.
    ///
    /// Staging a soft-deleted file confirms the deletion: the file leaves both
    /// the staging area and the working set.
    pub fn stage(&mut self, id: FileId) -> IndexResult<()> {
        let file = self.files.get(&id).ok_or(IndexError::FileNotFound(id))?;

        if file.state.is_deleted() {
            self.staging_area.remove(id);
            self.files.remove(&id);
            debug!(file = %id, "deletion confirmed by stage");
            self.emit(EventKind::FileRemoved, id);
            return Ok(());
        }
        if !file.state.is_stageable() {
            return Err(Self::refuse(file, "stage"));
        }

        let snapshot = StagedEntry::snapshot(file);
        let replaced = self.staging_area.stage(snapshot);
        if let Some(file) = self.files.get_mut(&id) {
            file.state = FileState::Staged;
        }
        debug!(file = %id, restaged = replaced.is_some(), "staged file");
        self.emit(EventKind::FileStaged, id);
        Ok(())
    }

    /// Take a file's snapshot out of the staging area.
    ///
    /// A soft-deleted file is removed for good; anything else goes back to
    /// tracked with its edits marked as unstaged changes.
    pub fn unstage(&mut self, id: FileId) -> IndexResult<()> {
        if !self.staging_area.contains(id) {
            return Err(if self.files.contains_key(&id) {
                IndexError::NotStaged(id)
            } else {
                IndexError::FileNotFound(id)
            });
        }
        let deleted = self
            .files
            .get(&id)
            .map(|f| f.state.is_deleted())
            .ok_or_else(|| Self::orphaned(id))?;

        self.staging_area.remove(id);
        if deleted {
            self.files.remove(&id);
            debug!(file = %id, "deletion confirmed by unstage");
            self.emit(EventKind::FileRemoved, id);
        } else {
            if let Some(file) = self.files.get_mut(&id) {
                file.state = FileState::Tracked { dirty: true };
            }
            debug!(file = %id, "unstaged file");
            self.emit(EventKind::FileUnstaged, id);
        }
        Ok(())
    }

    /// Delete a file.
    ///
    /// A staged file is only marked deleted and stays visible until the
    /// deletion is confirmed. Anything else is removed immediately.
    pub fn delete(&mut self, id: FileId) -> IndexResult<()> {
        let staged = self.staging_area.contains(id);
        let file = self.file_mut(id)?;
        if file.state.is_deleted() {
            return Err(Self::refuse(file, "delete"));
        }

        if staged {
            file.state = FileState::Deleted;
            debug!(file = %id, "soft-deleted staged file");
            self.emit(EventKind::FileDeleted, id);
        } else {
            self.files.remove(&id);
            debug!(file = %id, "removed file");
            self.emit(EventKind::FileRemoved, id);
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // History operations
    // ---------------------------------------------------------------

    /// Commit the staged snapshots of `ids` under one message.
    ///
    /// Every id must be staged; if any is not, nothing is committed. Each
    /// file gets a new head version holding its staged content and becomes
    /// committed, or stays modified if it was edited after staging. A
    /// soft-deleted file is committed as a removal and leaves the working set.
    /// Returns the committed ids, deduplicated, in call order.
    pub fn commit(&mut self, ids: &[FileId], message: &str) -> IndexResult<Vec<FileId>> {
        if ids.is_empty() {
            return Err(IndexError::Validation("nothing to commit".into()));
        }
        if message.trim().is_empty() {
            return Err(IndexError::Validation(
                "commit message must not be empty".into(),
            ));
        }

        let mut batch: Vec<FileId> = Vec::with_capacity(ids.len());
        for &id in ids {
            if batch.contains(&id) {
                continue;
            }
            if !self.staging_area.contains(id) {
                return Err(if self.files.contains_key(&id) {
                    IndexError::NotStaged(id)
                } else {
                    IndexError::FileNotFound(id)
                });
            }
            if !self.files.contains_key(&id) {
                return Err(Self::orphaned(id));
            }
            batch.push(id);
        }

        let timestamp = Timestamp::after(&self.repo.latest_timestamp());
        for &id in &batch {
            let Some(snapshot) = self.staging_area.remove(id) else {
                continue;
            };
            let removal = self
                .files
                .get(&id)
                .is_some_and(|f| f.state.is_deleted());

            if removal {
                self.files.remove(&id);
                self.repo.record(
                    id,
                    &snapshot.name,
                    Version::removal(snapshot.content, message, timestamp),
                );
                debug!(file = %id, "committed removal");
                self.emit(EventKind::FileCommitted, id);
                self.emit(EventKind::FileRemoved, id);
            } else {
                if let Some(file) = self.files.get_mut(&id) {
                    file.state = if snapshot.differs_from(file) {
                        FileState::Modified
                    } else {
                        FileState::Committed
                    };
                }
                self.repo.record(
                    id,
                    &snapshot.name,
                    Version::new(snapshot.content, message, timestamp),
                );
                debug!(file = %id, "committed file");
                self.emit(EventKind::FileCommitted, id);
            }
        }

        Ok(batch)
    }

    /// Roll a file back to `versions[index]` of its history.
    ///
    /// The working content is replaced and the file becomes modified; if the
    /// file had been removed it comes back as tracked. Every version newer
    /// than `index` is discarded. Rolling back to a removal version removes
    /// the file instead.
    pub fn revert(&mut self, id: FileId, index: usize) -> IndexResult<()> {
        let record = self.repo.get(id).ok_or(IndexError::NoHistory(id))?;
        let target = record
            .version(index)
            .cloned()
            .ok_or(IndexError::VersionNotFound {
                id,
                index,
                len: record.versions.len(),
            })?;
        let name = record.name.clone();

        if target.removal {
            self.staging_area.remove(id);
            if self.files.remove(&id).is_some() {
                self.emit(EventKind::FileRemoved, id);
            }
        } else if let Some(file) = self.files.get_mut(&id) {
            file.content = target.content;
            file.state = FileState::Modified;
            self.emit(EventKind::FileReverted, id);
        } else {
            let mut file = WorkingFile::new(id, name);
            file.content = target.content;
            file.state = FileState::Tracked { dirty: false };
            self.files.insert(id, file);
            self.emit(EventKind::FileRestored, id);
        }

        let dropped = self
            .repo
            .get_mut(id)
            .map(|r| r.rollback_to(index).len())
            .unwrap_or_default();
        debug!(file = %id, index, dropped, "reverted file");
        Ok(())
    }

    // ---------------------------------------------------------------
    // Integrity
    // ---------------------------------------------------------------

    /// Verify the staging and history invariants.
    ///
    /// Holds after every operation; a failure means the worktree was built
    /// from corrupt persisted state.
    pub fn check_invariants(&self) -> IndexResult<()> {
        for entry in self.staging_area.iter() {
            let file = self.files.get(&entry.id).ok_or_else(|| {
                IndexError::Corrupt(format!("staged file {} is not in the working set", entry.id))
            })?;
            if !matches!(
                file.state,
                FileState::Staged | FileState::Modified | FileState::Deleted
            ) {
                return Err(IndexError::Corrupt(format!(
                    "staged file {} is {}",
                    entry.id,
                    file.status()
                )));
            }
        }

        for (key, file) in &self.files {
            if *key != file.id {
                return Err(IndexError::Corrupt(format!(
                    "file {} stored under id {key}",
                    file.id
                )));
            }
            if matches!(file.state, FileState::Staged | FileState::Deleted)
                && !self.staging_area.contains(file.id)
            {
                return Err(IndexError::Corrupt(format!(
                    "file {} is {} but has no staged snapshot",
                    file.id,
                    file.status()
                )));
            }
            if file.id >= self.next_file_id {
                return Err(IndexError::Corrupt(format!(
                    "file id {} is not below the next id {}",
                    file.id, self.next_file_id
                )));
            }
        }

        for record in self.repo.iter() {
            if record.versions.is_empty() {
                return Err(IndexError::Corrupt(format!(
                    "history of file {} has no versions",
                    record.id
                )));
            }
            if record.id >= self.next_file_id {
                return Err(IndexError::Corrupt(format!(
                    "history id {} is not below the next id {}",
                    record.id, self.next_file_id
                )));
            }
        }

        Ok(())
    }

    // ---------------------------------------------------------------
    // Helpers
    // ---------------------------------------------------------------

    fn file_mut(&mut self, id: FileId) -> IndexResult<&mut WorkingFile> {
        self.files.get_mut(&id).ok_or(IndexError::FileNotFound(id))
    }

    fn refuse(file: &WorkingFile, operation: &'static str) -> IndexError {
        IndexError::InvalidTransition {
            id: file.id,
            operation,
            status: file.status(),
        }
    }

    fn orphaned(id: FileId) -> IndexError {
        IndexError::Corrupt(format!("staged file {id} is missing from the working set"))
    }

    fn emit(&mut self, kind: EventKind, id: FileId) {
        self.events.push(ChangeEvent::file(kind, id));
    }
}

/// The working set is persisted as a flat list of files in id order.
mod file_list {
    use std::collections::BTreeMap;

    use flowsim_types::FileId;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::entry::WorkingFile;

    pub fn serialize<S: Serializer>(
        files: &BTreeMap<FileId, WorkingFile>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(files.values())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<FileId, WorkingFile>, D::Error> {
        let list = Vec::<WorkingFile>::deserialize(deserializer)?;
        Ok(list.into_iter().map(|f| (f.id, f)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::FileStatus;
    use flowsim_types::ErrorKind;
    use proptest::prelude::*;

    fn tracked(wt: &mut Worktree, name: &str, content: &str) -> FileId {
        let id = wt.create(name).unwrap();
        wt.track(id).unwrap();
        wt.edit(id, content).unwrap();
        id
    }

    fn staged(wt: &mut Worktree, name: &str, content: &str) -> FileId {
        let id = tracked(wt, name, content);
        wt.stage(id).unwrap();
        id
    }

    fn status_of(wt: &Worktree, id: FileId) -> FileStatus {
        wt.get(id).unwrap().status()
    }

    #[test]
    fn create_assigns_increasing_ids() {
        let mut wt = Worktree::new();
        let a = wt.create("a.txt").unwrap();
        let b = wt.create("b.txt").unwrap();
        assert!(a < b);
        assert_eq!(status_of(&wt, a), FileStatus::Untracked);
        assert_eq!(wt.len(), 2);
    }

    #[test]
    fn create_rejects_blank_name() {
        let mut wt = Worktree::new();
        let err = wt.create("   ").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(wt.is_empty());
    }

    #[test]
    fn removed_ids_are_not_reused() {
        let mut wt = Worktree::new();
        let a = wt.create("a.txt").unwrap();
        wt.delete(a).unwrap();
        let b = wt.create("b.txt").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn track_only_from_untracked() {
        let mut wt = Worktree::new();
        let id = wt.create("a.txt").unwrap();
        wt.track(id).unwrap();
        assert_eq!(status_of(&wt, id), FileStatus::Tracked);

        let err = wt.track(id).unwrap_err();
        assert!(matches!(
            err,
            IndexError::InvalidTransition { operation: "track", status: FileStatus::Tracked, .. }
        ));
    }

    #[test]
    fn track_missing_file_is_not_found() {
        let mut wt = Worktree::new();
        let err = wt.track(FileId::new(99)).unwrap_err();
        assert_eq!(err, IndexError::FileNotFound(FileId::new(99)));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn editing_tracked_file_keeps_status_but_marks_modified() {
        let mut wt = Worktree::new();
        let id = wt.create("a.txt").unwrap();
        wt.track(id).unwrap();
        wt.edit(id, "hello").unwrap();

        let view = wt.view(id).unwrap();
        assert_eq!(view.status, FileStatus::Tracked);
        assert!(view.modified);
        assert_eq!(view.content, "hello");
    }

    #[test]
    fn editing_staged_file_makes_it_modified() {
        let mut wt = Worktree::new();
        let id = staged(&mut wt, "a.txt", "v1");
        wt.edit(id, "v2").unwrap();

        assert_eq!(status_of(&wt, id), FileStatus::Modified);
        assert!(wt.is_staged(id));
        assert_eq!(wt.staging_area().get(id).unwrap().content, "v1");
        assert_eq!(wt.status().changed_since_staging, vec![id]);
    }

    #[test]
    fn editing_untracked_file_keeps_it_untracked() {
        let mut wt = Worktree::new();
        let id = wt.create("a.txt").unwrap();
        wt.edit(id, "draft").unwrap();
        assert_eq!(status_of(&wt, id), FileStatus::Untracked);
    }

    #[test]
    fn stage_untracked_is_rejected() {
        let mut wt = Worktree::new();
        let id = wt.create("a.txt").unwrap();
        let err = wt.stage(id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
        assert!(wt.staging_area().is_empty());
        assert_eq!(status_of(&wt, id), FileStatus::Untracked);
    }

    #[test]
    fn stage_sets_flags_and_snapshot() {
        let mut wt = Worktree::new();
        let id = staged(&mut wt, "a.txt", "hello");

        let view = wt.view(id).unwrap();
        assert_eq!(view.status, FileStatus::Staged);
        assert!(view.staged);
        assert!(!view.modified);
        assert_eq!(wt.staging_area().get(id).unwrap().content, "hello");
        assert_eq!(wt.staged_entries().map(|e| e.id).collect::<Vec<_>>(), vec![id]);
    }

    #[test]
    fn restaging_overwrites_snapshot_without_duplicating() {
        let mut wt = Worktree::new();
        let id = staged(&mut wt, "a.txt", "v1");
        wt.edit(id, "v2").unwrap();
        wt.stage(id).unwrap();

        assert_eq!(wt.staging_area().len(), 1);
        assert_eq!(wt.staging_area().get(id).unwrap().content, "v2");
        assert_eq!(status_of(&wt, id), FileStatus::Staged);
    }

    #[test]
    fn staging_an_already_staged_file_is_rejected() {
        let mut wt = Worktree::new();
        let id = staged(&mut wt, "a.txt", "v1");
        let err = wt.stage(id).unwrap_err();
        assert!(matches!(
            err,
            IndexError::InvalidTransition { status: FileStatus::Staged, .. }
        ));
    }

    #[test]
    fn unstage_returns_file_to_tracked_and_modified() {
        let mut wt = Worktree::new();
        let id = staged(&mut wt, "a.txt", "v1");
        wt.unstage(id).unwrap();

        let view = wt.view(id).unwrap();
        assert_eq!(view.status, FileStatus::Tracked);
        assert!(!view.staged);
        assert!(view.modified);
        assert!(wt.staging_area().is_empty());
    }

    #[test]
    fn unstage_of_unstaged_file_is_rejected() {
        let mut wt = Worktree::new();
        let id = tracked(&mut wt, "a.txt", "v1");
        assert_eq!(wt.unstage(id).unwrap_err(), IndexError::NotStaged(id));
        assert_eq!(
            wt.unstage(FileId::new(42)).unwrap_err(),
            IndexError::FileNotFound(FileId::new(42))
        );
    }

    #[test]
    fn delete_unstaged_file_removes_it() {
        let mut wt = Worktree::new();
        let id = tracked(&mut wt, "a.txt", "v1");
        wt.delete(id).unwrap();
        assert!(wt.get(id).is_none());
    }

    #[test]
    fn delete_staged_file_is_soft_until_unstaged() {
        let mut wt = Worktree::new();
        let id = staged(&mut wt, "a.txt", "v1");
        wt.delete(id).unwrap();

        assert_eq!(status_of(&wt, id), FileStatus::Deleted);
        assert!(wt.is_staged(id));
        assert_eq!(wt.status().deleted.len(), 1);

        wt.unstage(id).unwrap();
        assert!(wt.get(id).is_none());
        assert!(!wt.is_staged(id));
    }

    #[test]
    fn staging_a_deleted_file_confirms_the_deletion() {
        let mut wt = Worktree::new();
        let id = staged(&mut wt, "a.txt", "v1");
        wt.delete(id).unwrap();
        wt.stage(id).unwrap();

        assert!(wt.get(id).is_none());
        assert!(wt.staging_area().is_empty());
    }

    #[test]
    fn deleting_twice_is_rejected() {
        let mut wt = Worktree::new();
        let id = staged(&mut wt, "a.txt", "v1");
        wt.delete(id).unwrap();
        assert_eq!(wt.delete(id).unwrap_err().kind(), ErrorKind::InvalidTransition);
        assert_eq!(wt.edit(id, "x").unwrap_err().kind(), ErrorKind::InvalidTransition);
    }

    #[test]
    fn end_to_end_commit() {
        let mut wt = Worktree::new();
        let id = wt.create("a.txt").unwrap();
        wt.track(id).unwrap();
        wt.edit(id, "hello").unwrap();
        wt.stage(id).unwrap();
        let committed = wt.commit(&[id], "init").unwrap();

        assert_eq!(committed, vec![id]);
        assert_eq!(status_of(&wt, id), FileStatus::Committed);
        assert!(wt.staging_area().is_empty());
        assert!(!wt.is_staged(id));

        assert_eq!(wt.history().len(), 1);
        let record = wt.history().get(id).unwrap();
        assert_eq!(record.versions.len(), 1);
        assert_eq!(record.versions[0].content, "hello");
        assert_eq!(record.versions[0].message, "init");
    }

    #[test]
    fn commit_uses_staged_snapshot_content() {
        let mut wt = Worktree::new();
        let id = staged(&mut wt, "a.txt", "staged");
        wt.edit(id, "working").unwrap();
        wt.commit(&[id], "snap").unwrap();

        assert_eq!(wt.history().get(id).unwrap().versions[0].content, "staged");
        assert_eq!(wt.get(id).unwrap().content, "working");
    }

    #[test]
    fn edit_after_staging_survives_commit() {
        let mut wt = Worktree::new();
        let id = staged(&mut wt, "a.txt", "staged");
        wt.edit(id, "working").unwrap();
        wt.commit(&[id], "snap").unwrap();

        assert_eq!(status_of(&wt, id), FileStatus::Modified);
        assert!(!wt.is_staged(id));
        assert!(wt.check_invariants().is_ok());

        wt.stage(id).unwrap();
        wt.commit(&[id], "again").unwrap();
        assert_eq!(status_of(&wt, id), FileStatus::Committed);
        let record = wt.history().get(id).unwrap();
        assert_eq!(record.versions.len(), 2);
        assert_eq!(record.head().unwrap().content, "working");
    }

    #[test]
    fn commit_is_all_or_nothing() {
        let mut wt = Worktree::new();
        let a = staged(&mut wt, "a.txt", "a");
        let b = tracked(&mut wt, "b.txt", "b");

        let err = wt.commit(&[a, b], "both").unwrap_err();
        assert_eq!(err, IndexError::NotStaged(b));
        assert!(wt.is_staged(a));
        assert_eq!(status_of(&wt, a), FileStatus::Staged);
        assert!(wt.history().is_empty());
    }

    #[test]
    fn commit_validates_arguments() {
        let mut wt = Worktree::new();
        let id = staged(&mut wt, "a.txt", "a");
        assert_eq!(wt.commit(&[], "msg").unwrap_err().kind(), ErrorKind::Validation);
        assert_eq!(wt.commit(&[id], "  ").unwrap_err().kind(), ErrorKind::Validation);
        assert_eq!(
            wt.commit(&[FileId::new(77)], "msg").unwrap_err(),
            IndexError::FileNotFound(FileId::new(77))
        );
        assert!(wt.is_staged(id));
    }

    #[test]
    fn commit_collapses_duplicate_ids() {
        let mut wt = Worktree::new();
        let id = staged(&mut wt, "a.txt", "a");
        let committed = wt.commit(&[id, id], "dup").unwrap();
        assert_eq!(committed, vec![id]);
        assert_eq!(wt.history().get(id).unwrap().versions.len(), 1);
    }

    #[test]
    fn batch_commit_shares_one_timestamp() {
        let mut wt = Worktree::new();
        let a = staged(&mut wt, "a.txt", "a");
        let b = staged(&mut wt, "b.txt", "b");
        wt.commit(&[a, b], "pair").unwrap();

        let ta = wt.history().get(a).unwrap().versions[0].timestamp;
        let tb = wt.history().get(b).unwrap().versions[0].timestamp;
        assert_eq!(ta, tb);
    }

    #[test]
    fn later_commits_have_later_timestamps() {
        let mut wt = Worktree::new();
        let a = staged(&mut wt, "a.txt", "1");
        wt.commit(&[a], "one").unwrap();
        wt.edit(a, "2").unwrap();
        wt.stage(a).unwrap();
        wt.commit(&[a], "two").unwrap();

        let versions = &wt.history().get(a).unwrap().versions;
        assert!(versions[0].timestamp > versions[1].timestamp);
    }

    #[test]
    fn committing_a_deleted_file_records_removal() {
        let mut wt = Worktree::new();
        let id = staged(&mut wt, "a.txt", "bye");
        wt.delete(id).unwrap();
        wt.commit(&[id], "drop").unwrap();

        assert!(wt.get(id).is_none());
        assert!(wt.staging_area().is_empty());
        let head = wt.history().get(id).unwrap().head().unwrap();
        assert!(head.removal);
    }

    #[test]
    fn committed_file_edit_then_restage() {
        let mut wt = Worktree::new();
        let id = staged(&mut wt, "a.txt", "v1");
        wt.commit(&[id], "one").unwrap();
        wt.edit(id, "v2").unwrap();
        assert_eq!(status_of(&wt, id), FileStatus::Modified);
        assert!(!wt.is_staged(id));

        wt.stage(id).unwrap();
        wt.commit(&[id], "two").unwrap();
        assert_eq!(wt.history().get(id).unwrap().versions.len(), 2);
    }

    #[test]
    fn revert_restores_pre_commit_content_and_truncates() {
        let mut wt = Worktree::new();
        let id = staged(&mut wt, "a.txt", "v1");
        wt.commit(&[id], "one").unwrap();
        for content in ["v2", "v3"] {
            wt.edit(id, content).unwrap();
            wt.stage(id).unwrap();
            wt.commit(&[id], content).unwrap();
        }
        assert_eq!(wt.history().get(id).unwrap().versions.len(), 3);

        wt.revert(id, 2).unwrap();

        let file = wt.get(id).unwrap();
        assert_eq!(file.content, "v1");
        assert_eq!(file.status(), FileStatus::Modified);
        let record = wt.history().get(id).unwrap();
        assert_eq!(record.versions.len(), 1);
        assert_eq!(record.head().unwrap().message, "one");
        assert!(record.versions.iter().all(|v| v.content == "v1"));
    }

    #[test]
    fn revert_rematerializes_removed_file() {
        let mut wt = Worktree::new();
        let id = staged(&mut wt, "a.txt", "keep me");
        wt.commit(&[id], "one").unwrap();
        wt.delete(id).unwrap();
        assert!(wt.get(id).is_none());

        wt.revert(id, 0).unwrap();

        let file = wt.get(id).unwrap();
        assert_eq!(file.name, "a.txt");
        assert_eq!(file.content, "keep me");
        assert_eq!(file.status(), FileStatus::Tracked);
        assert!(!wt.view(id).unwrap().modified);
    }

    #[test]
    fn revert_past_removal_restores_file() {
        let mut wt = Worktree::new();
        let id = staged(&mut wt, "a.txt", "v1");
        wt.commit(&[id], "one").unwrap();
        wt.edit(id, "v2").unwrap();
        wt.stage(id).unwrap();
        wt.delete(id).unwrap();
        wt.commit(&[id], "drop").unwrap();

        wt.revert(id, 1).unwrap();
        assert_eq!(wt.get(id).unwrap().content, "v1");

        // history is now just "one"; nothing newer is reachable
        assert_eq!(wt.history().get(id).unwrap().versions.len(), 1);
        assert!(wt.revert(id, 1).is_err());
    }

    #[test]
    fn revert_to_removal_version_keeps_file_removed() {
        let mut wt = Worktree::new();
        let id = staged(&mut wt, "a.txt", "v1");
        wt.commit(&[id], "one").unwrap();
        wt.edit(id, "v2").unwrap();
        wt.stage(id).unwrap();
        wt.delete(id).unwrap();
        wt.commit(&[id], "drop").unwrap();

        wt.revert(id, 0).unwrap();
        assert!(wt.get(id).is_none());
        assert_eq!(wt.history().get(id).unwrap().versions.len(), 2);
        wt.check_invariants().unwrap();
    }

    #[test]
    fn revert_rejections() {
        let mut wt = Worktree::new();
        let id = staged(&mut wt, "a.txt", "v1");
        assert_eq!(wt.revert(id, 0).unwrap_err(), IndexError::NoHistory(id));

        wt.commit(&[id], "one").unwrap();
        let err = wt.revert(id, 5).unwrap_err();
        assert_eq!(err, IndexError::VersionNotFound { id, index: 5, len: 1 });
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(status_of(&wt, id), FileStatus::Committed);
    }

    #[test]
    fn revert_keeps_staged_snapshot_consistent() {
        let mut wt = Worktree::new();
        let id = staged(&mut wt, "a.txt", "v1");
        wt.commit(&[id], "one").unwrap();
        wt.edit(id, "v2").unwrap();
        wt.stage(id).unwrap();

        wt.revert(id, 0).unwrap();
        assert_eq!(status_of(&wt, id), FileStatus::Modified);
        assert!(wt.is_staged(id));
        wt.check_invariants().unwrap();
    }

    #[test]
    fn events_are_recorded_in_order() {
        let mut wt = Worktree::new();
        let id = staged(&mut wt, "a.txt", "v1");
        wt.commit(&[id], "one").unwrap();

        let kinds: Vec<EventKind> = wt.drain_events().into_iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::FileCreated,
                EventKind::FileTracked,
                EventKind::FileEdited,
                EventKind::FileStaged,
                EventKind::FileCommitted,
            ]
        );
        assert!(wt.drain_events().is_empty());
    }

    #[test]
    fn rejected_operations_emit_nothing() {
        let mut wt = Worktree::new();
        let id = wt.create("a.txt").unwrap();
        wt.drain_events();
        assert!(wt.stage(id).is_err());
        assert!(wt.drain_events().is_empty());
    }

    #[test]
    fn status_groups_files() {
        let mut wt = Worktree::new();
        let untracked = wt.create("u.txt").unwrap();
        let dirty = tracked(&mut wt, "d.txt", "x");
        let staged_id = staged(&mut wt, "s.txt", "y");
        let committed = staged(&mut wt, "c.txt", "z");
        wt.commit(&[committed], "c").unwrap();

        let status = wt.status();
        assert_eq!(status.untracked[0].id, untracked);
        assert_eq!(status.unstaged_changes[0].id, dirty);
        assert_eq!(status.staged.len(), 1);
        assert_eq!(status.staged[0].id, staged_id);
        assert_eq!(status.committed[0].id, committed);
        assert!(status.changed_since_staging.is_empty());
        assert!(!status.is_clean());
    }

    #[test]
    fn persisted_layout_roundtrips() {
        let mut wt = Worktree::new();
        let a = staged(&mut wt, "a.txt", "a");
        wt.commit(&[a], "one").unwrap();
        staged(&mut wt, "b.txt", "b");

        let json = serde_json::to_value(&wt).unwrap();
        assert!(json["files"].is_array());
        assert!(json["staging_area"].is_array());
        assert!(json["repo"].is_array());
        assert_eq!(json["next_file_id"], 3);

        let restored: Worktree = serde_json::from_value(json).unwrap();
        restored.check_invariants().unwrap();
        assert_eq!(restored.views(), wt.views());
        assert_eq!(restored.history(), wt.history());
    }

    #[test]
    fn invariant_check_catches_orphaned_snapshot() {
        let mut wt = Worktree::new();
        staged(&mut wt, "a.txt", "a");
        let mut json = serde_json::to_value(&wt).unwrap();
        json["files"] = serde_json::json!([]);

        let broken: Worktree = serde_json::from_value(json).unwrap();
        let err = broken.check_invariants().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Corrupt);
    }

    #[derive(Clone, Debug)]
    enum Op {
        Create,
        Track(u64),
        Edit(u64, u8),
        Stage(u64),
        Unstage(u64),
        Delete(u64),
        Commit(Vec<u64>),
        Revert(u64, usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        let id = 1u64..8;
        prop_oneof![
            Just(Op::Create),
            id.clone().prop_map(Op::Track),
            (id.clone(), any::<u8>()).prop_map(|(i, c)| Op::Edit(i, c)),
            id.clone().prop_map(Op::Stage),
            id.clone().prop_map(Op::Unstage),
            id.clone().prop_map(Op::Delete),
            prop::collection::vec(id.clone(), 1..4).prop_map(Op::Commit),
            (id, 0usize..3).prop_map(|(i, v)| Op::Revert(i, v)),
        ]
    }

    proptest! {
        #[test]
        fn invariants_hold_under_any_operation_sequence(ops in prop::collection::vec(op(), 1..60)) {
            let mut wt = Worktree::new();
            for op in ops {
                let before = wt.clone();
                let result = match op {
                    Op::Create => wt.create("f.txt").map(|_| ()),
                    Op::Track(i) => wt.track(FileId::new(i)),
                    Op::Edit(i, c) => wt.edit(FileId::new(i), &c.to_string()),
                    Op::Stage(i) => wt.stage(FileId::new(i)),
                    Op::Unstage(i) => wt.unstage(FileId::new(i)),
                    Op::Delete(i) => wt.delete(FileId::new(i)),
                    Op::Commit(ids) => {
                        let ids: Vec<FileId> = ids.into_iter().map(FileId::new).collect();
                        wt.commit(&ids, "msg").map(|_| ())
                    }
                    Op::Revert(i, v) => wt.revert(FileId::new(i), v),
                };

                if result.is_err() {
                    let mut after = wt.clone();
                    after.drain_events();
                    let mut expected = before;
                    expected.drain_events();
                    prop_assert_eq!(after, expected);
                }
                prop_assert!(wt.check_invariants().is_ok());

                for view in wt.views() {
                    prop_assert_eq!(view.staged, wt.staging_area().contains(view.id));
                    prop_assert!(!(view.staged && view.status == FileStatus::Committed));
                }
                for id in wt.staging_area().ids() {
                    prop_assert!(wt.get(id).is_some());
                }
            }
        }
    }
}
