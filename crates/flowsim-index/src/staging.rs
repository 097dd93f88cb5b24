//! The staging area: snapshots queued for the next commit.
//!
//! The [`StagingArea`] keeps one [`StagedEntry`] per file id in a
//! `BTreeMap`. Re-staging a file replaces its snapshot in place, so the area
//! never holds two entries for the same id.

use std::collections::BTreeMap;

use flowsim_types::{ContentId, FileId, Timestamp};
use serde::{Deserialize, Serialize};

use crate::entry::WorkingFile;

/// Snapshot of a file taken when it was staged.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedEntry {
    /// Id shared with the working file.
    pub id: FileId,
    /// Name at staging time.
    pub name: String,
    /// Content at staging time.
    pub content: String,
    /// Digest of `content`.
    pub content_id: ContentId,
    /// When the snapshot was taken.
    pub staged_at: Timestamp,
}

impl StagedEntry {
    /// Snapshot the given file now.
    pub fn snapshot(file: &WorkingFile) -> Self {
        Self {
            id: file.id,
            name: file.name.clone(),
            content: file.content.clone(),
            content_id: file.content_id(),
            staged_at: Timestamp::now(),
        }
    }

    /// Returns `true` if the working file no longer matches this snapshot.
    pub fn differs_from(&self, file: &WorkingFile) -> bool {
        self.content_id != file.content_id()
    }
}

/// Keyed set of staged snapshots.
///
/// Persisted as a flat list of entries in id order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<StagedEntry>", into = "Vec<StagedEntry>")]
pub struct StagingArea {
    entries: BTreeMap<FileId, StagedEntry>,
}

impl StagingArea {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of staged snapshots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: FileId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn get(&self, id: FileId) -> Option<&StagedEntry> {
        self.entries.get(&id)
    }

    /// Insert or overwrite the snapshot for `entry.id`.
    ///
    /// Returns the snapshot that was replaced, if any.
    pub fn stage(&mut self, entry: StagedEntry) -> Option<StagedEntry> {
        self.entries.insert(entry.id, entry)
    }

    /// Drop the snapshot for `id`.
    pub fn remove(&mut self, id: FileId) -> Option<StagedEntry> {
        self.entries.remove(&id)
    }

    /// Staged ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = FileId> + '_ {
        self.entries.keys().copied()
    }

    /// Staged snapshots in id order.
    pub fn iter(&self) -> impl Iterator<Item = &StagedEntry> {
        self.entries.values()
    }
}

impl From<Vec<StagedEntry>> for StagingArea {
    fn from(list: Vec<StagedEntry>) -> Self {
        Self {
            entries: list.into_iter().map(|e| (e.id, e)).collect(),
        }
    }
}

impl From<StagingArea> for Vec<StagedEntry> {
    fn from(area: StagingArea) -> Self {
        area.entries.into_values().collect()
    }
}
