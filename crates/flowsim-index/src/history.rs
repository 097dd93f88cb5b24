//! Per-file version chains.
//!
//! Each committed file owns a [`RepoFile`] whose versions are kept
//! newest-first: index 0 is always the latest commit. Reverting to index `i`
//! discards indices `0..i`, so nothing newer than the restored version stays
//! reachable.

use std::collections::BTreeMap;

use flowsim_types::{ContentId, FileId, Timestamp};
use serde::{Deserialize, Serialize};

/// One committed version of a file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    /// Content recorded by the commit.
    pub content: String,
    /// Digest of `content`.
    pub content_id: ContentId,
    /// Commit message.
    pub message: String,
    /// When the commit was recorded.
    pub timestamp: Timestamp,
    /// `true` if this commit finalized the file's deletion.
    #[serde(default)]
    pub removal: bool,
}

impl Version {
    pub fn new(
        content: impl Into<String>,
        message: impl Into<String>,
        timestamp: Timestamp,
    ) -> Self {
        let content = content.into();
        Self {
            content_id: ContentId::of(&content),
            content,
            message: message.into(),
            timestamp,
            removal: false,
        }
    }

    /// A version recording that the file was deleted.
    pub fn removal(
        content: impl Into<String>,
        message: impl Into<String>,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            removal: true,
            ..Self::new(content, message, timestamp)
        }
    }
}

/// History of a single file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoFile {
    pub id: FileId,
    /// Name recorded on first commit.
    pub name: String,
    /// Versions, newest first. Never empty once the record exists.
    pub versions: Vec<Version>,
}

impl RepoFile {
    pub fn new(id: FileId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            versions: Vec::new(),
        }
    }

    /// The most recent version.
    pub fn head(&self) -> Option<&Version> {
        self.versions.first()
    }

    pub fn version(&self, index: usize) -> Option<&Version> {
        self.versions.get(index)
    }

    /// Prepend a version.
    pub fn record(&mut self, version: Version) {
        self.versions.insert(0, version);
    }

    /// Drop every version newer than `index`, returning them newest-first.
    ///
    /// Afterwards `versions[0]` is the version previously at `index`.
    pub fn rollback_to(&mut self, index: usize) -> Vec<Version> {
        let keep_from = index.min(self.versions.len());
        self.versions.drain(..keep_from).collect()
    }
}

/// A flattened history line for log displays.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: FileId,
    pub name: String,
    /// Position of this version in the file's chain (0 = newest).
    pub index: usize,
    pub message: String,
    pub timestamp: Timestamp,
    pub content_id: ContentId,
    pub removal: bool,
}

/// All version chains, keyed by file id.
///
/// Persisted as a flat list of [`RepoFile`] records.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<RepoFile>", into = "Vec<RepoFile>")]
pub struct History {
    files: BTreeMap<FileId, RepoFile>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of files with at least one commit.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn get(&self, id: FileId) -> Option<&RepoFile> {
        self.files.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: FileId) -> Option<&mut RepoFile> {
        self.files.get_mut(&id)
    }

    /// Record `version` for `id`, creating the file's chain on first commit.
    pub fn record(&mut self, id: FileId, name: &str, version: Version) {
        self.files
            .entry(id)
            .or_insert_with(|| RepoFile::new(id, name))
            .record(version);
    }

    pub fn iter(&self) -> impl Iterator<Item = &RepoFile> {
        self.files.values()
    }

    /// Timestamp of the newest version across all files.
    pub fn latest_timestamp(&self) -> Timestamp {
        self.files
            .values()
            .filter_map(|f| f.head().map(|v| v.timestamp))
            .max()
            .unwrap_or_default()
    }

    /// Every version of every file, newest first.
    ///
    /// Versions committed together share a timestamp and are listed in file
    /// id order.
    pub fn log(&self) -> Vec<LogEntry> {
        let mut entries: Vec<LogEntry> = self
            .files
            .values()
            .flat_map(|file| {
                file.versions.iter().enumerate().map(|(index, v)| LogEntry {
                    id: file.id,
                    name: file.name.clone(),
                    index,
                    message: v.message.clone(),
                    timestamp: v.timestamp,
                    content_id: v.content_id,
                    removal: v.removal,
                })
            })
            .collect();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(a.id.cmp(&b.id)));
        entries
    }
}

impl From<Vec<RepoFile>> for History {
    fn from(list: Vec<RepoFile>) -> Self {
        Self {
            files: list.into_iter().map(|f| (f.id, f)).collect(),
        }
    }
}

impl From<History> for Vec<RepoFile> {
    fn from(history: History) -> Self {
        history.files.into_values().collect()
    }
}
