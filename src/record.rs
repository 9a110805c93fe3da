use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One file observed on disk or read back from a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub name: String,
    /// Containing directory relative to the scan root, always `/`-separated.
    /// Empty for files directly under the root.
    pub relative_path: String,
    pub size: u64,
    #[serde(rename = "isdir", default)]
    pub is_dir: bool,
    pub last_modified: DateTime<Utc>,
}

impl FileRecord {
    /// Identity used to match records across snapshots: `relative_path/name`.
    pub fn key(&self) -> String {
        if self.relative_path.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.relative_path, self.name)
        }
    }

    /// Location of the file on disk under `root`.
    pub fn path_under(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        for part in self.relative_path.split('/').filter(|p| !p.is_empty()) {
            path.push(part);
        }
        path.push(&self.name);
        path
    }
}

/// Ordered set of records captured by one walk (or loaded from one manifest).
/// Serialised as a bare JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    records: Vec<FileRecord>,
}

impl Snapshot {
    pub fn new(records: Vec<FileRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Newest modification time across the snapshot, `None` when empty.
    pub fn latest_modified(&self) -> Option<DateTime<Utc>> {
        self.records.iter().map(|r| r.last_modified).max()
    }
}

impl FromIterator<FileRecord> for Snapshot {
    fn from_iter<I: IntoIterator<Item = FileRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
