//! Persisted baseline between runs.
//!
//! The canonical manifest is only ever replaced by renaming the staged copy
//! over it, so an interrupted run leaves the previous baseline loadable.

use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::exclude::{MANIFEST_FILE, STAGED_MANIFEST_FILE};
use crate::record::Snapshot;

#[derive(Debug, Clone)]
pub struct ManifestStore {
    root: PathBuf,
}

impl ManifestStore {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    pub fn staged_path(&self) -> PathBuf {
        self.root.join(STAGED_MANIFEST_FILE)
    }

    /// Previous run's snapshot. Absent, unreadable or corrupt manifests all
    /// yield an empty snapshot: the run is treated as the first one.
    pub fn load(&self) -> Snapshot {
        let path = self.manifest_path();
        let bytes = match fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("no {MANIFEST_FILE} found in {:?}", self.root);
                return Snapshot::default();
            }
            Err(e) => {
                warn!("failed to read {:?}: {e}", path);
                return Snapshot::default();
            }
        };
        match serde_json::from_slice::<Snapshot>(&bytes) {
            Ok(snapshot) => {
                debug!("loaded {} records from {:?}", snapshot.len(), path);
                snapshot
            }
            Err(e) => {
                warn!("failed to parse {:?}: {e}", path);
                Snapshot::default()
            }
        }
    }

    /// Writes `snapshot` to the staged path, replacing any leftover from an
    /// interrupted run. The canonical manifest is untouched.
    pub fn stage(&self, snapshot: &Snapshot) -> Result<()> {
        let path = self.staged_path();
        let file = File::create(&path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, snapshot)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        debug!("staged {} records at {:?}", snapshot.len(), path);
        Ok(())
    }

    /// Atomically replaces the canonical manifest with the staged one.
    pub fn promote(&self) -> Result<()> {
        let staged = self.staged_path();
        let canonical = self.manifest_path();
        fs::rename(&staged, &canonical)?;
        info!("baseline saved to {:?}", canonical);
        Ok(())
    }
}
