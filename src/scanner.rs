use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::exclude::Exclusions;
use crate::record::{FileRecord, Snapshot};
use crate::utils::to_slash;

fn to_record(entry: &DirEntry, rel: &Path) -> Option<FileRecord> {
    let meta = match entry.metadata() {
        Ok(m) => m,
        Err(e) => {
            warn!("failed to get info for {:?}: {e}", rel);
            return None;
        }
    };
    let last_modified: DateTime<Utc> = match meta.modified() {
        Ok(t) => t.into(),
        Err(e) => {
            warn!("no modification time for {:?}: {e}", rel);
            return None;
        }
    };
    let relative_path = rel.parent().map(to_slash).unwrap_or_default();

    Some(FileRecord {
        name: entry.file_name().to_string_lossy().into_owned(),
        relative_path,
        size: meta.len(),
        is_dir: false,
        last_modified,
    })
}

/// Walks `root` and records every regular file not covered by `exclusions`.
///
/// Directories are descended into but never recorded. Unreadable entries are
/// logged and skipped together with their subtree; the walk itself never fails.
pub fn scan_dir(root: &Path, exclusions: &Exclusions) -> Snapshot {
    let walker = WalkDir::new(root).follow_links(false).sort_by_file_name().into_iter();

    let records: Vec<FileRecord> = walker
        .filter_entry(|e| match e.path().strip_prefix(root) {
            Ok(rel) if rel == Path::new("") => true,
            Ok(rel) => !exclusions.is_excluded(rel),
            Err(_) => true,
        })
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
                warn!("failed to walk {:?}: {e}", path);
                None
            }
        })
        .filter(|entry| {
            let ft = entry.file_type();
            if ft.is_symlink() {
                debug!("skipping symlink {:?}", entry.path());
            }
            ft.is_file()
        })
        .filter_map(|entry| {
            let rel = entry.path().strip_prefix(root).ok()?.to_path_buf();
            to_record(&entry, &rel)
        })
        .collect();

    debug!("scanned {} files under {:?}", records.len(), root);
    Snapshot::new(records)
}
