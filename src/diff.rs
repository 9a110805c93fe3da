use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use tracing::{debug, info};

use crate::error::FilterError;
use crate::record::{FileRecord, Snapshot};

/// How the changed set is picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Keys present in only one of the two snapshots.
    #[default]
    Compare,
    /// Files modified within `interval` minutes of the newest file.
    Latest,
}

impl FromStr for Mode {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "compare" => Ok(Mode::Compare),
            "latest" => Ok(Mode::Latest),
            other => Err(FilterError::Config(format!("invalid mode: {other}"))),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Compare => f.write_str("compare"),
            Mode::Latest => f.write_str("latest"),
        }
    }
}

/// Without a baseline there is nothing to compare against.
pub fn effective_mode(old: &Snapshot, requested: Mode) -> Mode {
    if old.is_empty() {
        Mode::Latest
    } else {
        requested
    }
}

/// Records that count as new work for this run. Order is unspecified.
pub fn select(new: &Snapshot, old: &Snapshot, mode: Mode, interval: i64) -> Vec<FileRecord> {
    let mode = effective_mode(old, mode);
    let selected = match mode {
        Mode::Latest => select_latest(new, interval),
        Mode::Compare => select_compare(new, old),
    };
    info!("{} mode selected {} of {} files", mode, selected.len(), new.len());
    selected
}

fn select_latest(new: &Snapshot, interval: i64) -> Vec<FileRecord> {
    let Some(latest) = new.latest_modified() else {
        return Vec::new();
    };
    let window = Duration::minutes(interval.min(i64::MAX / 60_000));
    debug!("latest modification at {latest}, window {interval}m");

    new.records()
        .iter()
        .filter(|r| {
            if interval <= 0 {
                r.last_modified == latest
            } else {
                latest - r.last_modified < window
            }
        })
        .cloned()
        .collect()
}

fn select_compare(new: &Snapshot, old: &Snapshot) -> Vec<FileRecord> {
    let old_by_key: HashMap<String, &FileRecord> = old
        .records()
        .iter()
        .filter(|r| !r.is_dir)
        .map(|r| (r.key(), r))
        .collect();
    let new_by_key: HashMap<String, &FileRecord> =
        new.records().iter().map(|r| (r.key(), r)).collect();

    // key -> present on both sides
    let mut visited: HashMap<&str, bool> = HashMap::with_capacity(old_by_key.len() + new_by_key.len());
    for key in old_by_key.keys() {
        visited.insert(key, new_by_key.contains_key(key));
    }
    for key in new_by_key.keys() {
        visited.entry(key).or_insert(false);
    }

    let mut selected = Vec::new();
    for (key, in_both) in visited {
        if in_both {
            continue;
        }
        if let Some(record) = old_by_key.get(key) {
            debug!("removed: {key}");
            selected.push((*record).clone());
        } else if let Some(record) = new_by_key.get(key) {
            debug!("added: {key}");
            selected.push((*record).clone());
        }
    }
    selected
}
