use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::archive::write_archive_file;
use crate::cli::Options;
use crate::diff::{effective_mode, select, Mode};
use crate::error::Result;
use crate::exclude::{Exclusions, ARCHIVE_FILE};
use crate::manifest::ManifestStore;
use crate::record::{FileRecord, Snapshot};
use crate::scanner::scan_dir;
use crate::utils::executable_name;

#[derive(Default, Debug)]
pub struct Counters {
    pub scanned: usize,
    pub previous: usize,
    pub selected: usize,
    pub added: usize,
    pub removed: usize,
    pub archived: usize,
}

/// Outcome of one run.
#[derive(Debug)]
pub struct Report {
    pub mode: Mode,
    pub counters: Counters,
    pub selected: Vec<FileRecord>,
    /// `None` when nothing was selected or on a dry run.
    pub archive: Option<PathBuf>,
}

pub fn exclusions_for(opts: &Options) -> Exclusions {
    let archive_name = opts
        .archive_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| ARCHIVE_FILE.to_string());
    Exclusions::reserved(&archive_name, executable_name().as_deref())
        .with_name(ARCHIVE_FILE)
        .with_patterns(opts.exclude_patterns.iter().cloned())
}

fn count(selected: &[FileRecord], new: &Snapshot, mode: Mode) -> (usize, usize) {
    if mode == Mode::Latest {
        return (selected.len(), 0);
    }
    let current: HashSet<String> = new.records().iter().map(FileRecord::key).collect();
    let added = selected.iter().filter(|r| current.contains(&r.key())).count();
    (added, selected.len() - added)
}

/// Walk, stage, diff, archive, then promote the staged manifest.
///
/// The staged manifest is promoted even when archiving fails so the next run
/// compares against what was observed now; the archive error is returned
/// afterwards.
pub fn run_filter(opts: &Options) -> Result<Report> {
    let root: &Path = &opts.root;
    let store = ManifestStore::new(root);
    let exclusions = exclusions_for(opts);

    let new = scan_dir(root, &exclusions);
    if !opts.dry_run {
        store.stage(&new)?;
    }
    let old = store.load();

    let mode = effective_mode(&old, opts.mode);
    if mode != opts.mode {
        info!("no previous manifest, falling back to {mode} mode");
    }
    let selected = select(&new, &old, mode, opts.interval);
    let (added, removed) = count(&selected, &new, mode);

    let mut counters = Counters {
        scanned: new.len(),
        previous: old.len(),
        selected: selected.len(),
        added,
        removed,
        archived: 0,
    };

    if opts.dry_run {
        return Ok(Report {
            mode,
            counters,
            selected,
            archive: None,
        });
    }

    let archived = write_archive_file(root, &selected, &opts.archive_path);
    store.promote()?;

    let archived = match archived {
        Ok(n) => n,
        Err(e) => {
            error!("archive aborted: {e}");
            return Err(e);
        }
    };
    counters.archived = archived;

    Ok(Report {
        mode,
        counters,
        archive: (archived > 0).then(|| opts.archive_path.clone()),
        selected,
    })
}
