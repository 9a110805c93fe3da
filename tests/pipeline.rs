use std::collections::HashSet;
use std::fs;
use std::io::Read;
use std::path::Path;

use depfilter::{
    run_filter, scan_dir, select, Exclusions, FilterError, ManifestStore, Mode, Options,
    ARCHIVE_FILE, MANIFEST_FILE, STAGED_MANIFEST_FILE,
};
use filetime::{set_file_mtime, FileTime};
use tempfile::TempDir;

fn options(root: &Path, mode: Mode, interval: i64) -> Options {
    Options {
        root: root.to_path_buf(),
        mode,
        interval,
        archive_path: root.join(ARCHIVE_FILE),
        exclude_patterns: Vec::new(),
        dry_run: false,
    }
}

fn write(root: &Path, rel: &str, bytes: &[u8]) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, bytes).unwrap();
}

fn seed_repository(root: &Path) {
    write(root, "junit/junit/4.13.2/junit-4.13.2.jar", b"junit jar bytes");
    write(root, "junit/junit/4.13.2/junit-4.13.2.pom", b"<project>junit</project>");
    write(root, "org/hamcrest/hamcrest-core/1.3/hamcrest-core-1.3.jar", b"hamcrest");
}

fn entry_names(archive: &Path) -> HashSet<String> {
    let file = fs::File::open(archive).unwrap();
    let mut zip = zip::ZipArchive::new(file).unwrap();
    (0..zip.len())
        .map(|i| zip.by_index(i).unwrap().name().to_string())
        .collect()
}

#[test]
fn first_run_archives_everything_then_second_run_is_empty() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    seed_repository(root);

    let first = run_filter(&options(root, Mode::Compare, 1)).unwrap();
    assert_eq!(first.mode, Mode::Latest);
    assert_eq!(first.counters.selected, 3);
    assert_eq!(first.counters.archived, 3);
    assert!(root.join(MANIFEST_FILE).exists());
    assert!(!root.join(STAGED_MANIFEST_FILE).exists());
    assert_eq!(
        entry_names(&root.join(ARCHIVE_FILE)),
        HashSet::from([
            "junit/junit/4.13.2/junit-4.13.2.jar".to_string(),
            "junit/junit/4.13.2/junit-4.13.2.pom".to_string(),
            "org/hamcrest/hamcrest-core/1.3/hamcrest-core-1.3.jar".to_string(),
        ])
    );

    let second = run_filter(&options(root, Mode::Compare, 1)).unwrap();
    assert_eq!(second.mode, Mode::Compare);
    assert_eq!(second.counters.scanned, 3);
    assert_eq!(second.counters.selected, 0);
    assert!(second.archive.is_none());
    assert!(!root.join(ARCHIVE_FILE).exists());
}

#[test]
fn new_dependency_is_the_only_archived_entry() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    seed_repository(root);
    run_filter(&options(root, Mode::Compare, 1)).unwrap();

    let payload: Vec<u8> = (0..=255u8).cycle().take(70_000).collect();
    write(root, "com/google/guava/guava/33.0/guava-33.0.jar", &payload);

    let report = run_filter(&options(root, Mode::Compare, 1)).unwrap();
    assert_eq!(report.counters.added, 1);
    assert_eq!(report.counters.removed, 0);

    let file = fs::File::open(root.join(ARCHIVE_FILE)).unwrap();
    let mut zip = zip::ZipArchive::new(file).unwrap();
    assert_eq!(zip.len(), 1);
    let mut entry = zip.by_name("com/google/guava/guava/33.0/guava-33.0.jar").unwrap();
    let mut bytes = Vec::new();
    entry.read_to_end(&mut bytes).unwrap();
    assert_eq!(bytes, payload);
}

#[test]
fn deleted_dependency_aborts_archive_but_baseline_moves_on() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    seed_repository(root);
    run_filter(&options(root, Mode::Compare, 1)).unwrap();
    fs::remove_file(root.join(ARCHIVE_FILE)).unwrap();

    fs::remove_file(root.join("org/hamcrest/hamcrest-core/1.3/hamcrest-core-1.3.jar")).unwrap();
    let err = run_filter(&options(root, Mode::Compare, 1)).unwrap_err();
    assert!(matches!(err, FilterError::MissingFile { .. }));
    assert!(!root.join(ARCHIVE_FILE).exists());

    let baseline = ManifestStore::new(root).load();
    assert_eq!(baseline.len(), 2);

    let after = run_filter(&options(root, Mode::Compare, 1)).unwrap();
    assert_eq!(after.counters.selected, 0);
}

#[test]
fn interrupted_run_keeps_previous_baseline() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    seed_repository(root);
    run_filter(&options(root, Mode::Compare, 1)).unwrap();
    let store = ManifestStore::new(root);
    let baseline = store.load();

    // walk + stage happened, the process died before promotion
    write(root, "org/new/lib/1.0/lib-1.0.jar", b"lib");
    let opts = options(root, Mode::Compare, 1);
    let observed = scan_dir(root, &depfilter::filter::exclusions_for(&opts));
    store.stage(&observed).unwrap();
    assert!(root.join(STAGED_MANIFEST_FILE).exists());

    assert_eq!(store.load(), baseline);

    let rerun = run_filter(&opts).unwrap();
    assert_eq!(rerun.counters.previous, 3);
    assert_eq!(rerun.counters.added, 1);
    assert_eq!(store.load().len(), 4);
}

#[test]
fn bookkeeping_files_never_enter_a_snapshot() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    seed_repository(root);
    for name in [MANIFEST_FILE, STAGED_MANIFEST_FILE, ARCHIVE_FILE, "depfilter"] {
        write(root, name, b"noise");
    }

    let snapshot = scan_dir(root, &Exclusions::reserved(ARCHIVE_FILE, Some("depfilter")));
    let names: HashSet<_> = snapshot.records().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(snapshot.len(), 3);
    for name in [MANIFEST_FILE, STAGED_MANIFEST_FILE, ARCHIVE_FILE, "depfilter"] {
        assert!(!names.contains(name));
    }
}

#[test]
fn latest_mode_picks_the_most_recent_burst() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    seed_repository(root);
    let base = 1_700_000_000;
    set_file_mtime(
        root.join("junit/junit/4.13.2/junit-4.13.2.jar"),
        FileTime::from_unix_time(base, 0),
    )
    .unwrap();
    set_file_mtime(
        root.join("junit/junit/4.13.2/junit-4.13.2.pom"),
        FileTime::from_unix_time(base - 30, 0),
    )
    .unwrap();
    set_file_mtime(
        root.join("org/hamcrest/hamcrest-core/1.3/hamcrest-core-1.3.jar"),
        FileTime::from_unix_time(base - 120, 0),
    )
    .unwrap();

    let snapshot = scan_dir(root, &Exclusions::new());
    let keys: HashSet<_> = select(&snapshot, &snapshot, Mode::Latest, 1)
        .iter()
        .map(|r| r.key())
        .collect();
    assert_eq!(
        keys,
        HashSet::from([
            "junit/junit/4.13.2/junit-4.13.2.jar".to_string(),
            "junit/junit/4.13.2/junit-4.13.2.pom".to_string(),
        ])
    );
}

#[test]
fn corrupt_manifest_is_treated_as_first_run() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    seed_repository(root);
    fs::write(root.join(MANIFEST_FILE), b"[{\"name\": 42").unwrap();

    let report = run_filter(&options(root, Mode::Compare, 60)).unwrap();
    assert_eq!(report.mode, Mode::Latest);
    assert_eq!(report.counters.previous, 0);
    assert_eq!(report.counters.selected, 3);
    assert_eq!(ManifestStore::new(root).load().len(), 3);
}
