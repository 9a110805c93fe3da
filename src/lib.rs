//
// lib.rs
// depfilter
//
// Library entry that re-exports modules so the binary and the integration tests can reach the walker, diff engine, manifest store and archiver.
//
// Thales Matheus Mendonça Santos - November 2025
//
pub mod archive;
pub mod cli;
pub mod diff;
pub mod error;
pub mod exclude;
pub mod filter;
pub mod logger;
pub mod manifest;
pub mod record;
pub mod scanner;
pub mod utils;

pub use archive::{write_archive, write_archive_file};
pub use cli::{build_options, Args, Options};
pub use diff::{effective_mode, select, Mode};
pub use error::{FilterError, Result};
pub use exclude::{Exclusions, ARCHIVE_FILE, MANIFEST_FILE, STAGED_MANIFEST_FILE};
pub use filter::{run_filter, Counters, Report};
pub use manifest::ManifestStore;
pub use record::{FileRecord, Snapshot};
pub use scanner::scan_dir;
