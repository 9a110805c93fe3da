use std::fs::File;
use std::io::{self, Seek, Write};
use std::path::Path;

use chrono::Local;
use tracing::{debug, info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{FilterError, Result};
use crate::record::FileRecord;
use crate::utils::zip_timestamp;

/// Deflates every selected file under `root` into `destination`.
///
/// Entry names are the record keys (`relative_path/name`) and entry times
/// the recorded modification times in local time, which is how unzip tools
/// read DOS times. A file that cannot be opened aborts the whole archive.
/// Returns the number of entries written; an empty selection writes nothing.
pub fn write_archive<W: Write + Seek>(
    root: &Path,
    selected: &[FileRecord],
    destination: W,
) -> Result<usize> {
    if selected.is_empty() {
        return Ok(0);
    }

    let mut zip = ZipWriter::new(destination);
    for record in selected {
        let path = record.path_under(root);
        let mut source = File::open(&path).map_err(|source| {
            warn!("error opening file: {:?}", path);
            FilterError::MissingFile {
                path: path.clone(),
                source,
            }
        })?;

        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(zip_timestamp(record.last_modified.with_timezone(&Local)))
            .large_file(record.size >= u32::MAX as u64);
        zip.start_file(record.key(), options)?;
        let copied = io::copy(&mut source, &mut zip)?;
        debug!("archived {} ({copied} bytes)", record.key());
    }
    zip.finish()?;

    Ok(selected.len())
}

/// Writes the archive to a file at `path`, removing the partial file if the
/// archive step aborts. With nothing selected, an archive left at `path` by
/// an earlier run is removed so it is not mistaken for this run's output.
pub fn write_archive_file(root: &Path, selected: &[FileRecord], path: &Path) -> Result<usize> {
    if selected.is_empty() {
        match std::fs::remove_file(path) {
            Ok(()) => info!("nothing selected, removed stale archive {:?}", path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        return Ok(0);
    }
    let file = File::create(path)?;
    match write_archive(root, selected, file) {
        Ok(n) => Ok(n),
        Err(e) => {
            if let Err(rm) = std::fs::remove_file(path) {
                warn!("failed to remove incomplete archive {:?}: {rm}", path);
            }
            Err(e)
        }
    }
}
