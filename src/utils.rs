use std::env;
use std::path::{Component, Path};

use chrono::{DateTime, Datelike, TimeZone, Timelike};
use tracing::debug;

/// Relative path with `/` separators whatever the platform.
pub fn to_slash(rel: &Path) -> String {
    let parts: Vec<_> = rel
        .components()
        .filter_map(|comp| match comp {
            Component::Normal(name) => Some(name.to_string_lossy()),
            _ => None,
        })
        .collect();
    parts.join("/")
}

/// File name of the running binary, if the OS can tell us.
pub fn executable_name() -> Option<String> {
    let exe = match env::current_exe() {
        Ok(p) => p,
        Err(e) => {
            debug!("cannot resolve current executable: {e}");
            return None;
        }
    };
    exe.file_name().map(|n| n.to_string_lossy().into_owned())
}

/// Zip entries store DOS times (1980..=2107, 2s resolution) without a zone;
/// the fields of `ts` are written as given, so callers pick the zone.
/// Out of range values clamp to the format's bounds.
pub fn zip_timestamp<Tz: TimeZone>(ts: DateTime<Tz>) -> zip::DateTime {
    let year = ts.year().clamp(1980, 2107) as u16;
    let (month, day, hour, minute, second) = if ts.year() < 1980 {
        (1, 1, 0, 0, 0)
    } else if ts.year() > 2107 {
        (12, 31, 23, 59, 58)
    } else {
        (
            ts.month() as u8,
            ts.day() as u8,
            ts.hour() as u8,
            ts.minute() as u8,
            ts.second().min(59) as u8,
        )
    };
    match zip::DateTime::from_date_and_time(year, month, day, hour, minute, second) {
        Ok(dt) => dt,
        Err(_) => zip::DateTime::default(),
    }
}
