use std::{
    fs::{self, File, OpenOptions},
    io::{self, ErrorKind, Write},
    path::{Path, PathBuf},
};

use crate::error::{JourneyError, JourneyResult};
use crate::models::MoodRecord;

const ENABLE_LOGS: bool = true;
use crate::{log_info, log_warn};

/// Writes the record's image to `dir` as `mood-YYYY-MM-DD.png`, named after
/// the UTC day it was drawn. Existing files are never overwritten; a numeric
/// suffix (`-2`, `-3`, ...) is added instead.
pub fn export_record(record: &MoodRecord, dir: &Path) -> JourneyResult<PathBuf> {
    let created = record.created_at_utc().ok_or_else(|| {
        JourneyError::deserialization(format!(
            "record {} has an out-of-range timestamp",
            record.id()
        ))
    })?;
    let stem = format!("mood-{}", created.format("%Y-%m-%d"));

    fs::create_dir_all(dir)?;
    for attempt in 1u32.. {
        let name = if attempt == 1 {
            format!("{stem}.png")
        } else {
            format!("{stem}-{attempt}.png")
        };
        let path = dir.join(name);

        if !create_fresh(&path, |file| file.write_all(record.image()))? {
            continue;
        }

        log_info!("Exported mood record {} to {}", record.id(), path.display());
        return Ok(path);
    }

    Err(JourneyError::Io(io::Error::other(format!(
        "no free export name for {stem}"
    ))))
}

/// Creates `path` and fills it with `write`. Returns `false` without touching
/// anything when the name is already taken. A failed write removes the
/// partial file so the name stays free.
fn create_fresh<F>(path: &Path, write: F) -> io::Result<bool>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::AlreadyExists => return Ok(false),
        Err(err) => return Err(err),
    };

    let written = write(&mut file).and_then(|()| file.flush());
    if let Err(err) = written {
        drop(file);
        if let Err(cleanup) = fs::remove_file(path) {
            log_warn!("Could not remove partial export {}: {cleanup}", path.display());
        }
        return Err(err);
    }
    Ok(true)
}
