//! Locked append of a single line

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use super::lock::ExclusiveLock;
use crate::error::{Error, Result};

/// Append `line` to `path` in one write while holding an exclusive lock
///
/// The file is created if it does not exist. If the write fails partway, the
/// file is cut back to its length before the call so no torn line remains.
pub fn append_line(path: &Path, line: &[u8]) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| Error::write("open", path, e))?;

    let _guard = ExclusiveLock::acquire(&file).map_err(|e| Error::write("lock", path, e))?;

    let start = file
        .metadata()
        .map_err(|e| Error::write("inspect", path, e))?
        .len();

    // The guard borrows the file, so write through a shared handle.
    let mut handle = &file;
    write_or_rollback(path, &file, &mut handle, start, line)?;

    tracing::debug!(path = %path.display(), bytes = line.len(), "Appended log entry");
    Ok(())
}

/// Write and flush `line` through `out`; on failure truncate `file` to `start`
///
/// The returned error is the write or flush failure, even if truncation also fails.
fn write_or_rollback<W: Write>(
    path: &Path,
    file: &File,
    out: &mut W,
    start: u64,
    line: &[u8],
) -> Result<()> {
    let result = out
        .write_all(line)
        .map_err(|e| Error::write("append to", path, e))
        .and_then(|()| out.flush().map_err(|e| Error::write("flush", path, e)));

    if result.is_err() {
        let _ = file.set_len(start);
    }
    result
}
