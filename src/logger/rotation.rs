//! Size-based rotation
//!
//! An oversized file is renamed to `<stem>_<secs>_<micros>.json` in the same
//! directory. Rotated files are never touched again, and a rename never
//! replaces an existing file.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::lock::ExclusiveLock;
use crate::error::{Error, Result};

/// Extension of every rotated file, whatever the active file uses
pub const ROTATED_EXTENSION: &str = "json";

/// Rename `path` out of the way if it is at least `max_bytes` long
///
/// A missing file counts as empty. Returns the new path when a rename happened.
pub fn rotate_if_needed(path: &Path, max_bytes: u64) -> Result<Option<PathBuf>> {
    rotate_at(path, max_bytes, SystemTime::now())
}

fn rotate_at(path: &Path, max_bytes: u64, now: SystemTime) -> Result<Option<PathBuf>> {
    let size = match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => 0,
        Err(source) => {
            return Err(Error::RotationCheck {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    if size < max_bytes || size == 0 {
        return Ok(None);
    }

    let rotated = rotated_path(path, now);
    rename_no_replace(path, &rotated).map_err(|source| Error::Rotation {
        from: path.to_path_buf(),
        to: rotated.clone(),
        source,
    })?;

    tracing::info!(
        from = %path.display(),
        to = %rotated.display(),
        size,
        "Rotated log file"
    );
    Ok(Some(rotated))
}

/// Rename `from` to `to`, failing with `AlreadyExists` instead of replacing `to`
#[cfg(all(target_os = "linux", target_env = "gnu"))]
fn rename_no_replace(from: &Path, to: &Path) -> io::Result<()> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let c_path = |p: &Path| {
        CString::new(p.as_os_str().as_bytes())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))
    };
    let (c_from, c_to) = (c_path(from)?, c_path(to)?);

    let ret = unsafe {
        libc::renameat2(
            libc::AT_FDCWD,
            c_from.as_ptr(),
            libc::AT_FDCWD,
            c_to.as_ptr(),
            libc::RENAME_NOREPLACE,
        )
    };
    if ret == 0 {
        return Ok(());
    }

    let err = io::Error::last_os_error();
    match err.raw_os_error() {
        // Kernel or filesystem without RENAME_NOREPLACE
        Some(libc::EINVAL) | Some(libc::ENOSYS) => rename_if_absent(from, to),
        _ => Err(err),
    }
}

#[cfg(not(all(target_os = "linux", target_env = "gnu")))]
fn rename_no_replace(from: &Path, to: &Path) -> io::Result<()> {
    rename_if_absent(from, to)
}

fn rename_if_absent(from: &Path, to: &Path) -> io::Result<()> {
    if fs::symlink_metadata(to).is_ok() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "rotated file already exists",
        ));
    }
    fs::rename(from, to)
}

/// Same as [`rotate_if_needed`], holding a sidecar lock across the check and rename
///
/// Writers that all use this path rotate a given file at most once per
/// threshold crossing.
pub fn rotate_if_needed_locked(path: &Path, max_bytes: u64) -> Result<Option<PathBuf>> {
    let lock_path = lock_path(path);
    let lock_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&lock_path)
        .map_err(|source| Error::RotationCheck {
            path: lock_path.clone(),
            source,
        })?;
    let _guard = ExclusiveLock::acquire(&lock_file).map_err(|source| Error::RotationCheck {
        path: lock_path.clone(),
        source,
    })?;

    rotate_if_needed(path, max_bytes)
}

/// Path a file is rotated to at time `now`
pub fn rotated_path(path: &Path, now: SystemTime) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = format!("{}_{}.{}", stem, suffix(now), ROTATED_EXTENSION);
    path.with_file_name(name)
}

/// Path of the sidecar lock used by [`rotate_if_needed_locked`]
pub fn lock_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.rotate.lock", name))
}

/// `<seconds>_<microseconds>` since the Unix epoch
fn suffix(now: SystemTime) -> String {
    let since_epoch = now.duration_since(UNIX_EPOCH).unwrap_or(Duration::ZERO);
    format!("{}_{:06}", since_epoch.as_secs(), since_epoch.subsec_micros())
}
