//! Exclusive advisory file locks
//!
//! Uses `flock(2)` on Unix. Other platforms get a no-op lock and rely on
//! append-mode writes alone.

use std::fs::File;
use std::io;

/// Holds an exclusive lock on a file until dropped
pub struct ExclusiveLock<'a> {
    file: &'a File,
}

impl<'a> ExclusiveLock<'a> {
    /// Block until an exclusive lock on `file` is held
    pub fn acquire(file: &'a File) -> io::Result<Self> {
        lock(file)?;
        Ok(Self { file })
    }
}

impl Drop for ExclusiveLock<'_> {
    fn drop(&mut self) {
        // Closing the descriptor releases the lock anyway.
        let _ = unlock(self.file);
    }
}

#[cfg(unix)]
fn lock(file: &File) -> io::Result<()> {
    flock(file, libc::LOCK_EX)
}

#[cfg(unix)]
fn unlock(file: &File) -> io::Result<()> {
    flock(file, libc::LOCK_UN)
}

#[cfg(unix)]
fn flock(file: &File, operation: libc::c_int) -> io::Result<()> {
    use std::os::unix::io::AsRawFd;

    loop {
        let ret = unsafe { libc::flock(file.as_raw_fd(), operation) };
        if ret == 0 {
            return Ok(());
        }
        let err = io::Error::last_os_error();
        if err.kind() != io::ErrorKind::Interrupted {
            return Err(err);
        }
    }
}

#[cfg(not(unix))]
fn lock(_file: &File) -> io::Result<()> {
    Ok(())
}

#[cfg(not(unix))]
fn unlock(_file: &File) -> io::Result<()> {
    Ok(())
}
