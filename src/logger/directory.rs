//! Log directory preconditions
//!
//! Checked before the logger touches anything on disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::DirectoryPolicy;
use crate::error::{Error, Result};

/// Permissions for directories created on demand
#[cfg(unix)]
const DIR_MODE: u32 = 0o755;

/// Verify (or create, depending on `policy`) the log directory and return it
pub fn prepare(dir: Option<&Path>, policy: DirectoryPolicy) -> Result<PathBuf> {
    let dir = match dir {
        Some(d) if !d.as_os_str().is_empty() => d,
        _ => return Err(Error::DirectoryUnset),
    };

    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return Err(Error::NotADirectory {
                path: dir.to_path_buf(),
            })
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => match policy {
            DirectoryPolicy::RequireExisting => {
                return Err(Error::DirectoryMissing {
                    path: dir.to_path_buf(),
                })
            }
            DirectoryPolicy::CreateMissing => create(dir)?,
        },
        Err(e) => {
            return Err(Error::DirectoryNotWritable {
                path: dir.to_path_buf(),
                source: Some(e),
            })
        }
    }

    check_writable(dir)?;
    Ok(dir.to_path_buf())
}

fn create(dir: &Path) -> Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }

    builder.create(dir).map_err(|source| Error::DirectoryCreation {
        path: dir.to_path_buf(),
        source,
    })?;
    tracing::debug!(dir = %dir.display(), "Created log directory");
    Ok(())
}

#[cfg(unix)]
fn check_writable(dir: &Path) -> Result<()> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let not_writable = |source| Error::DirectoryNotWritable {
        path: dir.to_path_buf(),
        source,
    };

    let c_path = CString::new(dir.as_os_str().as_bytes())
        .map_err(|e| not_writable(Some(io::Error::new(io::ErrorKind::InvalidInput, e))))?;

    if unsafe { libc::access(c_path.as_ptr(), libc::W_OK | libc::X_OK) } == 0 {
        Ok(())
    } else {
        Err(not_writable(Some(io::Error::last_os_error())))
    }
}

#[cfg(not(unix))]
fn check_writable(dir: &Path) -> Result<()> {
    let meta = fs::metadata(dir).map_err(|e| Error::DirectoryNotWritable {
        path: dir.to_path_buf(),
        source: Some(e),
    })?;
    if meta.permissions().readonly() {
        return Err(Error::DirectoryNotWritable {
            path: dir.to_path_buf(),
            source: None,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    #[test]
    fn test_unset_directory() {
        let err = prepare(None, DirectoryPolicy::RequireExisting).unwrap_err();
        assert!(matches!(err, Error::DirectoryUnset));

        let err = prepare(Some(Path::new("")), DirectoryPolicy::CreateMissing).unwrap_err();
        assert!(matches!(err, Error::DirectoryUnset));
    }

    #[test]
    fn test_existing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let dir = prepare(Some(temp_dir.path()), DirectoryPolicy::RequireExisting).unwrap();
        assert_eq!(dir, temp_dir.path());
    }

    #[test]
    fn test_missing_directory_required() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");

        let err = prepare(Some(&missing), DirectoryPolicy::RequireExisting).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(!missing.exists());
    }

    #[test]
    fn test_missing_directory_created() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");

        let dir = prepare(Some(&nested), DirectoryPolicy::CreateMissing).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn test_file_in_place_of_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("plain");
        fs::write(&file, b"x").unwrap();

        let err = prepare(Some(&file), DirectoryPolicy::CreateMissing).unwrap_err();
        assert!(matches!(err, Error::NotADirectory { .. }));
    }

    #[test]
    fn test_creation_failure_under_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("plain");
        fs::write(&file, b"x").unwrap();

        let err = prepare(Some(&file.join("sub")), DirectoryPolicy::CreateMissing).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DirectoryCreation);
    }

    #[cfg(unix)]
    #[test]
    fn test_readonly_directory() {
        use std::os::unix::fs::PermissionsExt;

        // Root bypasses permission bits
        if unsafe { libc::geteuid() } == 0 {
            return;
        }

        let temp_dir = TempDir::new().unwrap();
        let ro = temp_dir.path().join("ro");
        fs::create_dir(&ro).unwrap();
        fs::set_permissions(&ro, fs::Permissions::from_mode(0o555)).unwrap();

        let err = prepare(Some(&ro), DirectoryPolicy::RequireExisting).unwrap_err();
        assert!(matches!(err, Error::DirectoryNotWritable { .. }));

        fs::set_permissions(&ro, fs::Permissions::from_mode(0o755)).unwrap();
    }
}
