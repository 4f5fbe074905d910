//! Error types for the logger
//!
//! Every failure of a logging call surfaces as an [`Error`]. Callers that need to
//! branch on the failure class use [`Error::kind`].

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse failure classes of a logging call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Directory unset, missing or unwritable, or an invalid file name
    Configuration,
    /// The directory could not be created on demand
    DirectoryCreation,
    /// An oversized file could not be renamed out of the way
    Rotation,
    /// The message or the entry could not be encoded as JSON
    Serialization,
    /// Opening, locking or appending to the file failed
    Write,
}

impl ErrorKind {
    /// Get the display name for this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::DirectoryCreation => "directory_creation",
            ErrorKind::Rotation => "rotation",
            ErrorKind::Serialization => "serialization",
            ErrorKind::Write => "write",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("log directory is not configured")]
    DirectoryUnset,

    #[error("log directory {} does not exist", .path.display())]
    DirectoryMissing { path: PathBuf },

    #[error("log directory path {} is not a directory", .path.display())]
    NotADirectory { path: PathBuf },

    #[error("log directory {} is not writable", .path.display())]
    DirectoryNotWritable {
        path: PathBuf,
        #[source]
        source: Option<io::Error>,
    },

    #[error("invalid log file name {name:?}: {reason}")]
    InvalidFileName { name: String, reason: &'static str },

    #[error("failed to create log directory {}", .path.display())]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to rotate {} to {}", .from.display(), .to.display())]
    Rotation {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to inspect {} before rotation", .path.display())]
    RotationCheck {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode log entry as JSON")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to {action} {}", .path.display())]
    Write {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Failure class of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::DirectoryUnset
            | Error::DirectoryMissing { .. }
            | Error::NotADirectory { .. }
            | Error::DirectoryNotWritable { .. }
            | Error::InvalidFileName { .. } => ErrorKind::Configuration,
            Error::DirectoryCreation { .. } => ErrorKind::DirectoryCreation,
            Error::Rotation { .. } | Error::RotationCheck { .. } => ErrorKind::Rotation,
            Error::Serialization(_) => ErrorKind::Serialization,
            Error::Write { .. } => ErrorKind::Write,
        }
    }

    pub(crate) fn write(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Write {
            action,
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(Error::DirectoryUnset.kind(), ErrorKind::Configuration);
        assert_eq!(
            Error::InvalidFileName {
                name: "../x".to_string(),
                reason: "must not contain path separators",
            }
            .kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            Error::DirectoryCreation {
                path: PathBuf::from("/x"),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            }
            .kind(),
            ErrorKind::DirectoryCreation
        );
        assert_eq!(
            Error::write("open", "/x/app.json", io::Error::from(io::ErrorKind::Other)).kind(),
            ErrorKind::Write
        );
    }

    #[test]
    fn test_message_names_path_and_keeps_source() {
        let err = Error::Rotation {
            from: PathBuf::from("/logs/app.json"),
            to: PathBuf::from("/logs/app_1_000001.json"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        let msg = err.to_string();
        assert!(msg.contains("/logs/app.json"));
        assert!(msg.contains("/logs/app_1_000001.json"));
        assert!(err.source().is_some());
        assert_eq!(err.kind(), ErrorKind::Rotation);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ErrorKind::Serialization.to_string(), "serialization");
        assert_eq!(ErrorKind::DirectoryCreation.as_str(), "directory_creation");
    }
}
