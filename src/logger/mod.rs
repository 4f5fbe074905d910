//! The logger: directory checks, rotation, then a locked append
//!
//! Every call runs synchronously on the caller's thread:
//! check the directory, rotate the target if it is oversized, then append one
//! JSON line. Nothing is retried; the first failure is returned.

mod directory;
mod lock;
mod rotation;
mod writer;

use std::path::{Component, Path, PathBuf};

use crate::config::LoggerConfig;
use crate::entry::{resolve_client_origin, Context, LogEntry, Message};
use crate::error::{Error, Result};

pub use rotation::{lock_path, rotated_path, ROTATED_EXTENSION};

/// Appends JSON-lines entries to files in one directory
///
/// Configuration is fixed at construction. A `Logger` holds no other state and
/// can be shared between threads.
#[derive(Debug, Clone)]
pub struct Logger {
    config: LoggerConfig,
}

impl Logger {
    /// Create a logger that owns `config`
    pub fn new(config: LoggerConfig) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// Log a message with no context and no explicit client origin
    pub fn log_message(&self, file: &str, category: &str, message: impl Into<Message>) -> Result<()> {
        self.log(file, category, message, None, None)
    }

    /// Append one entry to `file`, rotating it first if it has reached the size limit
    ///
    /// `client_origin` is only used when the logger tracks client origins; it
    /// falls back to `REMOTE_ADDR` and then to `"Unknown"`.
    pub fn log(
        &self,
        file: &str,
        category: &str,
        message: impl Into<Message>,
        context: Option<&Context>,
        client_origin: Option<&str>,
    ) -> Result<()> {
        let path = self.file_path(file)?;

        if self.config.lock_rotation {
            rotation::rotate_if_needed_locked(&path, self.config.max_file_size)?;
        } else {
            rotation::rotate_if_needed(&path, self.config.max_file_size)?;
        }

        let mut entry = LogEntry::new(category, message.into(), context);
        if self.config.track_client_origin {
            entry = entry.with_ip(resolve_client_origin(client_origin));
        }
        let line = entry.to_line()?;

        writer::append_line(&path, &line)
    }

    /// Resolve `file` inside the log directory, checking the directory first
    pub fn file_path(&self, file: &str) -> Result<PathBuf> {
        validate_file_name(file)?;
        let dir = directory::prepare(
            self.config.log_dir.as_deref(),
            self.config.directory_policy,
        )?;
        Ok(dir.join(file))
    }
}

/// A file name must be exactly one normal path component
fn validate_file_name(name: &str) -> Result<()> {
    let invalid = |reason| Error::InvalidFileName {
        name: name.to_string(),
        reason,
    };

    if name.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(invalid("must not contain path separators"));
    }

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(invalid("must be a plain file name")),
    }
}
