//! Configuration management for jsonlog
//!
//! A [`LoggerConfig`] is built once (in code or from a TOML file) and handed to a
//! [`crate::Logger`], which owns it for its whole lifetime.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default rotation threshold: 10 MiB
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// What to do when the log directory does not exist
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectoryPolicy {
    /// Fail the call with a configuration error
    #[default]
    RequireExisting,
    /// Create the directory (and parents) with standard permissions
    CreateMissing,
}

/// Logger configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggerConfig {
    /// Directory that holds the log files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    /// Size in bytes at or above which a file is rotated before the next write (default: 10 MiB)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Whether a missing directory is an error or gets created
    #[serde(default)]
    pub directory_policy: DirectoryPolicy,

    /// Add an `ip` field with the client origin to every entry
    #[serde(default)]
    pub track_client_origin: bool,

    /// Hold a sidecar lock across the size check and rename so concurrent
    /// writers rotate a file at most once
    #[serde(default)]
    pub lock_rotation: bool,
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            log_dir: None,
            max_file_size: default_max_file_size(),
            directory_policy: DirectoryPolicy::default(),
            track_client_origin: false,
            lock_rotation: false,
        }
    }
}

impl LoggerConfig {
    /// Create a configuration writing into `log_dir` with default settings
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: Some(log_dir.into()),
            ..Self::default()
        }
    }

    /// Set the rotation threshold in bytes
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// Set what happens when the log directory is missing
    pub fn with_directory_policy(mut self, policy: DirectoryPolicy) -> Self {
        self.directory_policy = policy;
        self
    }

    /// Enable or disable the `ip` field
    pub fn with_client_origin(mut self, track: bool) -> Self {
        self.track_client_origin = track;
        self
    }

    /// Enable or disable the sidecar rotation lock
    pub fn with_rotation_lock(mut self, lock: bool) -> Self {
        self.lock_rotation = lock;
        self
    }

    /// Load configuration from the default file, or return defaults if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from `path`, or return defaults if the file does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        config.log_dir = config.log_dir.map(|dir| expand_tilde(&dir));
        Ok(config)
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }
}

fn expand_tilde(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => PathBuf::from(shellexpand::tilde(s).into_owned()),
        None => path.to_path_buf(),
    }
}

/// Get the base configuration directory (~/.jsonlog)
/// Falls back to ./.jsonlog if home directory cannot be determined
pub fn config_dir() -> PathBuf {
    try_config_dir().unwrap_or_else(|| {
        tracing::warn!("Could not determine home directory, using current directory for config");
        PathBuf::from(".jsonlog")
    })
}

/// Try to get the base configuration directory, returning None if home dir is unavailable
pub fn try_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".jsonlog"))
}

/// Get the path to the config file
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = LoggerConfig::default();
        assert_eq!(config.log_dir, None);
        assert_eq!(config.max_file_size, 10_485_760);
        assert_eq!(config.directory_policy, DirectoryPolicy::RequireExisting);
        assert!(!config.track_client_origin);
        assert!(!config.lock_rotation);
    }

    #[test]
    fn test_builder_setters() {
        let config = LoggerConfig::new("/var/log/app")
            .with_max_file_size(100)
            .with_directory_policy(DirectoryPolicy::CreateMissing)
            .with_client_origin(true)
            .with_rotation_lock(true);

        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/app")));
        assert_eq!(config.max_file_size, 100);
        assert_eq!(config.directory_policy, DirectoryPolicy::CreateMissing);
        assert!(config.track_client_origin);
        assert!(config.lock_rotation);
    }

    #[test]
    fn test_config_serialization() {
        let config = LoggerConfig::new("/tmp/logs").with_max_file_size(2048);
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: LoggerConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: LoggerConfig = toml::from_str(
            r#"
log_dir = "/srv/logs"
directory_policy = "create_missing"
"#,
        )
        .unwrap();

        assert_eq!(parsed.log_dir, Some(PathBuf::from("/srv/logs")));
        assert_eq!(parsed.max_file_size, DEFAULT_MAX_FILE_SIZE);
        assert_eq!(parsed.directory_policy, DirectoryPolicy::CreateMissing);
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let temp_dir = TempDir::new().unwrap();
        let config = LoggerConfig::load_from(&temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, LoggerConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let config = LoggerConfig::new(temp_dir.path()).with_client_origin(true);

        config.save_to(&path).unwrap();
        let loaded = LoggerConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_invalid_toml_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "max_file_size = \"lots\"").unwrap();

        assert!(LoggerConfig::load_from(&path).is_err());
    }

    #[test]
    fn test_load_expands_tilde() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "log_dir = \"~/logs\"").unwrap();

        let loaded = LoggerConfig::load_from(&path).unwrap();
        let dir = loaded.log_dir.unwrap();
        if dirs::home_dir().is_some() {
            assert!(!dir.starts_with("~"));
        }
        assert!(dir.ends_with("logs"));
    }

    #[test]
    fn test_config_dir_does_not_panic() {
        let dir = config_dir();
        assert!(dir.ends_with(".jsonlog"));
        assert!(config_file_path().ends_with("config.toml"));
    }
}
