//! jsonlog - structured JSON-lines logging with size-based rotation
//!
//! A [`Logger`] appends one compact JSON object per line to a file in its
//! configured directory. Before each write the file is renamed out of the way
//! if it has reached the configured size.
//!
//! ```no_run
//! use jsonlog::{Logger, LoggerConfig};
//!
//! let logger = Logger::new(LoggerConfig::new("/var/log/myapp").with_max_file_size(1 << 20));
//! logger.log_message("app.json", "auth", "user logged in")?;
//! # Ok::<(), jsonlog::Error>(())
//! ```

pub mod config;
pub mod entry;
pub mod error;
pub mod logger;

pub use config::{DirectoryPolicy, LoggerConfig, DEFAULT_MAX_FILE_SIZE};
pub use entry::{resolve_client_origin, Context, LogEntry, Message};
pub use error::{Error, ErrorKind, Result};
pub use logger::Logger;
