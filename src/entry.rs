//! Log entry model and its JSON-line encoding

use chrono::Local;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Result;

/// Format of the `timestamp` field, local time with second resolution
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Value written to `ip` when no client origin can be determined
pub const UNKNOWN_ORIGIN: &str = "Unknown";

/// Environment variable consulted for the remote address when the caller gives none
pub const REMOTE_ADDR_VAR: &str = "REMOTE_ADDR";

/// Auxiliary key-value data attached to an entry
pub type Context = Map<String, Value>;

/// Message payload of an entry
///
/// Structured messages are embedded as a nested JSON object, never as an
/// encoded string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Message {
    Text(String),
    Structured(Value),
}

impl Message {
    /// Serialize any value into a structured message
    pub fn structured<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(Message::Structured(serde_json::to_value(value)?))
    }
}

impl From<&str> for Message {
    fn from(s: &str) -> Self {
        Message::Text(s.to_string())
    }
}

impl From<String> for Message {
    fn from(s: String) -> Self {
        Message::Text(s)
    }
}

impl From<Value> for Message {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => Message::Text(s),
            other => Message::Structured(other),
        }
    }
}

impl From<Map<String, Value>> for Message {
    fn from(map: Map<String, Value>) -> Self {
        Message::Structured(Value::Object(map))
    }
}

/// A single log line, in on-disk key order
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub category: String,
    pub message: Message,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Context>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
}

impl LogEntry {
    /// Build an entry stamped with the current local time
    ///
    /// An empty context is dropped so it is omitted from the output.
    pub fn new(category: &str, message: Message, context: Option<&Context>) -> Self {
        Self {
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            category: category.to_string(),
            message,
            context: context.filter(|c| !c.is_empty()).cloned(),
            ip: None,
        }
    }

    /// Attach a client origin
    pub fn with_ip(mut self, ip: String) -> Self {
        self.ip = Some(ip);
        self
    }

    /// Encode as one compact JSON object terminated by a single `\n`
    pub fn to_line(&self) -> Result<Vec<u8>> {
        let mut line = serde_json::to_vec(self)?;
        line.push(b'\n');
        Ok(line)
    }
}

/// Resolve the client origin: explicit value, then `REMOTE_ADDR`, then `"Unknown"`
///
/// Blank values count as absent.
pub fn resolve_client_origin(explicit: Option<&str>) -> String {
    let from_env = std::env::var(REMOTE_ADDR_VAR).ok();
    pick_origin(explicit, from_env.as_deref())
}

fn pick_origin(explicit: Option<&str>, remote_addr: Option<&str>) -> String {
    explicit
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or_else(|| remote_addr.map(str::trim).filter(|s| !s.is_empty()))
        .unwrap_or(UNKNOWN_ORIGIN)
        .to_string()
}
