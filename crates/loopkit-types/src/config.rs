//! Configuration types for loopkit hosts and plugins.
//!
//! Loaded from TOML by `loopkit_wire::config::load_config`. Every field has a
//! default, so an empty file (or no file) yields a working configuration.

use serde::{Deserialize, Serialize};

/// Maximum single frame size (16 MiB).
pub const DEFAULT_MAX_MESSAGE_SIZE: u32 = 16 * 1024 * 1024;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    /// Connection and framing settings.
    pub transport: TransportConfig,
    /// Logging settings.
    pub log: LogConfig,
}

/// Connection and framing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Largest encoded frame accepted or sent, in bytes.
    pub max_message_size: u32,
    /// Frames buffered for the writer task before senders wait.
    pub outbound_queue_depth: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            outbound_queue_depth: 256,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}
