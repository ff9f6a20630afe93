//! Configuration loading from `loopkit.toml` with defaults.

pub use loopkit_types::config::{LogConfig, LoopConfig, TransportConfig, DEFAULT_MAX_MESSAGE_SIZE};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Config file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "loopkit.toml";

/// Load configuration from a TOML file, with defaults.
///
/// Never fatal. A missing file is noted at info level; an unreadable or
/// invalid one logs a warning. Both return the defaults.
pub fn load_config(path: Option<&Path>) -> LoopConfig {
    let config_path = path
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    if !config_path.exists() {
        info!(
            path = %config_path.display(),
            "Config file not found, using defaults"
        );
        return LoopConfig::default();
    }

    match std::fs::read_to_string(&config_path) {
        Ok(contents) => match toml::from_str::<LoopConfig>(&contents) {
            Ok(config) => {
                info!(path = %config_path.display(), "Loaded configuration");
                config
            }
            Err(e) => {
                warn!(
                    error = %e,
                    path = %config_path.display(),
                    "Failed to parse config, using defaults"
                );
                LoopConfig::default()
            }
        },
        Err(e) => {
            warn!(
                error = %e,
                path = %config_path.display(),
                "Failed to read config file, using defaults"
            );
            LoopConfig::default()
        }
    }
}
