//! ==============================================================================
//! config.rs - Runtime Configuration Loader
//! ==============================================================================
//!
//! purpose:
//!     defines the schema for `ticklogger.toml`.
//!     loads configuration from file or falls back to defaults.
//!
//! structure:
//!     - ServerConfig: Listen port for the controller-facing HTTP endpoint.
//!     - StorageConfig: Where the tick CSV lives (tmpfs on the appliance).
//!     - WeatherConfig: The Solo's weather JSON file (written by a sibling
//!       process, read-only here).
//!     - LoggingConfig: Subscriber level.
//!
//! ==============================================================================

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct TickLoggerConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub weather: WeatherConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub csv_file: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    pub json_file: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

impl TickLoggerConfig {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;

        let config: TickLoggerConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config: {}", e))?;

        Ok(config)
    }

    /// Load with default fallback
    pub fn load_or_default() -> Self {
        let paths = [
            PathBuf::from("config").join("ticklogger.toml"),
            PathBuf::from("/etc/astroshell/ticklogger.toml"),
        ];

        for path in &paths {
            if path.exists() {
                match Self::load(path) {
                    Ok(config) => {
                        println!("[CONFIG] Loaded from {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        println!("[CONFIG] Warning: Failed to load {}: {}", path.display(), e);
                    }
                }
            }
        }

        println!("[CONFIG] Warning: No config file found - using defaults");
        Self::default()
    }
}

impl Default for TickLoggerConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig { port: 88 },
            storage: StorageConfig {
                csv_file: PathBuf::from("/home/aagsolo/motor_ticks.csv"),
            },
            weather: WeatherConfig {
                json_file: PathBuf::from("/home/aagsolo/aag_json.dat"),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}
