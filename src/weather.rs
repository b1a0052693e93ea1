//! ==============================================================================
//! weather.rs - ambient temperature from the Cloudwatcher Solo
//! ==============================================================================
//!
//! purpose:
//!     reads the ambient temperature out of the weather JSON file that the
//!     Solo's own data collector rewrites at its own cadence. this process
//!     never writes that file, and the producer gives no ordering or
//!     atomicity guarantees, so every read is defensive: any failure comes
//!     back as a named error and the callers that need a value substitute
//!     the -999 sentinel.
//!
//! file structure (fields other than `temp` are ignored):
//!     {
//!         "temp" : -0.970000,
//!         "clouds" : 5.350000,
//!         ...
//!     }
//!
//! ==============================================================================

use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;

/// Reserved value meaning "temperature unavailable". Distinguishable from
/// any real reading the Solo can produce.
pub const SENTINEL_TEMPERATURE: f64 = -999.0;

/// Why a temperature read failed.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("failed to read weather file: {0}")]
    Read(#[from] std::io::Error),
    #[error("weather file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("weather data has no `temp` field")]
    MissingTemp,
    #[error("weather `temp` field is not a number")]
    NotNumeric,
}

/// Handle on the weather JSON file. Holds only the path; the file is
/// re-opened on every read so the producer can rewrite it freely.
#[derive(Debug, Clone)]
pub struct WeatherFile {
    path: PathBuf,
}

impl WeatherFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Read the current ambient temperature, rounded to one decimal place.
    pub fn read_temperature(&self) -> Result<f64, WeatherError> {
        let raw = std::fs::read_to_string(&self.path)?;
        let data: serde_json::Value = serde_json::from_str(&raw)?;
        let temp = data
            .get("temp")
            .ok_or(WeatherError::MissingTemp)?
            .as_f64()
            .ok_or(WeatherError::NotNumeric)?;
        Ok((temp * 10.0).round() / 10.0)
    }

    /// Read the current temperature, substituting the sentinel on any
    /// failure. The failure is logged; it is never surfaced to the caller.
    pub fn temperature_or_sentinel(&self) -> f64 {
        match self.read_temperature() {
            Ok(temp) => temp,
            Err(e) => {
                warn!("Temperature read error: {}", e);
                SENTINEL_TEMPERATURE
            }
        }
    }
}

/// Render a temperature for the CSV log and the /env body. The sentinel is
/// written as a bare `-999`; real readings always carry one decimal place.
pub fn format_temperature(temp: f64) -> String {
    if temp == SENTINEL_TEMPERATURE {
        "-999".to_string()
    } else {
        format!("{:.1}", temp)
    }
}
