//! ==============================================================================
//! ticklog.rs - the motor tick CSV log
//! ==============================================================================
//!
//! purpose:
//!     owns the append-only CSV file that collects one row per motor
//!     movement report. each row is enriched with the ambient temperature
//!     at write time so the temperature/timing coefficient can be fitted
//!     offline later.
//!
//! file format:
//!     timestamp_utc,motor,direction,ticks,temperature
//!     2026-02-03T18:30:45Z,1,closing,5234,18.5
//!     2026-02-03T18:35:12Z,1,INTERRUPTED-opening,5456,-0.9
//!
//! the CSV lives on a tmpfs (the appliance root filesystem is read-only),
//! so the file can vanish underneath us on reboot. the header is written
//! once at startup; an append to a missing file recreates it headerless.
//!
//! ==============================================================================

use crate::weather::{format_temperature, WeatherFile};
use chrono::Utc;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Fixed first line of a freshly created log file.
pub const CSV_HEADER: &str = "timestamp_utc,motor,direction,ticks,temperature";

/// Motor travel direction as reported by the dome controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Closing,
    Opening,
}

impl Direction {
    /// Decode the controller's direction code. The code is compared only
    /// against the literal "1"; every other value decodes as `Opening`.
    /// The controller firmware only ever sends "1" or "2" - this is a
    /// simplification, not validation.
    pub fn from_code(code: &str) -> Self {
        if code == "1" {
            Direction::Closing
        } else {
            Direction::Opening
        }
    }

    fn label(self) -> &'static str {
        match self {
            Direction::Closing => "closing",
            Direction::Opening => "opening",
        }
    }

    /// CSV label for this direction, marked when the motor halted before
    /// reaching its target limit.
    pub fn csv_label(self, interrupted: bool) -> String {
        if interrupted {
            format!("INTERRUPTED-{}", self.label())
        } else {
            self.label().to_string()
        }
    }
}

/// The tick log: CSV path plus the weather file each row is enriched from.
#[derive(Debug)]
pub struct TickLog {
    path: PathBuf,
    weather: WeatherFile,
}

impl TickLog {
    pub fn new(path: PathBuf, weather: WeatherFile) -> Self {
        Self { path, weather }
    }

    /// Create the log file with its header if it does not exist yet.
    /// Idempotent; called once at startup.
    pub fn ensure_header(&self) -> std::io::Result<()> {
        if !self.path.exists() {
            std::fs::write(&self.path, format!("{}\n", CSV_HEADER))?;
            info!("Created new CSV file: {}", self.path.display());
        }
        Ok(())
    }

    /// Append one measurement row. `motor` and `ticks` are written verbatim
    /// as received from the controller; the timestamp and temperature are
    /// sampled here, at write time.
    pub fn append_row(
        &self,
        motor: &str,
        direction_code: &str,
        ticks: &str,
        interrupted: bool,
    ) -> std::io::Result<()> {
        let timestamp = Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
        let temperature = self.weather.temperature_or_sentinel();
        let direction = Direction::from_code(direction_code).csv_label(interrupted);

        let line = format!(
            "{},{},{},{},{}\n",
            timestamp,
            motor,
            direction,
            ticks,
            format_temperature(temperature)
        );

        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;

        info!(
            "Logged: M{} {} {} ticks @ {}C",
            motor,
            direction,
            ticks,
            format_temperature(temperature)
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::WeatherFile;
    use std::path::PathBuf;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("ticklogger-csv-{}-{}.csv", std::process::id(), name))
    }

    fn scratch_log(name: &str, weather_json: Option<&str>) -> TickLog {
        let csv = scratch_path(name);
        let _ = std::fs::remove_file(&csv);

        let weather_path = std::env::temp_dir().join(format!(
            "ticklogger-csv-weather-{}-{}.dat",
            std::process::id(),
            name
        ));
        match weather_json {
            Some(json) => std::fs::write(&weather_path, json).unwrap(),
            None => {
                let _ = std::fs::remove_file(&weather_path);
            }
        }

        TickLog::new(csv, WeatherFile::new(weather_path))
    }

    fn read_lines(log_path: &PathBuf) -> Vec<String> {
        std::fs::read_to_string(log_path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn direction_decoding() {
        assert_eq!(Direction::from_code("1"), Direction::Closing);
        assert_eq!(Direction::from_code("2"), Direction::Opening);
        // anything that is not "1" falls back to opening
        assert_eq!(Direction::from_code("7"), Direction::Opening);
        assert_eq!(Direction::from_code("garbage"), Direction::Opening);
    }

    #[test]
    fn interrupted_label_prefix() {
        assert_eq!(Direction::Closing.csv_label(false), "closing");
        assert_eq!(Direction::Closing.csv_label(true), "INTERRUPTED-closing");
        assert_eq!(Direction::Opening.csv_label(true), "INTERRUPTED-opening");
    }

    #[test]
    fn header_created_once() {
        let log = scratch_log("header", Some(r#"{"temp": 18.5}"#));
        log.ensure_header().unwrap();
        log.append_row("1", "1", "5234", false).unwrap();

        // second startup must not duplicate the header or lose the row
        log.ensure_header().unwrap();

        let lines = read_lines(&log.path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], CSV_HEADER);
        assert!(lines[1].ends_with(",1,closing,5234,18.5"));
    }

    #[test]
    fn row_shape_and_timestamp() {
        let log = scratch_log("shape", Some(r#"{"temp": 18.5}"#));
        log.ensure_header().unwrap();
        log.append_row("1", "1", "5234", false).unwrap();

        let lines = read_lines(&log.path);
        let fields: Vec<&str> = lines[1].split(',').collect();
        assert_eq!(fields.len(), 5);
        assert_eq!(&fields[1..], &["1", "closing", "5234", "18.5"]);

        // 2026-02-03T18:30:45Z
        let ts = fields[0];
        assert_eq!(ts.len(), 20);
        assert_eq!(&ts[4..5], "-");
        assert_eq!(&ts[10..11], "T");
        assert!(ts.ends_with('Z'));
    }

    #[test]
    fn interrupted_row() {
        let log = scratch_log("interrupt", Some(r#"{"temp": -0.9}"#));
        log.ensure_header().unwrap();
        log.append_row("2", "2", "100", true).unwrap();

        let lines = read_lines(&log.path);
        assert!(lines[1].ends_with(",2,INTERRUPTED-opening,100,-0.9"));
    }

    #[test]
    fn sentinel_row_when_weather_unreadable() {
        let log = scratch_log("sentinel", None);
        log.ensure_header().unwrap();
        log.append_row("2", "2", "100", false).unwrap();

        let lines = read_lines(&log.path);
        assert!(lines[1].ends_with(",2,opening,100,-999"));
    }

    #[test]
    fn append_recreates_missing_file() {
        let log = scratch_log("recreate", Some(r#"{"temp": 18.5}"#));
        log.ensure_header().unwrap();
        std::fs::remove_file(&log.path).unwrap();

        // tmpfs wiped the file; the next append must recreate it (headerless)
        log.append_row("1", "2", "77", false).unwrap();

        let lines = read_lines(&log.path);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with(",1,opening,77,18.5"));
    }
}
