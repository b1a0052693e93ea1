//! ==============================================================================
//! main.rs - tick logger entry point
//! ==============================================================================
//!
//! purpose:
//!     receives motor runtime reports from the dome controller and logs
//!     them to CSV, each row enriched with the ambient temperature from the
//!     Cloudwatcher Solo, for later fitting of temperature-dependent motor
//!     timing coefficients.
//!
//! responsibilities:
//!     - load configuration (port, CSV path, weather file path)
//!     - make sure the CSV log exists with its header
//!     - serve the four controller endpoints (/log /interrupt /env /status)
//!     - shut the listener down cleanly on interrupt
//!
//! relationships:
//!     - uses: config.rs (ticklogger.toml schema and defaults)
//!     - uses: http.rs (router and handlers)
//!     - uses: ticklog.rs (CSV append path)
//!     - uses: weather.rs (defensive temperature reads)
//!
//! the controller sends: GET /log?m=<motor>&d=<direction>&t=<ticks>
//!
//! ==============================================================================

mod config;
mod http;
mod ticklog;
mod weather;

use anyhow::{Context, Result};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // startup banner
    println!("===========================================================");
    println!("  AstroShell Tick Logger");
    println!("===========================================================");

    // step 1: load configuration
    let config = config::TickLoggerConfig::load_or_default();

    // step 2: logging - RUST_LOG wins over the configured level
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Port: {}", config.server.port);
    info!("CSV:  {}", config.storage.csv_file.display());
    info!("Weather: {}", config.weather.json_file.display());

    // step 3: storage - the process exists to write this file, so failing
    // to create it is fatal
    let weather = weather::WeatherFile::new(config.weather.json_file.clone());
    let log = ticklog::TickLog::new(config.storage.csv_file.clone(), weather.clone());
    log.ensure_header().with_context(|| {
        format!(
            "failed to create CSV log at {}",
            config.storage.csv_file.display()
        )
    })?;

    // step 4: one diagnostic temperature read, logged but not acted on
    match weather.read_temperature() {
        Ok(temp) => info!("Current temperature: {}C", temp),
        Err(e) => warn!("Temperature unavailable at startup: {}", e),
    }

    // step 5: serve until interrupted
    let state = http::AppState {
        log: Arc::new(Mutex::new(log)),
        weather,
    };
    let app = http::router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.server.port))
        .await
        .with_context(|| format!("failed to bind port {}", config.server.port))?;
    info!("Server listening on port {}...", config.server.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutting down...");
}
