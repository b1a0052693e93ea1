//! ==============================================================================
//! http.rs - controller-facing HTTP endpoints
//! ==============================================================================
//!
//! purpose:
//!     the four endpoints the dome controller talks to:
//!
//!     GET /log?m=<motor>&d=<direction>&t=<ticks>
//!         append one tick measurement to the CSV. 200 "OK" / 500 "ERROR".
//!     GET /interrupt?m=<motor>&d=<direction>&t=<ticks>
//!         same, for a motor that halted before its target limit.
//!     GET /env
//!         current temperature and timing coefficient, "<temp>,<coeff>".
//!     GET /status
//!         liveness probe, no side effects.
//!
//!     everything responds text/plain. unknown paths get 404 "Not Found".
//!
//! parameter handling:
//!     the query string is decoded to an ordered key/value list; only the
//!     first value per key is honored, and an empty value counts as
//!     missing. beyond presence there is no validation - motor and ticks
//!     are logged verbatim as received.
//!
//! ==============================================================================

use crate::ticklog::TickLog;
use crate::weather::{format_temperature, WeatherFile};
use axum::{
    extract::{RawQuery, State},
    http::StatusCode,
    routing::get,
    Router,
};
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;
use tracing::error;

/// Body of the /status liveness probe.
pub const STATUS_BODY: &str = "Tick Logger Running";

/// 400 body when the controller leaves out a required parameter.
const MISSING_PARAMS: &str = "Missing parameters (m, d, t required)";

/// Timing coefficient returned via /env. Fixed for now, later fitted from
/// the collected temperature/tick data.
pub const COEFFICIENT: f64 = 1.0;

/// State shared by all handlers. Appends are serialized behind the mutex so
/// rows never interleave; the lock is only held across the synchronous
/// write, never across an await.
#[derive(Clone)]
pub struct AppState {
    pub log: Arc<Mutex<TickLog>>,
    pub weather: WeatherFile,
}

/// Build the router for the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/log", get(log_handler))
        .route("/interrupt", get(interrupt_handler))
        .route("/env", get(env_handler))
        .route("/status", get(status_handler))
        .fallback(not_found)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn log_handler(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> (StatusCode, String) {
    handle_append(&state, query.as_deref(), false)
}

async fn interrupt_handler(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> (StatusCode, String) {
    handle_append(&state, query.as_deref(), true)
}

/// Shared /log + /interrupt behavior: presence-check the parameters, then
/// append exactly one row.
fn handle_append(state: &AppState, query: Option<&str>, interrupted: bool) -> (StatusCode, String) {
    let pairs = parse_query(query.unwrap_or(""));

    let (Some(motor), Some(direction), Some(ticks)) = (
        first_param(&pairs, "m"),
        first_param(&pairs, "d"),
        first_param(&pairs, "t"),
    ) else {
        return (StatusCode::BAD_REQUEST, MISSING_PARAMS.to_string());
    };

    let result = state
        .log
        .lock()
        .unwrap()
        .append_row(motor, direction, ticks, interrupted);

    match result {
        Ok(()) => (StatusCode::OK, "OK".to_string()),
        Err(e) => {
            error!("CSV write error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "ERROR".to_string())
        }
    }
}

/// Current temperature and coefficient for the controller. Never fails:
/// an unreadable weather file just yields the sentinel.
async fn env_handler(State(state): State<AppState>) -> String {
    let temp = state.weather.temperature_or_sentinel();
    format!("{},{:.1}", format_temperature(temp), COEFFICIENT)
}

async fn status_handler() -> &'static str {
    STATUS_BODY
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}

/// Decode a query string into its key/value pairs, in wire order. A query
/// that does not decode yields no pairs (and therefore a missing-parameter
/// response).
fn parse_query(query: &str) -> Vec<(String, String)> {
    serde_urlencoded::from_str(query).unwrap_or_default()
}

/// First non-empty value for `key`, if any.
fn first_param<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
        .filter(|v| !v.is_empty())
}
