//! Liveness endpoint
//!
//! Public, cheap, and always 200 while the process serves requests. Reports
//! how many records each table holds so an operator can spot an empty store
//! after a restart.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct RecordCounts {
    pub members: usize,
    pub songs: usize,
    pub scales: usize,
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub module: &'static str,
    pub version: &'static str,
    pub records: RecordCounts,
}

/// GET /health
async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    let tables = state.store.read().await;

    Json(HealthStatus {
        status: "ok",
        module: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        records: RecordCounts {
            members: tables.members().len(),
            songs: tables.songs().len(),
            scales: tables.scales().len(),
        },
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
