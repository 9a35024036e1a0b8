use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let persistence = if state.persistence.is_enabled() {
        "enabled"
    } else {
        "disabled"
    };

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "lor-api",
        "persistence": persistence,
    }))
}

/// GET /api/v1/db/health
/// Probes the datastore and updates its reachability for later writes.
pub async fn handle_db_probe(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    state
        .persistence
        .probe()
        .await
        .map_err(|e| AppError::DatabaseUnavailable(e.to_string()))?;

    Ok(Json(json!({
        "message": "Database connection successful."
    })))
}
