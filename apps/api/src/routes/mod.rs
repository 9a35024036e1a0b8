pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::letters::generator::GENERATE_ENDPOINT;
use crate::letters::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Letters API
        .route(GENERATE_ENDPOINT, post(handlers::handle_generate))
        .route("/api/v1/letters", get(handlers::handle_list_letters))
        // Datastore probe
        .route("/api/v1/db/health", get(health::handle_db_probe))
        .with_state(state)
}
