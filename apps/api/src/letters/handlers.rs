//! Axum route handlers for the Letters API.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::AppError;
use crate::letters::generator::generate_letter;
use crate::letters::models::{GenerateBody, GenerationRequest};
use crate::models::letter::LetterPage;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: u32 = 10;
const MAX_PAGE_SIZE: u32 = 100;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub letter: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ListQuery {
    /// `(limit, offset)` with defaults applied and the limit capped.
    pub fn resolve(&self) -> (i64, i64) {
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);
        let offset = self.offset.unwrap_or(0);
        (i64::from(limit), i64::from(offset))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/generate
///
/// Body: `{ "type": "form" | "prompt", "data": {...} }`.
/// Returns `{ letter }`; persistence problems never change the response.
pub async fn handle_generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerateBody>, JsonRejection>,
) -> Result<Json<GenerateResponse>, AppError> {
    let Json(body) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let request = GenerationRequest::try_from(body)?;

    let today = chrono::Local::now().date_naive();
    let generated =
        generate_letter(state.llm.as_ref(), &state.persistence, &request, today).await?;

    debug!(
        "Returning letter ({} words, persistence: {:?})",
        generated.word_count, generated.persistence
    );

    Ok(Json(GenerateResponse {
        letter: generated.letter,
    }))
}

/// GET /api/v1/letters?limit=10&offset=0
///
/// Full-table pagination, newest first.
pub async fn handle_list_letters(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<LetterPage>, AppError> {
    let (limit, offset) = params.resolve();
    let page = state.persistence.list_letters(limit, offset).await?;
    Ok(Json(page))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_defaults() {
        let query: ListQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.resolve(), (10, 0));
    }

    #[test]
    fn test_list_query_caps_limit() {
        let query = ListQuery {
            limit: Some(5000),
            offset: Some(40),
        };
        assert_eq!(query.resolve(), (100, 40));
    }

    #[test]
    fn test_generate_response_shape() {
        let json = serde_json::to_value(GenerateResponse {
            letter: "Dear Committee".into(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "letter": "Dear Committee" }));
    }
}
