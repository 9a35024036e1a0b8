//! Letter Generation: orchestrates one generation request.
//!
//! Flow: build prompt → completion call → word count → best-effort persist → return.
//!
//! Single pass. A failed completion ends the request before anything is
//! written; a failed write never changes the result.

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::letters::models::{word_count, GenerationRequest};
use crate::letters::prompt_builder::build_prompt;
use crate::llm_client::CompletionModel;
use crate::models::letter::{LetterRecord, UsageRecord};
use crate::persistence::{PersistOutcome, Persistence};

/// Endpoint name recorded in usage rows.
pub const GENERATE_ENDPOINT: &str = "/api/v1/generate";

#[derive(Debug, Clone)]
pub struct GeneratedLetter {
    pub letter: String,
    pub word_count: usize,
    pub persistence: PersistOutcome,
}

/// Runs the generation pipeline for an already-validated request.
///
/// Steps:
/// 1. build_prompt() with `today`
/// 2. llm.complete() → letter text (any error → `GenerationFailed`)
/// 3. word count + usage approximation
/// 4. persistence.record() → `PersistOutcome` (logged, never an error)
pub async fn generate_letter(
    llm: &dyn CompletionModel,
    persistence: &Persistence,
    request: &GenerationRequest,
    today: NaiveDate,
) -> Result<GeneratedLetter, AppError> {
    // Step 1: Prompt
    let prompt = build_prompt(request, today);

    // Step 2: Completion
    info!("Generating {} letter", request.kind().as_str());
    let letter = llm
        .complete(&prompt)
        .await
        .map_err(|e| AppError::GenerationFailed(e.to_string()))?;

    // Step 3: Derived attributes
    let words = word_count(&letter);

    // Step 4: Best-effort persistence
    let letter_record = LetterRecord::new(request, &prompt, &letter);
    let usage_record = UsageRecord::new(llm.provider(), llm.model(), GENERATE_ENDPOINT, &letter);
    let outcome = persistence.record(&letter_record, &usage_record).await;

    match &outcome {
        PersistOutcome::Persisted => info!("Letter {} saved ({words} words)", letter_record.id),
        PersistOutcome::Skipped(reason) => warn!("Letter not saved: {reason}"),
        PersistOutcome::Failed(reason) => warn!("Letter save failed (non-critical): {reason}"),
    }

    Ok(GeneratedLetter {
        letter,
        word_count: words,
        persistence: outcome,
    })
}
