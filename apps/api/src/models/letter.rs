use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::letters::models::{approximate_tokens, word_count, GenerationRequest};

/// Classification stored for free-text letters, which carry no form metadata.
const PROMPT_TONE: &str = "Professional";
const PROMPT_LOR_TYPE: &str = "General";
const PROMPT_STRENGTH: &str = "Recommend";

/// Row written to `letters` once per successful generation. Never updated.
#[derive(Debug, Clone)]
pub struct LetterRecord {
    pub id: Uuid,
    pub kind: String,
    pub title: String,
    pub prompt: String,
    pub form_data: Option<Value>,
    pub generated_letter: String,
    pub tone: String,
    pub lor_type: String,
    pub strength: String,
    pub word_count: i32,
    pub created_at: DateTime<Utc>,
}

impl LetterRecord {
    pub fn new(request: &GenerationRequest, prompt: &str, letter: &str) -> Self {
        let (form_data, tone, lor_type, strength) = match request {
            GenerationRequest::Form(form) => (
                serde_json::to_value(form).ok(),
                form.tone.clone(),
                form.application_type.clone(),
                form.recommendation_strength.clone(),
            ),
            GenerationRequest::Prompt(_) => (
                None,
                PROMPT_TONE.to_string(),
                PROMPT_LOR_TYPE.to_string(),
                PROMPT_STRENGTH.to_string(),
            ),
        };

        Self {
            id: Uuid::new_v4(),
            kind: request.kind().as_str().to_string(),
            title: request.title(),
            prompt: prompt.to_string(),
            form_data,
            generated_letter: letter.to_string(),
            tone,
            lor_type,
            strength,
            word_count: clamp_i32(word_count(letter)),
            created_at: Utc::now(),
        }
    }
}

/// Row written to `api_usage` alongside each letter.
#[derive(Debug, Clone)]
pub struct UsageRecord {
    pub api_provider: String,
    pub model_used: String,
    /// `ceil(chars / 4)` of the letter. An approximation, not a tokenizer count.
    pub tokens_used: i32,
    pub endpoint: String,
    pub created_at: DateTime<Utc>,
}

impl UsageRecord {
    pub fn new(provider: &str, model: &str, endpoint: &str, letter: &str) -> Self {
        Self {
            api_provider: provider.to_string(),
            model_used: model.to_string(),
            tokens_used: clamp_i32(approximate_tokens(letter)),
            endpoint: endpoint.to_string(),
            created_at: Utc::now(),
        }
    }
}

/// Listing projection of a `letters` row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LetterSummary {
    pub id: Uuid,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
    pub title: String,
    pub tone: Option<String>,
    pub lor_type: Option<String>,
    pub strength: Option<String>,
    pub word_count: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub has_more: bool,
}

impl Pagination {
    pub fn new(total: i64, limit: i64, offset: i64) -> Self {
        Self {
            total,
            limit,
            offset,
            has_more: offset + limit < total,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LetterPage {
    pub letters: Vec<LetterSummary>,
    pub pagination: Pagination,
}

fn clamp_i32(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}
