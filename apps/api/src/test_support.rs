//! Test doubles for the completion and datastore seams, plus sample payloads.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::{json, Value};

use crate::letters::models::{FormRequest, GenerationRequest, PromptRequest};
use crate::llm_client::{CompletionModel, LlmError};
use crate::models::letter::{LetterRecord, LetterSummary, UsageRecord};
use crate::persistence::store::{LetterStore, StoreError};

/// Form payload with every required field set and every optional field absent.
pub fn sample_form_json() -> Value {
    json!({
        "applicantName": "Priya Raman",
        "applicantCurrentRole": "Research Assistant",
        "applicantInstitution": "University of Leeds",
        "relationship": "Supervisor",
        "duration": "2 years",
        "contextOfRelationship": "Supervised her undergraduate thesis on graph databases",
        "targetProgram": "MS in Computer Science",
        "targetInstitution": "ETH Zurich",
        "applicationType": "Graduate Admission",
        "fieldOfStudy": "Computer Science",
        "keySkills": "Distributed systems, Rust",
        "notableAchievements": "Best thesis award 2024",
        "keyProject": "Built a query planner for a graph store",
        "comparisonToPeers": "Top 5% of students I have supervised",
        "referrerName": "Dr. Alan Moore",
        "referrerTitle": "Associate Professor",
        "referrerInstitution": "University of Leeds",
        "referrerEmail": "a.moore@leeds.example",
        "tone": "Formal",
        "recommendationStrength": "Strongly Recommend",
        "letterFocus": "Academic"
    })
}

pub fn sample_form() -> FormRequest {
    serde_json::from_value(sample_form_json()).expect("sample form is valid")
}

/// Completion model that replies with a fixed text or always fails.
pub struct ScriptedModel {
    reply: Option<String>,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl ScriptedModel {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Some(text.to_string()),
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionModel for ScriptedModel {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        self.reply.clone().ok_or(LlmError::Api {
            status: 503,
            message: "upstream unavailable".to_string(),
        })
    }

    fn provider(&self) -> &str {
        "scripted"
    }
}

/// In-memory `LetterStore`.
pub struct MemoryStore {
    letters: Mutex<Vec<LetterRecord>>,
    usages: Mutex<Vec<UsageRecord>>,
    reachable: AtomicBool,
    reject_letters: bool,
    write_attempts: AtomicUsize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            letters: Mutex::new(Vec::new()),
            usages: Mutex::new(Vec::new()),
            reachable: AtomicBool::new(true),
            reject_letters: false,
            write_attempts: AtomicUsize::new(0),
        }
    }
}

impl MemoryStore {
    /// Every operation fails with a connection error until `set_reachable(true)`.
    pub fn unreachable() -> Self {
        let store = Self::default();
        store.reachable.store(false, Ordering::SeqCst);
        store
    }

    /// Letter inserts are rejected as bad statements; usage inserts succeed.
    pub fn failing_letters() -> Self {
        Self {
            reject_letters: true,
            ..Self::default()
        }
    }

    /// Pre-populated with `n` letters, one minute apart.
    pub fn with_letters(n: usize) -> Self {
        let store = Self::default();
        let base = Utc::now();
        {
            let mut letters = store.letters.lock().unwrap();
            for i in 0..n {
                let request = GenerationRequest::Prompt(PromptRequest {
                    prompt: format!("Recommend person {i}"),
                });
                let mut record = LetterRecord::new(&request, "prompt", "Dear Committee");
                record.created_at = base - Duration::minutes(i as i64);
                letters.push(record);
            }
        }
        store
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    pub fn letter_count(&self) -> usize {
        self.letters.lock().unwrap().len()
    }

    pub fn usage_count(&self) -> usize {
        self.usages.lock().unwrap().len()
    }

    pub fn usages(&self) -> Vec<UsageRecord> {
        self.usages.lock().unwrap().clone()
    }

    /// Insert calls received, successful or not.
    pub fn write_attempts(&self) -> usize {
        self.write_attempts.load(Ordering::SeqCst)
    }

    fn check_reachable(&self) -> Result<(), StoreError> {
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Connection("connection refused".to_string()))
        }
    }
}

#[async_trait]
impl LetterStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.check_reachable()
    }

    async fn insert_letter(&self, record: &LetterRecord) -> Result<(), StoreError> {
        self.write_attempts.fetch_add(1, Ordering::SeqCst);
        self.check_reachable()?;
        if self.reject_letters {
            return Err(StoreError::Query("null value in column \"title\"".to_string()));
        }
        self.letters.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn insert_usage(&self, record: &UsageRecord) -> Result<(), StoreError> {
        self.write_attempts.fetch_add(1, Ordering::SeqCst);
        self.check_reachable()?;
        self.usages.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn list_letters(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LetterSummary>, StoreError> {
        self.check_reachable()?;
        let mut letters = self.letters.lock().unwrap().clone();
        letters.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(letters
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|r| LetterSummary {
                id: r.id,
                kind: r.kind,
                title: r.title,
                tone: Some(r.tone),
                lor_type: Some(r.lor_type),
                strength: Some(r.strength),
                word_count: Some(r.word_count),
                created_at: r.created_at,
            })
            .collect())
    }

    async fn count_letters(&self) -> Result<i64, StoreError> {
        self.check_reachable()?;
        Ok(self.letters.lock().unwrap().len() as i64)
    }
}
