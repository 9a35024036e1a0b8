//! Persistence: best-effort recording of generated letters plus the
//! paginated read path.
//!
//! `Persistence` is the handle request handlers receive through `AppState`. It
//! owns the datastore (if one is configured) together with a reachability value
//! that the startup probe and the probe endpoint set explicitly, and that any
//! connection-level failure clears. Writes never surface an error: they report a
//! `PersistOutcome` instead.

pub mod store;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::ReprobePolicy;
use crate::models::letter::{LetterPage, LetterRecord, Pagination, UsageRecord};
use store::{LetterStore, StoreError};

/// What happened to a best-effort write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    Persisted,
    Skipped(String),
    Failed(String),
}

#[derive(Clone)]
pub struct Persistence {
    store: Option<Arc<dyn LetterStore>>,
    reachable: Arc<AtomicBool>,
    reprobe: ReprobePolicy,
}

impl Persistence {
    /// Handle over a configured store. Considered reachable until a probe or a
    /// connection failure says otherwise.
    pub fn new(store: Arc<dyn LetterStore>, reprobe: ReprobePolicy) -> Self {
        Self {
            store: Some(store),
            reachable: Arc::new(AtomicBool::new(true)),
            reprobe,
        }
    }

    /// Handle with no datastore; every write is skipped and reads fail.
    pub fn disabled() -> Self {
        Self {
            store: None,
            reachable: Arc::new(AtomicBool::new(false)),
            reprobe: ReprobePolicy::Never,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some() && self.reachable.load(Ordering::Relaxed)
    }

    /// Round-trips to the datastore and records the result.
    pub async fn probe(&self) -> Result<(), StoreError> {
        let Some(store) = &self.store else {
            return Err(StoreError::Connection("no datastore configured".to_string()));
        };

        match store.ping().await {
            Ok(()) => {
                self.reachable.store(true, Ordering::Relaxed);
                info!("Datastore reachable");
                Ok(())
            }
            Err(e) => {
                self.reachable.store(false, Ordering::Relaxed);
                warn!("Datastore probe failed: {e}");
                Err(e)
            }
        }
    }

    /// Attempts both inserts independently. Never fails.
    pub async fn record(&self, letter: &LetterRecord, usage: &UsageRecord) -> PersistOutcome {
        let Some(store) = &self.store else {
            return PersistOutcome::Skipped("persistence not configured".to_string());
        };

        if !self.reachable.load(Ordering::Relaxed) {
            let recovered =
                self.reprobe == ReprobePolicy::OnWrite && self.probe().await.is_ok();
            if !recovered {
                return PersistOutcome::Skipped("datastore marked unreachable".to_string());
            }
        }

        let mut failures = Vec::new();

        if let Err(e) = store.insert_letter(letter).await {
            self.note_failure(&e);
            failures.push(format!("letter insert: {e}"));
        }
        if let Err(e) = store.insert_usage(usage).await {
            self.note_failure(&e);
            failures.push(format!("usage insert: {e}"));
        }

        if failures.is_empty() {
            PersistOutcome::Persisted
        } else {
            PersistOutcome::Failed(failures.join("; "))
        }
    }

    /// One page of letter summaries, newest first, with an exact total.
    pub async fn list_letters(&self, limit: i64, offset: i64) -> Result<LetterPage, StoreError> {
        let store = self
            .store
            .as_ref()
            .ok_or_else(|| StoreError::Connection("no datastore configured".to_string()))?;

        let result: Result<LetterPage, StoreError> = async {
            let letters = store.list_letters(limit, offset).await?;
            let total = store.count_letters().await?;
            Ok(LetterPage {
                letters,
                pagination: Pagination::new(total, limit, offset),
            })
        }
        .await;

        if let Err(e) = &result {
            self.note_failure(e);
        }
        result
    }

    fn note_failure(&self, e: &StoreError) {
        if e.is_connection() && self.reachable.swap(false, Ordering::Relaxed) {
            warn!("Datastore marked unreachable after connection failure: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::letters::models::{GenerationRequest, PromptRequest};
    use crate::test_support::MemoryStore;

    fn records() -> (LetterRecord, UsageRecord) {
        let request = GenerationRequest::Prompt(PromptRequest {
            prompt: "Recommend my colleague".to_string(),
        });
        (
            LetterRecord::new(&request, "wrapped prompt", "Dear Committee"),
            UsageRecord::new("groq", "openai/gpt-oss-120b", "/api/v1/generate", "Dear Committee"),
        )
    }

    #[tokio::test]
    async fn test_disabled_handle_skips_writes() {
        let persistence = Persistence::disabled();
        let (letter, usage) = records();
        assert!(matches!(
            persistence.record(&letter, &usage).await,
            PersistOutcome::Skipped(_)
        ));
        assert!(!persistence.is_enabled());
    }

    #[tokio::test]
    async fn test_successful_record_writes_both_rows() {
        let store = Arc::new(MemoryStore::default());
        let persistence = Persistence::new(store.clone(), ReprobePolicy::Never);
        let (letter, usage) = records();

        assert_eq!(persistence.record(&letter, &usage).await, PersistOutcome::Persisted);
        assert_eq!(store.letter_count(), 1);
        assert_eq!(store.usage_count(), 1);
    }

    #[tokio::test]
    async fn test_letter_failure_still_attempts_usage() {
        let store = Arc::new(MemoryStore::failing_letters());
        let persistence = Persistence::new(store.clone(), ReprobePolicy::Never);
        let (letter, usage) = records();

        let outcome = persistence.record(&letter, &usage).await;
        assert!(matches!(outcome, PersistOutcome::Failed(ref msg) if msg.contains("letter insert")));
        assert_eq!(store.letter_count(), 0);
        assert_eq!(store.usage_count(), 1);
        // A rejected statement is not a connection problem.
        assert!(persistence.is_enabled());
    }

    #[tokio::test]
    async fn test_connection_failure_marks_unreachable_and_later_writes_skip() {
        let store = Arc::new(MemoryStore::unreachable());
        let persistence = Persistence::new(store.clone(), ReprobePolicy::Never);
        let (letter, usage) = records();

        assert!(matches!(
            persistence.record(&letter, &usage).await,
            PersistOutcome::Failed(_)
        ));
        assert!(!persistence.is_enabled());

        store.set_reachable(true);
        assert!(matches!(
            persistence.record(&letter, &usage).await,
            PersistOutcome::Skipped(_)
        ));
        assert_eq!(store.write_attempts(), 2);
    }

    #[tokio::test]
    async fn test_on_write_policy_reprobes_before_skipping() {
        let store = Arc::new(MemoryStore::unreachable());
        let persistence = Persistence::new(store.clone(), ReprobePolicy::OnWrite);
        assert!(persistence.probe().await.is_err());
        assert!(!persistence.is_enabled());

        store.set_reachable(true);
        let (letter, usage) = records();
        assert_eq!(persistence.record(&letter, &usage).await, PersistOutcome::Persisted);
        assert!(persistence.is_enabled());
    }

    #[tokio::test]
    async fn test_explicit_probe_restores_reachability() {
        let store = Arc::new(MemoryStore::unreachable());
        let persistence = Persistence::new(store.clone(), ReprobePolicy::Never);
        assert!(persistence.probe().await.is_err());

        store.set_reachable(true);
        assert!(persistence.probe().await.is_ok());
        assert!(persistence.is_enabled());
    }

    #[tokio::test]
    async fn test_list_letters_pages_newest_first() {
        let store = Arc::new(MemoryStore::with_letters(25));
        let persistence = Persistence::new(store, ReprobePolicy::Never);

        let first = persistence.list_letters(10, 0).await.unwrap();
        assert_eq!(first.letters.len(), 10);
        assert_eq!(first.pagination.total, 25);
        assert!(first.pagination.has_more);
        assert!(first.letters[0].created_at >= first.letters[1].created_at);

        let last = persistence.list_letters(10, 20).await.unwrap();
        assert_eq!(last.letters.len(), 5);
        assert!(!last.pagination.has_more);
    }

    #[tokio::test]
    async fn test_list_letters_without_store_fails() {
        assert!(Persistence::disabled().list_letters(10, 0).await.is_err());
    }
}
