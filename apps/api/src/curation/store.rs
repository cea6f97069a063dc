//! Curation store: the operator's deduplicated, insertion-ordered working
//! set, mirrored to a durable local store after every mutation.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::curation::durable::DurableStore;
use crate::models::{Question, QuestionIdentity, QuestionKind};

pub const MCQ_SELECTION_KEY: &str = "selectedQuestions";
pub const INTERVIEW_SELECTION_KEY: &str = "selectedInterviewQuestions";

pub fn storage_key(kind: QuestionKind) -> &'static str {
    match kind {
        QuestionKind::MultipleChoice => MCQ_SELECTION_KEY,
        QuestionKind::Interview => INTERVIEW_SELECTION_KEY,
    }
}

pub struct CurationStore {
    kind: QuestionKind,
    entries: Vec<Question>,
    durable: Arc<dyn DurableStore>,
}

impl CurationStore {
    /// Restores the working set of `kind` saved by an earlier session.
    ///
    /// Absent, unreadable or malformed data yields an empty set and the bad
    /// value is discarded. The recovery is logged, never reported.
    pub async fn load(kind: QuestionKind, durable: Arc<dyn DurableStore>) -> Self {
        let key = storage_key(kind);
        let entries = match durable.get(key).await {
            Ok(None) => Vec::new(),
            Ok(Some(raw)) => match Question::parse_list(kind, &raw) {
                Ok(questions) => dedup(questions),
                Err(e) => {
                    warn!(key, "discarding malformed cached selection: {e}");
                    discard(durable.as_ref(), key).await;
                    Vec::new()
                }
            },
            Err(e) => {
                warn!(key, "cached selection unreadable: {e}");
                discard(durable.as_ref(), key).await;
                Vec::new()
            }
        };
        debug!(key, restored = entries.len(), "curation store loaded");

        Self {
            kind,
            entries,
            durable,
        }
    }

    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    pub fn entries(&self) -> &[Question] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, identity: &QuestionIdentity) -> bool {
        self.entries.iter().any(|q| &q.identity() == identity)
    }

    /// Appends `question` unless its identity is already present. Returns
    /// whether the set changed.
    pub async fn select(&mut self, question: Question) -> bool {
        debug_assert_eq!(question.kind(), self.kind);
        if self.contains(&question.identity()) {
            return false;
        }
        self.entries.push(question);
        self.persist().await;
        true
    }

    /// Removes the entry with `identity`. Returns whether one was present.
    pub async fn remove(&mut self, identity: &QuestionIdentity) -> bool {
        let before = self.entries.len();
        self.entries.retain(|q| &q.identity() != identity);
        self.persist().await;
        self.entries.len() != before
    }

    /// Drops the entries that were handed off, keeping anything selected
    /// since. Behaves as `clear` when nothing else was added.
    pub async fn retire(&mut self, handed_off: &[QuestionIdentity]) {
        self.entries.retain(|q| !handed_off.contains(&q.identity()));
        if self.entries.is_empty() {
            discard(self.durable.as_ref(), storage_key(self.kind)).await;
        } else {
            self.persist().await;
        }
    }

    /// Empties the set and drops the durable copy.
    pub async fn clear(&mut self) {
        self.entries.clear();
        discard(self.durable.as_ref(), storage_key(self.kind)).await;
    }

    /// Overwrites the durable copy with the in-memory set. A failed write
    /// only costs crash recovery, so it is logged and otherwise ignored.
    pub async fn persist(&self) {
        let key = storage_key(self.kind);
        let written = match serde_json::to_string(&self.entries) {
            Ok(raw) => self.durable.set(key, &raw).await.map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        match written {
            Ok(()) => debug!(key, entries = self.entries.len(), "selection persisted"),
            Err(e) => warn!(key, "failed to persist selection: {e}"),
        }
    }
}

async fn discard(durable: &dyn DurableStore, key: &str) {
    if let Err(e) = durable.remove(key).await {
        warn!(key, "failed to remove cached selection: {e}");
    }
}

/// Keeps the first occurrence of each identity.
fn dedup(questions: Vec<Question>) -> Vec<Question> {
    let mut seen = HashSet::new();
    questions
        .into_iter()
        .filter(|q| seen.insert(q.identity()))
        .collect()
}
