//! Submission pipeline: hands a named working set to the question bank.
//! Validation failures never reach the network.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::backend::{BackendError, QuestionBank};
use crate::loading::{LoadingFlag, LoadingGuard};
use crate::models::{Question, QuestionIdentity, QuestionKind};

pub const SAVE_FAILED_MESSAGE: &str = "Failed to save questions";

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("File name is required!")]
    NameRequired,

    #[error("No questions selected to save")]
    EmptySelection,

    #[error("A submission is already in progress")]
    InFlight,

    #[error("Failed to save questions: {0}")]
    Backend(#[from] BackendError),
}

impl SubmissionError {
    pub fn operator_message(&self) -> String {
        match self {
            SubmissionError::Backend(e) => e.operator_message(SAVE_FAILED_MESSAGE),
            other => other.to_string(),
        }
    }
}

/// What the bank confirmed for a stored working set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionReceipt {
    pub kind: QuestionKind,
    pub title: String,
    pub submitted: usize,
    pub message: String,
}

pub struct SubmissionPipeline {
    question_bank: Arc<dyn QuestionBank>,
    loading: LoadingFlag,
}

impl SubmissionPipeline {
    pub fn new(question_bank: Arc<dyn QuestionBank>) -> Self {
        Self {
            question_bank,
            loading: LoadingFlag::default(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_loading()
    }

    /// Validates `name` and `entries` and claims the submission slot. The
    /// entries are snapshotted so the caller can release its own locks
    /// before the network call.
    pub fn begin(
        &self,
        kind: QuestionKind,
        name: &str,
        entries: &[Question],
    ) -> Result<PendingSubmission, SubmissionError> {
        let title = name.trim();
        if title.is_empty() {
            return Err(SubmissionError::NameRequired);
        }
        if entries.is_empty() {
            return Err(SubmissionError::EmptySelection);
        }
        let guard = self.loading.try_begin().ok_or(SubmissionError::InFlight)?;

        Ok(PendingSubmission {
            question_bank: self.question_bank.clone(),
            kind,
            title: title.to_string(),
            entries: entries.to_vec(),
            _guard: guard,
        })
    }
}

pub struct PendingSubmission {
    question_bank: Arc<dyn QuestionBank>,
    kind: QuestionKind,
    title: String,
    entries: Vec<Question>,
    _guard: LoadingGuard,
}

impl PendingSubmission {
    /// Identities of the snapshotted entries.
    pub fn identities(&self) -> Vec<QuestionIdentity> {
        self.entries.iter().map(Question::identity).collect()
    }

    /// Sends the snapshot. The submission slot stays claimed until this
    /// value is dropped, so the caller can clear its working set first.
    pub async fn send(&self) -> Result<SubmissionReceipt, SubmissionError> {
        match self
            .question_bank
            .save(self.kind, &self.title, &self.entries)
            .await
        {
            Ok(message) => {
                info!(kind = %self.kind, title = %self.title, "working set submitted");
                Ok(SubmissionReceipt {
                    kind: self.kind,
                    title: self.title.clone(),
                    submitted: self.entries.len(),
                    message,
                })
            }
            Err(e) => {
                warn!(kind = %self.kind, title = %self.title, "submission failed: {e}");
                Err(e.into())
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::RecordingBank;
    use super::*;
    use crate::models::question::fixtures::interview;

    #[test]
    fn test_empty_name_is_rejected_locally() {
        let bank = Arc::new(RecordingBank::default());
        let pipeline = SubmissionPipeline::new(bank.clone());
        for name in ["", "   "] {
            assert!(matches!(
                pipeline.begin(QuestionKind::Interview, name, &[interview(1, "Q")]),
                Err(SubmissionError::NameRequired)
            ));
        }
        assert_eq!(bank.call_count(), 0);
        assert!(!pipeline.is_loading());
    }

    #[test]
    fn test_empty_selection_is_rejected_locally() {
        let bank = Arc::new(RecordingBank::default());
        let pipeline = SubmissionPipeline::new(bank.clone());
        let err = pipeline
            .begin(QuestionKind::Interview, "round-1", &[])
            .err()
            .unwrap();
        assert!(matches!(err, SubmissionError::EmptySelection));
        assert_eq!(err.operator_message(), "No questions selected to save");
        assert_eq!(bank.call_count(), 0);
    }

    #[tokio::test]
    async fn test_successful_send_returns_bank_message() {
        let bank = Arc::new(RecordingBank::default());
        let pipeline = SubmissionPipeline::new(bank.clone());
        let pending = pipeline
            .begin(
                QuestionKind::Interview,
                "  round-1 ",
                &[interview(1, "Q1"), interview(2, "Q2")],
            )
            .unwrap();
        assert!(pipeline.is_loading());

        let receipt = pending.send().await.unwrap();
        assert_eq!(receipt.message, "Question saved successfully!");
        assert_eq!(receipt.submitted, 2);
        assert_eq!(receipt.title, "round-1");
        assert!(pipeline.is_loading());
        drop(pending);
        assert!(!pipeline.is_loading());

        let saved = bank.saved.lock().unwrap();
        assert_eq!(saved[0].1, "round-1");
        assert_eq!(saved[0].2.len(), 2);
    }

    #[test]
    fn test_second_submission_refused_while_first_in_flight() {
        let pipeline = SubmissionPipeline::new(Arc::new(RecordingBank::default()));
        let entries = [interview(1, "Q")];
        let _first = pipeline
            .begin(QuestionKind::Interview, "a", &entries)
            .unwrap();
        assert!(matches!(
            pipeline.begin(QuestionKind::Interview, "b", &entries),
            Err(SubmissionError::InFlight)
        ));
    }

    #[tokio::test]
    async fn test_backend_failure_surfaces_backend_message() {
        let bank = Arc::new(RecordingBank {
            fail_with: Some("Missing required fields".into()),
            ..Default::default()
        });
        let pipeline = SubmissionPipeline::new(bank);
        let err = pipeline
            .begin(QuestionKind::Interview, "t", &[interview(1, "Q")])
            .unwrap()
            .send()
            .await
            .unwrap_err();
        assert_eq!(err.operator_message(), "Missing required fields");
    }
}
