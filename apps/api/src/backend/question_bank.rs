//! Client for the question-bank service, the system of record for
//! submitted working sets.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::backend::{api_error, build_http_client, join_url, BackendError};
use crate::models::{Question, QuestionKind, QuestionSet};

const SAVE_INTERVIEW_ENDPOINT: &str = "/api/save_questions";
const SAVE_MCQ_ENDPOINT: &str = "/api/save-selected-questions";
const LIST_ENDPOINT: &str = "/api/questions";

#[async_trait]
pub trait QuestionBank: Send + Sync {
    /// Stores `questions` under `title`; returns the bank's confirmation message.
    async fn save(
        &self,
        kind: QuestionKind,
        title: &str,
        questions: &[Question],
    ) -> Result<String, BackendError>;

    /// Lists saved sets, optionally only those of one kind.
    async fn list(&self, kind: Option<QuestionKind>) -> Result<Vec<QuestionSet>, BackendError>;
}

// The two save routes differ only in the name of the title field.
#[derive(Debug, Serialize)]
struct SaveInterviewBody<'a> {
    question_title: &'a str,
    questions: &'a [Question],
}

#[derive(Debug, Serialize)]
struct SaveMcqBody<'a> {
    file_name: &'a str,
    questions: &'a [Question],
}

#[derive(Debug, Deserialize)]
struct SaveResponse {
    message: String,
}

#[derive(Clone)]
pub struct QuestionBankClient {
    client: Client,
    base_url: String,
}

impl QuestionBankClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, BackendError> {
        Ok(Self {
            client: build_http_client(timeout)?,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl QuestionBank for QuestionBankClient {
    async fn save(
        &self,
        kind: QuestionKind,
        title: &str,
        questions: &[Question],
    ) -> Result<String, BackendError> {
        let request = match kind {
            QuestionKind::Interview => self
                .client
                .post(join_url(&self.base_url, SAVE_INTERVIEW_ENDPOINT))
                .json(&SaveInterviewBody {
                    question_title: title,
                    questions,
                }),
            QuestionKind::MultipleChoice => self
                .client
                .post(join_url(&self.base_url, SAVE_MCQ_ENDPOINT))
                .json(&SaveMcqBody {
                    file_name: title,
                    questions,
                }),
        };

        let response = request.send().await?;
        if !response.status().is_success() {
            let err = api_error(response).await;
            warn!(%kind, title, "question bank refused working set: {err}");
            return Err(err);
        }

        let body: SaveResponse = response
            .json()
            .await
            .map_err(|_| BackendError::InvalidResponseShape)?;
        info!(%kind, title, count = questions.len(), "working set stored");
        Ok(body.message)
    }

    async fn list(&self, kind: Option<QuestionKind>) -> Result<Vec<QuestionSet>, BackendError> {
        let path = match kind {
            Some(kind) => format!("{LIST_ENDPOINT}/{}", kind.exam_type()),
            None => LIST_ENDPOINT.to_string(),
        };
        let response = self
            .client
            .get(join_url(&self.base_url, &path))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}
