//! Client for the panel generation service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::backend::{api_error, build_http_client, join_url, BackendError};
use crate::generation::prompt::GenerationRequest;
use crate::models::{Question, QuestionKind};

const MCQ_ENDPOINT: &str = "/api/panel/generate-question";
const INTERVIEW_ENDPOINT: &str = "/api/panel/generate-interview-questions";

/// Produces a generation batch for a validated request.
///
/// Carried by the session as `Arc<dyn QuestionGenerator>` so tests can swap
/// in a scripted backend.
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    async fn generate(
        &self,
        request: &GenerationRequest,
        auth_token: &str,
    ) -> Result<Vec<Question>, BackendError>;
}

#[derive(Debug, Serialize)]
struct GenerateBody<'a> {
    prompt: &'a str,
    num_questions: u32,
}

#[derive(Clone)]
pub struct PanelServiceClient {
    client: Client,
    base_url: String,
}

impl PanelServiceClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, BackendError> {
        Ok(Self {
            client: build_http_client(timeout)?,
            base_url: base_url.into(),
        })
    }

    fn endpoint(kind: QuestionKind) -> &'static str {
        match kind {
            QuestionKind::MultipleChoice => MCQ_ENDPOINT,
            QuestionKind::Interview => INTERVIEW_ENDPOINT,
        }
    }
}

#[async_trait]
impl QuestionGenerator for PanelServiceClient {
    async fn generate(
        &self,
        request: &GenerationRequest,
        auth_token: &str,
    ) -> Result<Vec<Question>, BackendError> {
        let url = join_url(&self.base_url, Self::endpoint(request.kind()));
        debug!(%url, topic = request.topic(), count = request.count(), "requesting generation");

        let response = self
            .client
            .post(&url)
            .bearer_auth(auth_token)
            .json(&GenerateBody {
                prompt: request.topic(),
                num_questions: request.count(),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let err = api_error(response).await;
            warn!("generation service rejected request: {err}");
            return Err(err);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|_| BackendError::InvalidResponseShape)?;
        parse_batch(request.kind(), body)
    }
}

/// Accepts only `{success: true, questions: [...]}` with every item in the
/// wire shape of `kind`.
fn parse_batch(kind: QuestionKind, body: Value) -> Result<Vec<Question>, BackendError> {
    let success = body.get("success").and_then(Value::as_bool).unwrap_or(false);
    let Some(items) = body.get("questions").and_then(Value::as_array) else {
        return Err(BackendError::InvalidResponseShape);
    };
    if !success {
        return Err(BackendError::InvalidResponseShape);
    }

    items
        .iter()
        .cloned()
        .map(|item| Question::from_value(kind, item).map_err(|_| BackendError::InvalidResponseShape))
        .collect()
}
