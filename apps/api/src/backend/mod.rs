//! HTTP clients for the services the panel console talks to.
//!
//! - `generation` — the panel service that produces MCQ and interview questions.
//! - `question_bank` — the service of record for saved question sets.
//! - `candidates` — the read-only assigned-candidate listing.
//!
//! No other module issues outbound HTTP requests.

use std::time::Duration;

use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

pub mod candidates;
pub mod generation;
pub mod question_bank;

pub use candidates::CandidateClient;
pub use generation::{PanelServiceClient, QuestionGenerator};
pub use question_bank::{QuestionBank, QuestionBankClient};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {}", message.as_deref().unwrap_or("no message"))]
    Api { status: u16, message: Option<String> },

    #[error("Invalid response format from server")]
    InvalidResponseShape,

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl BackendError {
    /// The text shown to the operator: whatever the backend said, else `fallback`.
    pub fn operator_message(&self, fallback: &str) -> String {
        match self {
            BackendError::Api {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// Error envelope. The generation and bank services answer `{error}`, the
/// candidate service answers `{message, status}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<Value>,
    message: Option<Value>,
}

pub(crate) fn build_http_client(timeout: Duration) -> Result<Client, BackendError> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// Turns a non-2xx response into `BackendError::Api`, keeping the
/// backend-supplied message when the body carries one.
pub(crate) async fn api_error(response: Response) -> BackendError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| {
            b.error
                .as_ref()
                .and_then(Value::as_str)
                .or_else(|| b.message.as_ref().and_then(Value::as_str))
                .map(String::from)
        });
    BackendError::Api { status, message }
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}
