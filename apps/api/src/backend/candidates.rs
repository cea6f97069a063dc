//! Client for the assigned-candidate listing.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::backend::{api_error, build_http_client, join_url, BackendError};
use crate::models::Candidate;

const ASSIGNED_ENDPOINT: &str = "/panel/assigned-candidates";

#[derive(Debug, Deserialize)]
struct AssignedResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Clone)]
pub struct CandidateClient {
    client: Client,
    base_url: String,
}

impl CandidateClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, BackendError> {
        Ok(Self {
            client: build_http_client(timeout)?,
            base_url: base_url.into(),
        })
    }

    /// Candidates assigned to `panel_member_id`. A missing `candidates`
    /// field reads as an empty list.
    pub async fn assigned_to(
        &self,
        panel_member_id: i64,
        auth_token: &str,
    ) -> Result<Vec<Candidate>, BackendError> {
        let response = self
            .client
            .get(join_url(&self.base_url, ASSIGNED_ENDPOINT))
            .query(&[("id", panel_member_id)])
            .bearer_auth(auth_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let body: AssignedResponse = response
            .json()
            .await
            .map_err(|_| BackendError::InvalidResponseShape)?;
        Ok(body.candidates)
    }
}
