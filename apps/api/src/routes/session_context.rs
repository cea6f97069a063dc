use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::errors::AppError;

pub const PANEL_MEMBER_HEADER: &str = "x-panel-member-id";

/// Authenticated-session context: the bearer token forwarded to every
/// backend call and, when sent, the signed-in panel member's id.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub auth_token: String,
    pub panel_member_id: Option<i64>,
}

impl SessionContext {
    pub fn require_panel_member(&self) -> Result<i64, AppError> {
        self.panel_member_id
            .ok_or_else(|| AppError::Validation("Panel member ID not found".to_string()))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AppError::Unauthorized)?
            .to_string();

        let panel_member_id = match parts.headers.get(PANEL_MEMBER_HEADER) {
            None => None,
            Some(raw) => Some(
                raw.to_str()
                    .ok()
                    .and_then(|v| v.trim().parse::<i64>().ok())
                    .ok_or_else(|| {
                        AppError::Validation("Invalid panel member ID".to_string())
                    })?,
            ),
        };

        Ok(Self {
            auth_token,
            panel_member_id,
        })
    }
}
