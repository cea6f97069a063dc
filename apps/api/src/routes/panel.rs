use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::backend::BackendError;
use crate::curation::submission::SubmissionReceipt;
use crate::errors::AppError;
use crate::models::{Candidate, QuestionIdentity, QuestionKind, QuestionSet};
use crate::routes::session_context::SessionContext;
use crate::session::{GenerationOutcome, SelectionOutcome, SessionView};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
}

#[derive(Deserialize)]
pub struct RemoveRequest {
    pub identity: QuestionIdentity,
    #[serde(default)]
    pub kind: Option<QuestionKind>,
}

#[derive(Deserialize, Default)]
pub struct KindRequest {
    #[serde(default)]
    pub kind: Option<QuestionKind>,
}

#[derive(Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub kind: Option<QuestionKind>,
}

#[derive(Deserialize)]
pub struct QuestionSetQuery {
    pub exam_type: Option<QuestionKind>,
}

#[derive(Serialize)]
pub struct GenerateResponse {
    #[serde(flatten)]
    pub outcome: GenerationOutcome,
    pub view: SessionView,
}

#[derive(Serialize)]
pub struct CandidateListResponse {
    pub candidates: Vec<Candidate>,
}

#[derive(Serialize)]
pub struct QuestionSetListResponse {
    pub question_sets: Vec<QuestionSet>,
}

/// POST /api/v1/panel/generate
pub async fn handle_generate(
    State(state): State<AppState>,
    ctx: SessionContext,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    let outcome = state.session.generate(&req.prompt, &ctx.auth_token).await?;
    info!(kind = %outcome.kind, count = outcome.count, "{}", outcome.message);
    let view = state.session.view().await;
    Ok(Json(GenerateResponse { outcome, view }))
}

/// GET /api/v1/panel/state
pub async fn handle_get_state(
    State(state): State<AppState>,
    _ctx: SessionContext,
) -> Json<SessionView> {
    Json(state.session.view().await)
}

/// POST /api/v1/panel/navigator/next
pub async fn handle_next(State(state): State<AppState>, _ctx: SessionContext) -> Json<SessionView> {
    Json(state.session.next().await)
}

/// POST /api/v1/panel/navigator/previous
pub async fn handle_previous(
    State(state): State<AppState>,
    _ctx: SessionContext,
) -> Json<SessionView> {
    Json(state.session.previous().await)
}

/// POST /api/v1/panel/selection
pub async fn handle_select(
    State(state): State<AppState>,
    _ctx: SessionContext,
) -> Result<Json<SelectionOutcome>, AppError> {
    Ok(Json(state.session.select_current().await?))
}

/// DELETE /api/v1/panel/selection
pub async fn handle_remove(
    State(state): State<AppState>,
    _ctx: SessionContext,
    Json(req): Json<RemoveRequest>,
) -> Json<SelectionOutcome> {
    Json(state.session.remove(req.kind, &req.identity).await)
}

/// POST /api/v1/panel/selection/complete
pub async fn handle_complete(
    State(state): State<AppState>,
    _ctx: SessionContext,
    req: Option<Json<KindRequest>>,
) -> Json<SelectionOutcome> {
    let kind = req.and_then(|Json(r)| r.kind);
    Json(state.session.complete_selection(kind).await)
}

/// POST /api/v1/panel/submit
pub async fn handle_submit(
    State(state): State<AppState>,
    _ctx: SessionContext,
    Json(req): Json<SubmitRequest>,
) -> Result<Json<SubmissionReceipt>, AppError> {
    let receipt = state.session.submit(req.kind, &req.name).await?;
    Ok(Json(receipt))
}

/// GET /api/v1/panel/candidates
pub async fn handle_candidates(
    State(state): State<AppState>,
    ctx: SessionContext,
) -> Result<Json<CandidateListResponse>, AppError> {
    let panel_member_id = ctx.require_panel_member()?;
    let candidates = state
        .candidates
        .assigned_to(panel_member_id, &ctx.auth_token)
        .await
        .map_err(|e| upstream(e, "Failed to fetch candidates"))?;
    Ok(Json(CandidateListResponse { candidates }))
}

/// GET /api/v1/panel/question-sets
pub async fn handle_question_sets(
    State(state): State<AppState>,
    _ctx: SessionContext,
    Query(params): Query<QuestionSetQuery>,
) -> Result<Json<QuestionSetListResponse>, AppError> {
    let question_sets = state
        .question_bank
        .list(params.exam_type)
        .await
        .map_err(|e| upstream(e, "Failed to fetch questions"))?;
    Ok(Json(QuestionSetListResponse { question_sets }))
}

fn upstream(err: BackendError, fallback: &str) -> AppError {
    AppError::Upstream(err.operator_message(fallback))
}
