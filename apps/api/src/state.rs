use std::sync::Arc;

use crate::backend::{CandidateClient, QuestionBank};
use crate::session::PanelSession;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<PanelSession>,
    pub candidates: CandidateClient,
    /// Also used directly for listing saved question sets.
    pub question_bank: Arc<dyn QuestionBank>,
}
