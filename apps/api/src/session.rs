//! The panel session: one operator's generation and curation workspace.
//!
//! Flow: prompt → cooldown gate → generation → navigator → selection →
//! submission. Both working sets are restored from the durable store when
//! the session is created, independent of any generation.
//!
//! Network calls run without holding the workspace lock, so navigation,
//! curation and state reads stay available while a request is in flight.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::backend::{QuestionBank, QuestionGenerator};
use crate::curation::durable::DurableStore;
use crate::curation::navigator::Navigator;
use crate::curation::store::CurationStore;
use crate::curation::submission::{SubmissionPipeline, SubmissionReceipt};
use crate::errors::AppError;
use crate::generation::orchestrator::GenerationOrchestrator;
use crate::generation::prompt::interpret;
use crate::generation::rate_limiter::{CooldownState, RateLimiter};
use crate::models::{Question, QuestionIdentity, QuestionKind};

pub const GENERATION_FAILED_MESSAGE: &str = "Failed to generate questions";
pub const NO_QUESTIONS_MESSAGE: &str = "No questions available";

struct Workspace {
    limiter: RateLimiter,
    navigator: Navigator,
    /// Kind of the last generation batch; selects which working set the
    /// curation operations apply to by default.
    mode: QuestionKind,
    topic: Option<String>,
    mcq: CurationStore,
    interview: CurationStore,
}

impl Workspace {
    fn store(&self, kind: QuestionKind) -> &CurationStore {
        match kind {
            QuestionKind::MultipleChoice => &self.mcq,
            QuestionKind::Interview => &self.interview,
        }
    }

    fn store_mut(&mut self, kind: QuestionKind) -> &mut CurationStore {
        match kind {
            QuestionKind::MultipleChoice => &mut self.mcq,
            QuestionKind::Interview => &mut self.interview,
        }
    }
}

/// The question under the cursor, with the fields the console renders.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentQuestion {
    /// 1-based, as shown in "Question n of total".
    pub number: usize,
    pub identity: QuestionIdentity,
    pub selected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_answer: Option<String>,
    pub question: Question,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub mode: QuestionKind,
    pub topic: Option<String>,
    pub cursor: usize,
    pub total: usize,
    pub current: Option<CurrentQuestion>,
    pub selection: Vec<Question>,
    pub cooldown: CooldownState,
    pub generating: bool,
    pub submitting: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutcome {
    pub kind: QuestionKind,
    pub topic: String,
    pub count: usize,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectionOutcome {
    pub changed: bool,
    pub message: String,
    pub view: SessionView,
}

pub struct PanelSession {
    workspace: Mutex<Workspace>,
    orchestrator: GenerationOrchestrator,
    submission: SubmissionPipeline,
}

impl PanelSession {
    pub async fn new(
        generator: Arc<dyn QuestionGenerator>,
        question_bank: Arc<dyn QuestionBank>,
        durable: Arc<dyn DurableStore>,
        cooldown_secs: u32,
    ) -> Self {
        let mcq = CurationStore::load(QuestionKind::MultipleChoice, durable.clone()).await;
        let interview = CurationStore::load(QuestionKind::Interview, durable).await;
        info!(
            mcq_selected = mcq.len(),
            interview_selected = interview.len(),
            "panel session started"
        );

        Self {
            workspace: Mutex::new(Workspace {
                limiter: RateLimiter::new(cooldown_secs),
                navigator: Navigator::default(),
                mode: QuestionKind::Interview,
                topic: None,
                mcq,
                interview,
            }),
            orchestrator: GenerationOrchestrator::new(generator),
            submission: SubmissionPipeline::new(question_bank),
        }
    }

    /// Interprets `raw_prompt`, passes the cooldown gate and loads the
    /// returned batch into the navigator. A failed request leaves the
    /// navigator and working sets untouched.
    pub async fn generate(
        &self,
        raw_prompt: &str,
        auth_token: &str,
    ) -> Result<GenerationOutcome, AppError> {
        let (in_flight, request) = {
            let mut ws = self.workspace.lock().await;

            // The trigger is disabled while loading or cooling down, so these
            // are checked before the prompt is even read.
            if self.orchestrator.is_loading() {
                return Err(AppError::Busy(
                    "A generation request is already in progress".to_string(),
                ));
            }
            if !ws.limiter.is_open() {
                return Err(AppError::CoolingDown {
                    remaining_seconds: ws.limiter.state().remaining_seconds,
                });
            }

            let request = interpret(raw_prompt)?;
            let in_flight = self.orchestrator.begin().ok_or_else(|| {
                AppError::Busy("A generation request is already in progress".to_string())
            })?;
            ws.limiter
                .dispatch()
                .map_err(|state| AppError::CoolingDown {
                    remaining_seconds: state.remaining_seconds,
                })?;
            (in_flight, request)
        };

        let batch = in_flight
            .run(&request, auth_token)
            .await
            .map_err(|e| AppError::Upstream(e.operator_message(GENERATION_FAILED_MESSAGE)))?;

        let mut ws = self.workspace.lock().await;
        let count = batch.questions.len();
        ws.navigator.reset(batch.questions);
        if ws.navigator.is_empty() {
            warn!("panel service returned an empty batch");
        }
        ws.mode = batch.kind;
        ws.topic = Some(batch.topic.clone());

        Ok(GenerationOutcome {
            kind: batch.kind,
            topic: batch.topic,
            count,
            message: format!("Generated {count} questions!"),
        })
    }

    pub async fn view(&self) -> SessionView {
        let ws = self.workspace.lock().await;
        self.render(&ws)
    }

    pub async fn next(&self) -> SessionView {
        let mut ws = self.workspace.lock().await;
        ws.navigator.next();
        self.render(&ws)
    }

    pub async fn previous(&self) -> SessionView {
        let mut ws = self.workspace.lock().await;
        ws.navigator.previous();
        self.render(&ws)
    }

    /// Adds the question under the cursor to its working set.
    pub async fn select_current(&self) -> Result<SelectionOutcome, AppError> {
        let mut ws = self.workspace.lock().await;
        let question = ws
            .navigator
            .current()
            .cloned()
            .ok_or_else(|| AppError::NotFound(NO_QUESTIONS_MESSAGE.to_string()))?;

        let text = question.text().to_string();
        let changed = ws.store_mut(question.kind()).select(question).await;
        let message = if changed {
            "Question added to selection"
        } else {
            "Question already selected"
        };
        debug!(changed, question = %text, "select current question");

        Ok(SelectionOutcome {
            changed,
            message: message.to_string(),
            view: self.render(&ws),
        })
    }

    /// Removes `identity` from the working set of `kind` (default: the
    /// active mode). Removing an absent identity is a no-op.
    pub async fn remove(
        &self,
        kind: Option<QuestionKind>,
        identity: &QuestionIdentity,
    ) -> SelectionOutcome {
        let mut ws = self.workspace.lock().await;
        let kind = kind.unwrap_or(ws.mode);
        let changed = ws.store_mut(kind).remove(identity).await;
        let message = if changed {
            "Question removed from selection"
        } else {
            "Question was not selected"
        };

        SelectionOutcome {
            changed,
            message: message.to_string(),
            view: self.render(&ws),
        }
    }

    /// Drops the working set without submitting it.
    pub async fn complete_selection(&self, kind: Option<QuestionKind>) -> SelectionOutcome {
        let mut ws = self.workspace.lock().await;
        let kind = kind.unwrap_or(ws.mode);
        let changed = !ws.store(kind).is_empty();
        ws.store_mut(kind).clear().await;
        info!(%kind, "selection completed");

        SelectionOutcome {
            changed,
            message: "Selection completed!".to_string(),
            view: self.render(&ws),
        }
    }

    /// Submits the working set of `kind` (default: the active mode) under
    /// `name`. On success the submitted questions leave the set; anything
    /// selected while the request was in flight stays. On failure the set
    /// is left intact for a retry.
    pub async fn submit(
        &self,
        kind: Option<QuestionKind>,
        name: &str,
    ) -> Result<SubmissionReceipt, AppError> {
        let pending = {
            let ws = self.workspace.lock().await;
            let store = ws.store(kind.unwrap_or(ws.mode));
            self.submission.begin(store.kind(), name, store.entries())?
        };

        let receipt = pending.send().await?;

        let mut ws = self.workspace.lock().await;
        ws.store_mut(receipt.kind)
            .retire(&pending.identities())
            .await;
        drop(pending);
        Ok(receipt)
    }

    fn render(&self, ws: &Workspace) -> SessionView {
        let store = ws.store(ws.mode);
        let current = ws.navigator.current().map(|q| {
            let identity = q.identity();
            CurrentQuestion {
                number: ws.navigator.cursor() + 1,
                selected: ws.store(q.kind()).contains(&identity),
                identity,
                display_type: q.display_type().map(String::from),
                display_answer: q.display_answer().map(String::from),
                question: q.clone(),
            }
        });

        SessionView {
            mode: ws.mode,
            topic: ws.topic.clone(),
            cursor: ws.navigator.cursor(),
            total: ws.navigator.len(),
            current,
            selection: store.entries().to_vec(),
            cooldown: ws.limiter.state(),
            generating: self.orchestrator.is_loading(),
            submitting: self.submission.is_loading(),
        }
    }
}
