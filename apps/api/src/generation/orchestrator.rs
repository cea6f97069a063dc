//! Generation request orchestrator: sends a validated request to the panel
//! service and tracks the in-flight state. There is no retry; the operator
//! re-invokes, subject to the cooldown.

use std::sync::Arc;

use tracing::{info, warn};

use crate::backend::{BackendError, QuestionGenerator};
use crate::generation::prompt::GenerationRequest;
use crate::loading::{LoadingFlag, LoadingGuard};
use crate::models::{Question, QuestionKind};

/// The ordered questions returned by one generation request.
#[derive(Debug, Clone)]
pub struct GenerationBatch {
    pub kind: QuestionKind,
    pub topic: String,
    pub questions: Vec<Question>,
}

pub struct GenerationOrchestrator {
    generator: Arc<dyn QuestionGenerator>,
    loading: LoadingFlag,
}

impl GenerationOrchestrator {
    pub fn new(generator: Arc<dyn QuestionGenerator>) -> Self {
        Self {
            generator,
            loading: LoadingFlag::default(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_loading()
    }

    /// Claims the single generation slot. `None` while another request is
    /// in flight.
    pub fn begin(&self) -> Option<InFlightGeneration> {
        self.loading.try_begin().map(|guard| InFlightGeneration {
            generator: self.generator.clone(),
            _guard: guard,
        })
    }
}

/// A claimed generation slot. The loading flag drops with it.
pub struct InFlightGeneration {
    generator: Arc<dyn QuestionGenerator>,
    _guard: LoadingGuard,
}

impl InFlightGeneration {
    pub async fn run(
        self,
        request: &GenerationRequest,
        auth_token: &str,
    ) -> Result<GenerationBatch, BackendError> {
        info!(
            kind = %request.kind(),
            topic = request.topic(),
            count = request.count(),
            "dispatching generation request"
        );

        match self.generator.generate(request, auth_token).await {
            Ok(questions) => {
                info!(received = questions.len(), "generation succeeded");
                Ok(GenerationBatch {
                    kind: request.kind(),
                    topic: request.topic().to_string(),
                    questions,
                })
            }
            Err(e) => {
                warn!("generation failed: {e}");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;

    /// Scripted generator: answers each call with the next queued result,
    /// optionally waiting for `release` first.
    #[derive(Default)]
    pub struct ScriptedGenerator {
        pub calls: AtomicUsize,
        pub replies: Mutex<Vec<Result<Vec<Question>, BackendError>>>,
        pub gate: Option<Arc<Notify>>,
    }

    impl ScriptedGenerator {
        pub fn replying(reply: Result<Vec<Question>, BackendError>) -> Self {
            Self {
                replies: Mutex::new(vec![reply]),
                ..Default::default()
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl QuestionGenerator for ScriptedGenerator {
        async fn generate(
            &self,
            _request: &GenerationRequest,
            _auth_token: &str,
        ) -> Result<Vec<Question>, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            let mut replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                Err(BackendError::InvalidResponseShape)
            } else {
                replies.remove(0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::ScriptedGenerator;
    use super::*;
    use crate::generation::prompt::interpret;
    use crate::models::question::fixtures::mcq;
    use tokio::sync::Notify;

    #[tokio::test]
    async fn test_successful_run_returns_batch_of_request_kind() {
        let generator = Arc::new(ScriptedGenerator::replying(Ok(vec![mcq("Q1"), mcq("Q2")])));
        let orchestrator = GenerationOrchestrator::new(generator.clone());

        let request = interpret("Generate 10 MCQ about Java basics").unwrap();
        let batch = orchestrator.begin().unwrap().run(&request, "t").await.unwrap();

        assert_eq!(batch.kind, QuestionKind::MultipleChoice);
        assert_eq!(batch.topic, "Java basics");
        assert_eq!(batch.questions.len(), 2);
        assert_eq!(generator.call_count(), 1);
        assert!(!orchestrator.is_loading());
    }

    #[tokio::test]
    async fn test_loading_flag_spans_the_call_and_blocks_a_second_request() {
        let gate = Arc::new(Notify::new());
        let generator = Arc::new(ScriptedGenerator {
            replies: std::sync::Mutex::new(vec![Ok(vec![mcq("Q")])]),
            gate: Some(gate.clone()),
            ..Default::default()
        });
        let orchestrator = Arc::new(GenerationOrchestrator::new(generator));
        let request = interpret("Generate 10 MCQ about Go").unwrap();

        let in_flight = orchestrator.begin().unwrap();
        assert!(orchestrator.is_loading());
        assert!(orchestrator.begin().is_none());

        let task = tokio::spawn(async move { in_flight.run(&request, "t").await });
        gate.notify_one();
        task.await.unwrap().unwrap();

        assert!(!orchestrator.is_loading());
        assert!(orchestrator.begin().is_some());
    }

    #[tokio::test]
    async fn test_failure_releases_loading_flag() {
        let generator = Arc::new(ScriptedGenerator::replying(Err(
            BackendError::InvalidResponseShape,
        )));
        let orchestrator = GenerationOrchestrator::new(generator);
        let request = interpret("Generate 10 MCQ about Go").unwrap();

        let result = orchestrator.begin().unwrap().run(&request, "t").await;
        assert!(matches!(result, Err(BackendError::InvalidResponseShape)));
        assert!(!orchestrator.is_loading());
    }
}
