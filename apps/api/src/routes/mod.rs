pub mod health;
pub mod panel;
pub mod session_context;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Generation
        .route("/api/v1/panel/generate", post(panel::handle_generate))
        .route("/api/v1/panel/state", get(panel::handle_get_state))
        // Navigation
        .route("/api/v1/panel/navigator/next", post(panel::handle_next))
        .route(
            "/api/v1/panel/navigator/previous",
            post(panel::handle_previous),
        )
        // Curation
        .route(
            "/api/v1/panel/selection",
            post(panel::handle_select).delete(panel::handle_remove),
        )
        .route(
            "/api/v1/panel/selection/complete",
            post(panel::handle_complete),
        )
        .route("/api/v1/panel/submit", post(panel::handle_submit))
        // Lookups
        .route("/api/v1/panel/candidates", get(panel::handle_candidates))
        .route(
            "/api/v1/panel/question-sets",
            get(panel::handle_question_sets),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        body::{to_bytes, Body},
        extract::Query,
        http::{Request, StatusCode},
        Json,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::backend::test_support::spawn_backend;
    use crate::backend::CandidateClient;
    use crate::curation::durable::MemoryStore;
    use crate::curation::submission::test_support::RecordingBank;
    use crate::generation::orchestrator::test_support::ScriptedGenerator;
    use crate::models::question::fixtures::interview;
    use crate::session::PanelSession;

    async fn app_with(
        generator: ScriptedGenerator,
        candidate_url: &str,
    ) -> (Router, Arc<RecordingBank>) {
        let bank = Arc::new(RecordingBank::default());
        let session = PanelSession::new(
            Arc::new(generator),
            bank.clone(),
            Arc::new(MemoryStore::default()),
            30,
        )
        .await;
        let state = AppState {
            session: Arc::new(session),
            candidates: CandidateClient::new(candidate_url, Duration::from_secs(5)).unwrap(),
            question_bank: bank.clone(),
        };
        (build_router(state), bank)
    }

    async fn app() -> Router {
        app_with(ScriptedGenerator::default(), "http://127.0.0.1:9")
            .await
            .0
    }

    fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", "Bearer test-token");
        match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_needs_no_token() {
        let response = app()
            .await
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_panel_routes_require_bearer_token() {
        let response = app()
            .await
            .oneshot(
                Request::get("/api/v1/panel/state")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_generate_rejects_out_of_range_count() {
        let response = app()
            .await
            .oneshot(request(
                "POST",
                "/api/v1/panel/generate",
                Some(json!({ "prompt": "Generate 20 MCQ about SQL" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["error"]["message"],
            "Maximum 15 questions allowed. Please modify your prompt."
        );
    }

    #[tokio::test]
    async fn test_generate_then_select_and_submit() {
        let batch = (1..=10).map(|i| interview(i, &format!("Q{i}"))).collect();
        let (router, bank) =
            app_with(ScriptedGenerator::replying(Ok(batch)), "http://127.0.0.1:9").await;

        let response = router
            .clone()
            .oneshot(request(
                "POST",
                "/api/v1/panel/generate",
                Some(json!({ "prompt": "Generate 10 interview questions about Rust" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Generated 10 questions!");
        assert_eq!(body["view"]["total"], 10);
        assert_eq!(body["view"]["cooldown"]["locked"], true);

        let response = router
            .clone()
            .oneshot(request("POST", "/api/v1/panel/selection", None))
            .await
            .unwrap();
        assert_eq!(json_body(response).await["changed"], true);

        let response = router
            .clone()
            .oneshot(request(
                "DELETE",
                "/api/v1/panel/selection",
                Some(json!({ "identity": { "id": 2 } })),
            ))
            .await
            .unwrap();
        assert_eq!(json_body(response).await["changed"], false);

        let response = router
            .clone()
            .oneshot(request(
                "POST",
                "/api/v1/panel/submit",
                Some(json!({ "name": "rust-round-1" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["submitted"], 1);
        assert_eq!(bank.call_count(), 1);

        let response = router
            .oneshot(request(
                "POST",
                "/api/v1/panel/generate",
                Some(json!({ "prompt": "Generate 10 interview questions about Rust" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_select_with_no_batch_is_not_found() {
        let response = app()
            .await
            .oneshot(request("POST", "/api/v1/panel/selection", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_candidates_require_panel_member_header() {
        let response = app()
            .await
            .oneshot(request("GET", "/api/v1/panel/candidates", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["error"]["message"],
            "Panel member ID not found"
        );
    }

    #[derive(serde::Deserialize)]
    struct AssignedQuery {
        id: i64,
    }

    #[tokio::test]
    async fn test_candidates_forward_panel_member_id() {
        let backend = Router::new().route(
            "/panel/assigned-candidates",
            get(|Query(q): Query<AssignedQuery>| async move {
                Json(json!({ "candidates": [{ "name": format!("candidate-of-{}", q.id) }] }))
            }),
        );
        let url = spawn_backend(backend).await;
        let (router, _) = app_with(ScriptedGenerator::default(), &url).await;

        let mut req = request("GET", "/api/v1/panel/candidates", None);
        req.headers_mut()
            .insert("x-panel-member-id", "42".parse().unwrap());
        let response = router.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await["candidates"][0]["name"],
            "candidate-of-42"
        );
    }
}
