//! Chat API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/` and every request passes through the
//! access logger.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the chat API router.
///
/// NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
pub fn api_router(core: Arc<CoreState>) -> Router {
    let ctx = ApiContext::new(core);

    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/chat/send", post(endpoints::chat::send))
        .route(
            "/chat/sessions/:id",
            get(endpoints::chat::history).delete(endpoints::chat::end),
        )
        .route("/feedback", post(endpoints::feedback::submit))
        .route("/feedback/stats", get(endpoints::feedback::stats))
        .with_state(ctx)
        .layer(axum::middleware::from_fn(middleware::audit::log_access));

    Router::new().nest("/api", routes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::core_state::tests::test_core_state;
    use crate::pipeline::generate::MockGenerator;
    use crate::pipeline::orchestrator::{EMPTY_INPUT_PROMPT, GENERATION_FALLBACK};

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_generator_and_table() {
        let (core, _dir) = test_core_state(MockGenerator::new("x"));
        let app = api_router(core);

        let response = app.oneshot(empty_request("GET", "/api/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], crate::config::APP_VERSION);
        assert_eq!(json["generator_available"], true);
        assert_eq!(json["canned_answers"], 2);
    }

    #[tokio::test]
    async fn send_returns_canned_answer_and_session() {
        let (core, _dir) = test_core_state(MockGenerator::failing());
        let app = api_router(core);

        let response = app
            .oneshot(json_request("POST", "/api/chat/send", json!({"message": "Fever"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["response"], "Stay hydrated and rest.");
        assert_eq!(json["source"]["type"], "canned");
        assert_eq!(json["source"]["match"], "exact");
        assert_eq!(json["history"][0]["role"], "user");
        assert_eq!(json["history"][0]["content"], "fever");
        assert_eq!(json["history"][1]["role"], "assistant");
        assert!(json["session_id"].as_str().unwrap().len() == 36);
    }

    #[tokio::test]
    async fn send_blank_message_returns_prompt() {
        let (core, _dir) = test_core_state(MockGenerator::failing());
        let app = api_router(core);

        let response = app
            .oneshot(json_request("POST", "/api/chat/send", json!({"message": "   "})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["response"], EMPTY_INPUT_PROMPT);
        assert_eq!(json["source"]["type"], "empty_input");
        assert_eq!(json["history"].as_array().unwrap().len(), 0);
        assert!(json["session_id"].is_null());
    }

    #[tokio::test]
    async fn blank_messages_do_not_open_sessions() {
        let (core, _dir) = test_core_state(MockGenerator::failing());
        let app = api_router(core.clone());

        for _ in 0..20 {
            let response = app
                .clone()
                .oneshot(json_request("POST", "/api/chat/send", json!({"message": ""})))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
        assert_eq!(core.session_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn send_with_failing_generator_returns_fallback() {
        let (core, _dir) = test_core_state(MockGenerator::failing());
        let app = api_router(core);

        let response = app
            .oneshot(json_request("POST", "/api/chat/send", json!({"message": "knee sprain"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["response"], GENERATION_FALLBACK);
        assert_eq!(json["source"]["type"], "fallback");
        assert_eq!(json["degradations"][0]["kind"], "generation_failed");
    }

    #[tokio::test]
    async fn send_rejects_malformed_session_id() {
        let (core, _dir) = test_core_state(MockGenerator::new("x"));
        let app = api_router(core);

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/chat/send",
                json!({"session_id": "abc", "message": "fever"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn session_history_accumulates_across_requests() {
        let (core, _dir) = test_core_state(MockGenerator::new("Generated."));
        let app = api_router(core);

        let first = app
            .clone()
            .oneshot(json_request("POST", "/api/chat/send", json!({"message": "fever"})))
            .await
            .unwrap();
        let session_id = body_json(first).await["session_id"]
            .as_str()
            .unwrap()
            .to_string();

        let second = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/chat/send",
                json!({"session_id": session_id, "message": "knee"}),
            ))
            .await
            .unwrap();
        let json = body_json(second).await;
        assert_eq!(json["session_id"], session_id.as_str());
        assert_eq!(json["history"].as_array().unwrap().len(), 4);

        let history = app
            .oneshot(empty_request("GET", &format!("/api/chat/sessions/{session_id}")))
            .await
            .unwrap();
        assert_eq!(history.status(), StatusCode::OK);
        let json = body_json(history).await;
        assert_eq!(json["history"][3]["content"], "Generated.");
    }

    #[tokio::test]
    async fn unknown_session_history_returns_404() {
        let (core, _dir) = test_core_state(MockGenerator::new("x"));
        let app = api_router(core);

        let uri = format!("/api/chat/sessions/{}", uuid::Uuid::new_v4());
        let response = app.oneshot(empty_request("GET", &uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn ended_session_is_removed() {
        let (core, _dir) = test_core_state(MockGenerator::new("x"));
        let id = core.chat(None, "fever").unwrap().0.unwrap();
        let app = api_router(core);
        let uri = format!("/api/chat/sessions/{id}");

        let response = app.clone().oneshot(empty_request("DELETE", &uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app.oneshot(empty_request("GET", &uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn feedback_submit_then_stats() {
        let (core, dir) = test_core_state(MockGenerator::new("x"));
        let app = api_router(core);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/feedback",
                json!({
                    "query": "fever",
                    "response": "Stay hydrated and rest.",
                    "is_helpful": true,
                    "user_comment": "clear"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let record = body_json(response).await;
        assert_eq!(record["query"], "fever");
        assert_eq!(record["user_comment"], "clear");
        assert!(record["timestamp"].as_str().unwrap().contains('T'));

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/feedback",
                json!({"query": "knee", "response": "x", "is_helpful": false}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(empty_request("GET", "/api/feedback/stats"))
            .await
            .unwrap();
        let stats = body_json(response).await;
        assert_eq!(stats["helpful"], 1);
        assert_eq!(stats["not_helpful"], 1);
        assert_eq!(stats["total"], 2);

        let saved = std::fs::read_to_string(dir.path().join("feedback_data.json")).unwrap();
        let parsed: Value = serde_json::from_str(&saved).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 2);
        assert_eq!(parsed[1]["user_comment"], Value::Null);
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let (core, _dir) = test_core_state(MockGenerator::new("x"));
        let app = api_router(core);

        let response = app.oneshot(empty_request("GET", "/api/nonexistent")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
