use std::{env, sync::Arc};

pub mod core;
pub mod error_handler;
mod middleware_layer;
mod routes;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tokio::signal;
use tracing::{error, info};

use crate::{
    core::app_state::AppState,
    error_handler::AppError,
    middleware_layer::request_id::request_id,
    routes::{
        chat::chat_route::chat_route,
        feedback_route::feedback_route,
        health_route::health_route,
        index_route::{index_route, script_route},
        reset_route::reset_route,
    },
};

pub const DEFAULT_ADDRESS: &str = "127.0.0.1:5000";

/// Builds the HTTP router over a prepared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_route))
        .route("/static/script.js", get(script_route))
        .route("/chat", post(chat_route))
        .route("/feedback", post(feedback_route))
        .route("/reset", post(reset_route))
        .route("/health", get(health_route))
        .layer(middleware::from_fn(request_id))
        .with_state(state)
}

/// Boots the server: state from env, bind `API_ADDRESS`, serve until Ctrl+C.
///
/// # Errors
/// Fails before binding if configuration is invalid or a collection is missing.
pub async fn start() -> Result<(), AppError> {
    let host_url = env::var("API_ADDRESS").unwrap_or_else(|_| DEFAULT_ADDRESS.to_string());

    let state = Arc::new(AppState::from_env().await?);
    let app = router(state);

    // Bind to address
    let listener = tokio::net::TcpListener::bind(&host_url)
        .await
        .map_err(AppError::Bind)?;
    info!(address = %host_url, "support assistant listening");

    // Start server with graceful shutdown on Ctrl+C
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("server stopped");
    Ok(())
}

/// Returns a future that resolves when Ctrl+C is pressed
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_llm_service::{LlmModelConfig, LlmProvider, LlmServiceProfiles};
    use assistant::{
        AssistantConfig, ChatError, ChatService, ChatSession, ChatTurn, FeedbackLog, TextGenerator,
    };
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use futures::future::BoxFuture;
    use rag_store::{EmbeddingsProvider, MemoryCollection, RagError, Retriever};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    struct UnitEmbedder;

    impl EmbeddingsProvider for UnitEmbedder {
        fn embed<'a>(&'a self, _text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, RagError>> {
            Box::pin(async { Ok(vec![1.0, 0.0]) })
        }
    }

    struct StubGenerator(Option<&'static str>);

    impl TextGenerator for StubGenerator {
        fn generate<'a>(&'a self, _prompt: &'a str) -> BoxFuture<'a, Result<String, ChatError>> {
            let out = self
                .0
                .map(str::to_string)
                .ok_or_else(|| ChatError::Generation("model crashed at 10.1.2.3".into()));
            Box::pin(async move { out })
        }
    }

    fn model(name: &str) -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::Ollama,
            model: name.into(),
            // Nothing listens here; health probes fail fast.
            endpoint: "http://127.0.0.1:9".into(),
            max_tokens: None,
            temperature: None,
            top_p: None,
            timeout_secs: Some(2),
        }
    }

    struct Harness {
        state: Arc<AppState>,
        _dir: tempfile::TempDir,
    }

    fn harness(reply: Option<&'static str>) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let retriever = Retriever::new(
            Arc::new(UnitEmbedder),
            Arc::new(MemoryCollection::new("faq_embeddings")),
            Arc::new(MemoryCollection::new("dialogue_embeddings")),
        );
        let llm = Arc::new(
            LlmServiceProfiles::new(model("llama3:8b"), model("all-minilm"), Some(2)).unwrap(),
        );
        let state = AppState {
            chat: ChatService::new(
                retriever,
                Arc::new(StubGenerator(reply)),
                &AssistantConfig::default(),
            ),
            session: ChatSession::default().handle(),
            feedback: Arc::new(FeedbackLog::new(dir.path().join("feedback.csv"))),
            llm,
        };
        Harness {
            state: Arc::new(state),
            _dir: dir,
        }
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn call(h: &Harness, req: Request<Body>) -> (StatusCode, Value) {
        let res = router(h.state.clone()).oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn chat_returns_reply_and_echo() {
        let h = harness(Some(" Let me check that. "));
        let (status, body) = call(&h, post_json("/chat", json!({"user_input": "my bill is wrong"}))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"response": "Let me check that.", "original_input": "my bill is wrong"})
        );
        assert_eq!(h.state.session.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn chat_without_input_is_a_validation_error() {
        let h = harness(Some("unused"));
        for body in [json!({}), json!({"user_input": ""}), json!({"user_input": null})] {
            let (status, out) = call(&h, post_json("/chat", body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(out["error"], "VALIDATION_ERROR");
        }
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let h = harness(Some("unused"));
        let req = Request::builder()
            .method("POST")
            .uri("/chat")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, out) = call(&h, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(out["error"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn generation_failure_is_generic_and_unrecorded() {
        let h = harness(None);
        let (status, out) = call(&h, post_json("/chat", json!({"user_input": "hello"}))).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(out["error"], "GENERATION_FAILED");
        assert!(!out["message"].as_str().unwrap().contains("10.1.2.3"));
        assert!(h.state.session.lock().await.is_empty());
    }

    #[tokio::test]
    async fn feedback_is_appended() {
        let h = harness(Some("unused"));
        let (status, out) = call(
            &h,
            post_json(
                "/feedback",
                json!({"original_input": "x", "bot_reply": "y", "feedback": "bad"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(out, json!({"message": "Feedback saved successfully"}));
        let text = std::fs::read_to_string(h.state.feedback.path()).unwrap();
        assert_eq!(text, "x,y,bad\n");
    }

    #[tokio::test]
    async fn reset_clears_the_session() {
        let h = harness(Some("unused"));
        h.state.session.lock().await.append(ChatTurn::user("hi"));

        let req = Request::builder()
            .method("POST")
            .uri("/reset")
            .body(Body::empty())
            .unwrap();
        let (status, out) = call(&h, req).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(out, json!({"message": "Chat history cleared"}));
        assert!(h.state.session.lock().await.recent(4).is_empty());
    }

    #[tokio::test]
    async fn index_and_script_are_served() {
        let h = harness(Some("unused"));
        let res = router(h.state.clone())
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().contains_key("X-Request-Id"));
        let html = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&html).contains("id=\"chatBox\""));

        let res = router(h.state.clone())
            .oneshot(
                Request::builder()
                    .uri("/static/script.js")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(
            res.headers()[header::CONTENT_TYPE]
                .to_str()
                .unwrap()
                .starts_with("application/javascript")
        );
    }

    #[tokio::test]
    async fn health_never_fails() {
        let h = harness(Some("unused"));
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, out) = call(&h, req).await;

        assert_eq!(status, StatusCode::OK);
        let list = out.as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.iter().all(|s| s["ok"] == json!(false)));
    }
}
