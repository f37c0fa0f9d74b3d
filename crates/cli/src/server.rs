//! HTTP transport for the answering pipeline.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use carqa_core::{config::ServerConfig, AppError, AppResult};
use carqa_knowledge::{AnswerResult, SharedPipeline};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

/// Longest accepted question, in characters.
pub const MAX_QUESTION_CHARS: usize = 500;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

/// Error response carrying a `{detail}` body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        let status = match &err {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            detail: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            detail: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

/// Accept questions of 1 to 500 characters.
pub fn validate_question(question: &str) -> AppResult<()> {
    let length = question.chars().count();

    if length == 0 {
        return Err(AppError::Validation("question must not be empty".to_string()));
    }

    if length > MAX_QUESTION_CHARS {
        return Err(AppError::Validation(format!(
            "question must be at most {} characters, got {}",
            MAX_QUESTION_CHARS, length
        )));
    }

    Ok(())
}

/// Build the router with all routes and middleware.
pub fn router(pipeline: SharedPipeline, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/ask", post(ask))
        .with_state(pipeline)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(allowed_origins))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Bind and serve until the process is stopped.
pub async fn serve(pipeline: SharedPipeline, server: &ServerConfig) -> AppResult<()> {
    let addr: SocketAddr = format!("{}:{}", server.host, server.port)
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid address: {}", e)))?;

    let router = router(pipeline, &server.allowed_origins);

    tracing::info!("Serving on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

async fn root() -> Json<Value> {
    Json(json!({
        "name": "carqa",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Grounded vehicle Q&A over official facts and external reviews",
        "endpoints": {
            "POST /ask": "Answer a question with citations",
            "GET /health": "Service and model liveness",
        }
    }))
}

async fn health(State(pipeline): State<SharedPipeline>) -> Json<Value> {
    let outcome = pipeline.probe_classifier("ping").await;
    if !outcome.is_recognized() {
        tracing::warn!("Health probe got {:?}", outcome);
    }

    Json(json!({
        "status": "ok",
        "model": pipeline.model_name(),
        "llm": outcome.is_recognized(),
    }))
}

async fn ask(
    State(pipeline): State<SharedPipeline>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AnswerResult>, ApiError> {
    let Json(request) = payload?;
    validate_question(&request.question)?;

    tracing::info!("Question: \"{}\"", request.question);
    Ok(Json(pipeline.ask(&request.question).await))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request};
    use carqa_knowledge::{KnowledgeConfig, Pipeline, SemanticStore, StoreHit};
    use carqa_llm::ScriptedClient;
    use carqa_prompt::PromptLibrary;
    use std::sync::Arc;
    use tower::ServiceExt;

    struct FactsStore;

    #[axum::async_trait]
    impl SemanticStore for FactsStore {
        async fn query(
            &self,
            _text: &str,
            k: usize,
            source_filter: Option<&str>,
        ) -> AppResult<Vec<StoreHit>> {
            let hit = StoreHit {
                id: "byd_seal_facts.md_3".to_string(),
                content: "Battery capacity: 82.5 kWh".to_string(),
                source: "byd_seal_facts.md".to_string(),
                distance: 0.1,
                review: None,
            };
            Ok(std::iter::once(hit)
                .filter(|h| source_filter.map_or(true, |tag| h.source == tag))
                .take(k)
                .collect())
        }
    }

    fn app(client: ScriptedClient) -> Router {
        let pipeline = Pipeline::new(
            Arc::new(client),
            "llama3.2",
            Arc::new(FactsStore),
            PromptLibrary::builtin().unwrap(),
            KnowledgeConfig::default(),
        );
        router(Arc::new(pipeline), &["http://localhost:3000".to_string()])
    }

    fn answering_client() -> ScriptedClient {
        ScriptedClient::new()
            .on("Determine the appropriate search strategy", "facts_only")
            .on("facts database", "battery capacity")
            .on("CRITICAL RULES", "The battery capacity is 82.5 kWh.")
    }

    fn ask_request(body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/ask")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_validate_question() {
        assert!(validate_question("What is the range?").is_ok());
        assert!(validate_question(&"é".repeat(500)).is_ok());
        assert!(validate_question("").is_err());
        assert!(validate_question(&"a".repeat(501)).is_err());
    }

    #[tokio::test]
    async fn test_ask_returns_answer_and_citations() {
        let response = app(answering_client())
            .oneshot(ask_request(r#"{"question": "What is the battery capacity?"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "answered");
        assert_eq!(body["answer"], "The battery capacity is 82.5 kWh.");

        let citation = &body["citations"][0];
        assert_eq!(citation["type"], "facts");
        assert_eq!(citation["doc_id"], "byd_seal_facts.md_3");
        assert!(citation.get("title").is_none());
    }

    #[tokio::test]
    async fn test_ask_rejects_empty_question() {
        let response = app(answering_client())
            .oneshot(ask_request(r#"{"question": ""}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert!(body["detail"].as_str().unwrap().contains("empty"));
    }

    #[tokio::test]
    async fn test_ask_rejects_long_question() {
        let question = "a".repeat(501);
        let response = app(answering_client())
            .oneshot(ask_request(&format!(r#"{{"question": "{}"}}"#, question)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_ask_rejects_missing_field() {
        let response = app(answering_client())
            .oneshot(ask_request(r#"{"query": "range?"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert!(body["detail"].is_string());
    }

    #[tokio::test]
    async fn test_refused_question_is_still_ok() {
        let client = ScriptedClient::new().on("Determine the appropriate search strategy", "refuse");
        let response = app(client)
            .oneshot(ask_request(r#"{"question": "How much does it cost?"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "refused");
        assert_eq!(body["citations"], json!([]));
    }

    #[tokio::test]
    async fn test_health_reports_model_liveness() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app(answering_client()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body, json!({"status": "ok", "model": "llama3.2", "llm": true}));
    }

    #[tokio::test]
    async fn test_health_with_unreachable_model() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app(ScriptedClient::new()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["llm"], false);
    }

    #[tokio::test]
    async fn test_root_lists_endpoints() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app(ScriptedClient::new()).oneshot(request).await.unwrap();

        let body = json_body(response).await;
        assert_eq!(body["name"], "carqa");
        assert!(body["endpoints"].get("POST /ask").is_some());
    }
}
