//! Web surface: a form page, its HTML result, and a JSON endpoint.

use crate::error::RequestError;
use crate::pipeline::Pipeline;
use crate::presenter;
use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

#[derive(Debug, Deserialize)]
pub struct LookupRequest {
    pub text: String,
}

pub fn router(pipeline: Arc<Pipeline>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/lookup", post(lookup_form))
        .route("/api/lookup", post(lookup_json))
        .layer(TraceLayer::new_for_http())
        .with_state(pipeline)
}

pub async fn serve(pipeline: Arc<Pipeline>, port: u16) -> Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, router(pipeline))
        .await
        .context("HTTP server failed")
}

async fn index() -> Html<String> {
    Html(presenter::render_form_page())
}

async fn health() -> &'static str {
    "OK"
}

async fn lookup_form(
    State(pipeline): State<Arc<Pipeline>>,
    Form(request): Form<LookupRequest>,
) -> Response {
    match pipeline.process(&request.text).await {
        Ok(report) => Html(presenter::render_html(&report)).into_response(),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Html(presenter::render_message_page(&e.to_string())),
        )
            .into_response(),
    }
}

async fn lookup_json(
    State(pipeline): State<Arc<Pipeline>>,
    Json(request): Json<LookupRequest>,
) -> Result<Response, ApiError> {
    let report = pipeline.process(&request.text).await?;
    match presenter::render_json(&report) {
        Ok(body) => Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response()),
        Err(e) => {
            error!("Failed to render report: {:#}", e);
            Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to render the result." })),
            )
                .into_response())
        }
    }
}

pub struct ApiError(RequestError);

impl From<RequestError> for ApiError {
    fn from(e: RequestError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            RequestError::EmptyInput => StatusCode::BAD_REQUEST,
            RequestError::InputTooLong { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::{Enricher, Enrichment, EnrichmentRow};
    use crate::error::{EnrichError, ServiceError};
    use crate::language::{LanguageDetector, SupportedLanguage};
    use crate::pipeline::MAX_INPUT_CHARS;
    use crate::spelling::Corrector;
    use crate::translation::Translator;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    struct English;

    impl LanguageDetector for English {
        fn detect(&self, _text: &str) -> SupportedLanguage {
            SupportedLanguage::English
        }
    }

    struct Keep;

    impl Corrector for Keep {
        fn correct(&self, _text: &str, _language: SupportedLanguage) -> Option<String> {
            None
        }
    }

    struct Suffix;

    #[async_trait]
    impl Translator for Suffix {
        async fn translate_text(
            &self,
            text: &str,
            _from: &str,
            to: &str,
        ) -> Result<String, ServiceError> {
            Ok(format!("{} ({})", text, to))
        }
    }

    struct Same;

    #[async_trait]
    impl Enricher for Same {
        async fn enrich(
            &self,
            word: &str,
            _language: SupportedLanguage,
        ) -> Result<Enrichment, EnrichError> {
            Ok(Enrichment::from_rows(vec![EnrichmentRow::synonym_only(word)]))
        }
    }

    fn app() -> Router {
        router(Arc::new(Pipeline::new(
            Arc::new(English),
            Arc::new(Keep),
            Arc::new(Suffix),
            Arc::new(Same),
        )))
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        String::from_utf8(bytes.to_vec()).expect("utf-8")
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "OK");
    }

    #[tokio::test]
    async fn test_index_serves_form() {
        let response = app()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("<form"));
    }

    #[tokio::test]
    async fn test_form_lookup_renders_report() {
        let request = Request::post("/lookup")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("text=hello"))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Detected language: <strong>English</strong>"));
        assert!(html.contains("hello (fr)"));
    }

    #[tokio::test]
    async fn test_form_lookup_rejects_blank_input() {
        let request = Request::post("/lookup")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("text=+++"))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response)
            .await
            .contains("Please enter a valid word or phrase to process."));
    }

    #[tokio::test]
    async fn test_json_lookup() {
        let request = Request::post("/api/lookup")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"text":"hello"}"#))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        let body = body_text(response).await;
        // served through the pretty-printing presenter
        assert!(body.contains("\n  \"input\": \"hello\""));
        let value: serde_json::Value = serde_json::from_str(&body).expect("json");
        assert_eq!(value["language"], "english");
        assert_eq!(value["translations"]["ready"]["translations"][1]["text"], "hello (th)");
        assert_eq!(
            value["enrichments"][0]["rows"]["ready"]["rows"][0]["synonym"],
            "hello"
        );
    }

    #[tokio::test]
    async fn test_json_lookup_oversized_input_is_rejected() {
        let text = "a".repeat(MAX_INPUT_CHARS + 1);
        let request = Request::post("/api/lookup")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "text": text }).to_string()))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let value: serde_json::Value =
            serde_json::from_str(&body_text(response).await).expect("json");
        assert_eq!(
            value["error"],
            format!("Input is too long: please enter at most {} characters.", MAX_INPUT_CHARS)
        );
    }

    #[tokio::test]
    async fn test_json_lookup_empty_input_is_bad_request() {
        let request = Request::post("/api/lookup")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"text":""}"#))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let value: serde_json::Value =
            serde_json::from_str(&body_text(response).await).expect("json");
        assert_eq!(value["error"], "Please enter a valid word or phrase to process.");
    }
}
