//! Router assembly: API endpoints, static quiz page, CORS and HTTP tracing.

use std::sync::Arc;

use axum::{
  extract::DefaultBodyLimit,
  routing::{get, post},
  Router,
};
use tower_http::{
  cors::{Any, CorsLayer},
  services::{ServeDir, ServeFile},
  trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;

/// Build the application router with:
/// - JSON API under `/api/v1/...`
/// - static page from `./static` with index fallback
/// - request bodies capped at `max_upload_bytes` instead of axum's 2 MB default
/// - CORS (allow any origin/method/headers)
/// - HTTP trace layer (per-request spans with method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
  let static_service = ServeDir::new("./static")
    .append_index_html_on_directories(true)
    .not_found_service(ServeFile::new("./static/index.html"));
  let body_limit = DefaultBodyLimit::max(state.max_upload_bytes);

  Router::new()
    .route("/api/v1/health", get(http::http_health))
    .route("/api/v1/generate", post(http::http_post_generate))
    .route("/api/v1/upload", post(http::http_post_upload))
    .route("/api/v1/answer", post(http::http_post_answer))
    .with_state(state)
    .layer(body_limit)
    .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
    .layer(
      TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO)),
    )
    .fallback_service(static_service)
}

#[cfg(test)]
mod tests {
  use axum::body::{to_bytes, Body};
  use axum::http::{header, Request, StatusCode};
  use serde_json::{json, Value};
  use tower::ServiceExt;

  use super::*;
  use crate::assembler::QuizAssembler;
  use crate::extract::DocumentExtractor;

  const TEXT: &str = "The Bangladesh Civil Service examination has three stages. \
    The preliminary test is followed by a written examination and a viva voce. \
    Candidates who pass all stages are placed in a cadre according to merit.";

  fn app() -> Router {
    let state = AppState::new(QuizAssembler::builder().seed(31).build(), Arc::new(DocumentExtractor));
    build_router(Arc::new(state))
  }

  async fn send(req: Request<Body>) -> (StatusCode, Value) {
    let res = app().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
  }

  fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(body.to_string()))
      .unwrap()
  }

  #[tokio::test]
  async fn health() {
    let (status, body) = send(Request::get("/api/v1/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));
  }

  #[tokio::test]
  async fn generate_returns_wire_shaped_questions() {
    let (status, body) = send(post_json("/api/v1/generate", json!({ "text": TEXT, "num_questions": 3 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["total_questions"], json!(3));
    assert_eq!(body["language"], json!("English"));
    let q = &body["questions"][0];
    assert_eq!(q["options"].as_array().unwrap().len(), 4);
    assert!(q["options"][0].as_str().unwrap().starts_with("A) "));
    assert_eq!(q["difficulty"], json!("medium"));
  }

  #[tokio::test]
  async fn short_text_is_a_bad_request() {
    let (status, body) = send(post_json("/api/v1/generate", json!({ "text": "hi" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
  }

  #[tokio::test]
  async fn answer_check_is_stateless() {
    let (status, body) =
      send(post_json("/api/v1/answer", json!({ "selected_answer": "c", "correct_answer": "C" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_correct"], json!(true));
    assert_eq!(body["correct_answer"], json!("C"));
  }

  fn multipart(name: &str, content: &str) -> Request<Body> {
    let boundary = "XBOUNDARY";
    let body = format!(
      "--{boundary}\r\nContent-Disposition: form-data; name=\"num_questions\"\r\n\r\n2\r\n\
       --{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\n\
       Content-Type: application/octet-stream\r\n\r\n{content}\r\n--{boundary}--\r\n"
    );
    Request::post("/api/v1/upload")
      .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
      .body(Body::from(body))
      .unwrap()
  }

  #[tokio::test]
  async fn upload_reads_text_files_and_rejects_unknown_formats() {
    let (status, body) = send(multipart("notes.txt", TEXT)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_questions"], json!(2));

    let (status, body) = send(multipart("notes.rtf", "{\\rtf1}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("could not read file"));
  }

  #[tokio::test]
  async fn uploads_above_two_megabytes_are_accepted() {
    let big = TEXT.repeat(3 * 1024 * 1024 / TEXT.len() + 1);
    assert!(big.len() > 3 * 1024 * 1024);
    let (status, body) = send(multipart("handbook.txt", &big)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_questions"], json!(2));
  }

  #[tokio::test]
  async fn uploads_beyond_the_configured_cap_are_refused() {
    use crate::config::{AppConfig, GenerationConfig};

    let config =
      AppConfig { generation: GenerationConfig { max_upload_bytes: 1024, ..Default::default() }, ..Default::default() };
    let state = AppState::new(QuizAssembler::builder().seed(31).config(config).build(), Arc::new(DocumentExtractor));
    let res = build_router(Arc::new(state)).oneshot(multipart("notes.txt", &TEXT.repeat(20))).await.unwrap();
    assert!(res.status().is_client_error());
  }
}
