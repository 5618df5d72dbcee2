//! HTTP endpoint handlers. Thin wrappers that forward to `logic`; failures
//! become `{ success: false, error }` bodies.

use std::sync::Arc;

use axum::{
  extract::{Multipart, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use tracing::{error, info, instrument, warn};

use crate::error::{ApiError, GenerationError};
use crate::logic::{check_answer, generate_from_upload, generate_quiz};
use crate::protocol::*;
use crate::state::AppState;

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Generation(GenerationError::Failed { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
      error!(target: "bcs_mcq_backend", error = %self, "request failed");
    } else {
      warn!(target: "bcs_mcq_backend", error = %self, "request rejected");
    }
    (status, Json(ErrorOut { success: false, error: self.to_string() })).into_response()
  }
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { ok: true })
}

#[instrument(level = "info", skip(state, body), fields(text_len = body.text.len(), num_questions = ?body.num_questions))]
pub async fn http_post_generate(
  State(state): State<Arc<AppState>>,
  Json(body): Json<GenerateIn>,
) -> Result<Json<QuizOut>, ApiError> {
  let out = generate_quiz(&state, &body.text, body.num_questions, body.difficulty.as_deref()).await?;
  info!(target: "bcs_mcq_backend", quiz_id = %out.quiz_id, total = out.total_questions, "HTTP generate served");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state, multipart))]
pub async fn http_post_upload(
  State(state): State<Arc<AppState>>,
  mut multipart: Multipart,
) -> Result<Json<QuizOut>, ApiError> {
  let mut file: Option<(String, Vec<u8>)> = None;
  let mut num_questions: Option<usize> = None;
  let mut difficulty: Option<String> = None;

  while let Some(field) = multipart.next_field().await.map_err(bad_form)? {
    let name = field.name().unwrap_or_default().to_string();
    match name.as_str() {
      "file" => {
        let name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(bad_form)?;
        file = Some((name, bytes.to_vec()));
      }
      "num_questions" => {
        let raw = field.text().await.map_err(bad_form)?;
        num_questions = raw.trim().parse().ok();
      }
      "difficulty" => difficulty = Some(field.text().await.map_err(bad_form)?),
      _ => {}
    }
  }

  let Some((file_name, bytes)) = file else {
    return Err(ApiError::BadRequest("no file uploaded".into()));
  };
  if file_name.is_empty() {
    return Err(ApiError::BadRequest("no file selected".into()));
  }
  let out = generate_from_upload(&state, &file_name, bytes, num_questions, difficulty.as_deref()).await?;
  info!(target: "bcs_mcq_backend", quiz_id = %out.quiz_id, %file_name, total = out.total_questions, "HTTP upload served");
  Ok(Json(out))
}

#[instrument(level = "info", skip(body), fields(selected = %body.selected_answer))]
pub async fn http_post_answer(Json(body): Json<AnswerIn>) -> impl IntoResponse {
  Json(check_answer(&body))
}

fn bad_form(e: axum::extract::multipart::MultipartError) -> ApiError {
  ApiError::BadRequest(format!("malformed upload: {e}"))
}
