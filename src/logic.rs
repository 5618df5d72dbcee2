//! Request-level behaviour behind the HTTP handlers: input checks, count
//! clamping, upload extraction and the stateless answer check.

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::{Difficulty, GenerationRequest, OptionLabel};
use crate::error::ApiError;
use crate::extract::{format_from_filename, TextExtractor};
use crate::language::detect_script;
use crate::normalize::normalize;
use crate::protocol::{AnswerIn, AnswerOut, QuizOut};
use crate::state::AppState;

pub const DEFAULT_QUESTION_COUNT: usize = 10;

/// Normalize, validate and generate. `language` reflects the detected script.
#[instrument(level = "info", skip(state, text), fields(text_len = text.len(), ?num_questions, ?difficulty))]
pub async fn generate_quiz(
  state: &AppState,
  text: &str,
  num_questions: Option<usize>,
  difficulty: Option<&str>,
) -> Result<QuizOut, ApiError> {
  let text = normalize(text);
  let meaningful = text.chars().filter(|c| c.is_alphanumeric()).count();
  if meaningful < state.min_text_chars {
    return Err(ApiError::BadRequest(format!(
      "text is too short: need at least {} meaningful characters, got {meaningful}",
      state.min_text_chars
    )));
  }

  let count = num_questions.unwrap_or(DEFAULT_QUESTION_COUNT).clamp(1, state.max_questions);
  let difficulty = Difficulty::parse_lenient(difficulty);
  let language = detect_script(&text).profile().language_name();

  let request = GenerationRequest { text, count, difficulty };
  let questions = state.assembler.generate(&request).await?;
  let quiz_id = Uuid::new_v4().to_string();
  info!(target: "mcq", %quiz_id, total = questions.len(), language, "quiz generated");
  Ok(QuizOut { success: true, quiz_id, total_questions: questions.len(), questions, language })
}

/// Extract text from an uploaded document, then behave like `generate_quiz`.
#[instrument(level = "info", skip(state, bytes), fields(%file_name, size = bytes.len()))]
pub async fn generate_from_upload(
  state: &AppState,
  file_name: &str,
  bytes: Vec<u8>,
  num_questions: Option<usize>,
  difficulty: Option<&str>,
) -> Result<QuizOut, ApiError> {
  let format = format_from_filename(file_name);
  let extractor = state.extractor.clone();
  // PDF parsing is CPU bound and may panic on malformed input.
  let text = tokio::task::spawn_blocking(move || extractor.extract(&bytes, &format))
    .await
    .map_err(|e| {
      warn!(target: "mcq", error = %e, "extraction task aborted");
      ApiError::BadRequest("could not read file".into())
    })??;
  generate_quiz(state, &text, num_questions, difficulty).await
}

/// Compare labels leniently ("b", "B)", "Option B"). Unparseable input is wrong.
pub fn check_answer(body: &AnswerIn) -> AnswerOut {
  let selected = OptionLabel::parse(&body.selected_answer);
  let correct = OptionLabel::parse(&body.correct_answer);
  let is_correct = matches!((selected, correct), (Some(s), Some(c)) if s == c);
  AnswerOut {
    is_correct,
    correct_answer: correct.map(|c| c.to_string()).unwrap_or_else(|| body.correct_answer.trim().to_string()),
    explanation: body.explanation.clone().unwrap_or_default(),
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use super::*;
  use crate::assembler::QuizAssembler;
  use crate::config::{AppConfig, GenerationConfig};
  use crate::extract::DocumentExtractor;

  const TEXT: &str = "The Bangladesh Civil Service examination has three stages. \
    The preliminary test is followed by a written examination and a viva voce. \
    Candidates who pass all stages are placed in a cadre according to merit.";

  fn state(max_questions: usize) -> AppState {
    let config = AppConfig { generation: GenerationConfig { max_questions, ..Default::default() }, ..Default::default() };
    AppState::new(QuizAssembler::builder().config(config).seed(21).build(), Arc::new(DocumentExtractor))
  }

  fn answer(selected: &str, correct: &str) -> AnswerIn {
    AnswerIn { selected_answer: selected.into(), correct_answer: correct.into(), explanation: Some("Because.".into()) }
  }

  #[test]
  fn answers_compare_labels_leniently() {
    let out = check_answer(&answer("b", "B"));
    assert!(out.is_correct);
    assert_eq!(out.correct_answer, "B");
    assert_eq!(out.explanation, "Because.");
    assert!(!check_answer(&answer("A", "C)")).is_correct);
    assert!(!check_answer(&answer("", "A")).is_correct);
  }

  #[tokio::test]
  async fn short_text_is_rejected() {
    let err = generate_quiz(&state(50), "Too short.", Some(3), None).await.unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));
  }

  #[tokio::test]
  async fn count_is_clamped_and_language_reported() {
    let out = generate_quiz(&state(4), TEXT, Some(500), Some("hard")).await.unwrap();
    assert!(out.success);
    assert_eq!(out.total_questions, 4);
    assert_eq!(out.questions.len(), 4);
    assert_eq!(out.language, "English");
    assert!(out.questions.iter().all(|q| q.difficulty() == Difficulty::Hard));

    let zero = generate_quiz(&state(4), TEXT, Some(0), None).await.unwrap();
    assert_eq!(zero.total_questions, 1);
  }

  #[tokio::test]
  async fn uploads_go_through_the_extractor() {
    let s = state(10);
    let out = generate_from_upload(&s, "notes.txt", TEXT.as_bytes().to_vec(), Some(3), None).await.unwrap();
    assert_eq!(out.total_questions, 3);

    let err = generate_from_upload(&s, "notes.rtf", b"{\\rtf1}".to_vec(), Some(3), None).await.unwrap_err();
    assert!(err.to_string().contains("could not read file"));
  }
}
