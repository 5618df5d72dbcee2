//! Request/response DTOs for the HTTP API (serde ready).

use serde::{Deserialize, Serialize};

use crate::domain::Question;

#[derive(Debug, Deserialize)]
pub struct GenerateIn {
  pub text: String,
  #[serde(default)]
  pub num_questions: Option<usize>,
  #[serde(default)]
  pub difficulty: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QuizOut {
  pub success: bool,
  pub quiz_id: String,
  pub questions: Vec<Question>,
  pub total_questions: usize,
  pub language: &'static str,
}

/// Stateless check: the client echoes back the question's correct label.
#[derive(Debug, Deserialize)]
pub struct AnswerIn {
  pub selected_answer: String,
  pub correct_answer: String,
  #[serde(default)]
  pub explanation: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnswerOut {
  pub is_correct: bool,
  pub correct_answer: String,
  pub explanation: String,
}

#[derive(Serialize)]
pub struct HealthOut {
  pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorOut {
  pub success: bool,
  pub error: String,
}
