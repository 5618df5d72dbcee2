//! Error taxonomy for the generation core and its collaborators.
//!
//! Only `GenerationError` ever reaches a caller of `generate`; the others are
//! absorbed at the boundary where they occur (retry, fallback, record dropped).

/// Source document could not be turned into text. Never retried.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
  #[error("unsupported file format: {0}")]
  UnsupportedFormat(String),
  #[error("could not read file: {0}")]
  Unreadable(String),
  #[error("no text found in document")]
  Empty,
}

/// Failure of the remote model call.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LlmError {
  /// Timeout, network, quota, server-side failure or an empty completion.
  #[error("transient model failure: {0}")]
  Transient(String),
  /// Auth, configuration or request shape problems. Retrying will not help.
  #[error("fatal model failure: {0}")]
  Fatal(String),
}

impl LlmError {
  pub fn is_transient(&self) -> bool {
    matches!(self, LlmError::Transient(_))
  }
}

/// Why one parsed record was rejected. The record is dropped, never the batch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
  #[error("question text is missing")]
  MissingPrompt,
  #[error("expected 4 options, got {0}")]
  OptionCount(usize),
  #[error("an option is empty")]
  EmptyOption,
  #[error("duplicate option: {0}")]
  DuplicateOption(String),
  #[error("correct answer is missing")]
  MissingAnswer,
  #[error("correct answer '{0}' does not name an option")]
  BadAnswer(String),
  #[error("explanation is missing")]
  MissingExplanation,
}

/// Terminal failure of `generate`: neither path produced usable questions.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GenerationError {
  #[error("question generation failed: {reason}")]
  Failed { reason: String },
}

impl GenerationError {
  pub fn failed(reason: impl Into<String>) -> Self {
    GenerationError::Failed { reason: reason.into() }
  }
}

/// Transport-level failure, rendered as a JSON error body by the router.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
  /// Caller sent something unusable (short text, unreadable upload, bad form).
  #[error("{0}")]
  BadRequest(String),
  #[error(transparent)]
  Generation(#[from] GenerationError),
}

impl From<ExtractionError> for ApiError {
  fn from(e: ExtractionError) -> Self {
    ApiError::BadRequest(format!("could not read file: {e}"))
  }
}
