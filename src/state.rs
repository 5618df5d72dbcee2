//! Shared application state handed to every handler.
//!
//! Holds the quiz assembler (with its cache and optional remote model), the
//! upload text extractor and the request limits from `[generation]`.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::assembler::QuizAssembler;
use crate::config::load_config_from_env;
use crate::extract::{DocumentExtractor, TextExtractor};
use crate::llm::OpenAiClient;

#[derive(Clone)]
pub struct AppState {
  pub assembler: Arc<QuizAssembler>,
  pub extractor: Arc<dyn TextExtractor>,
  pub min_text_chars: usize,
  pub max_questions: usize,
  pub max_upload_bytes: usize,
}

impl AppState {
  /// Limits are read from the assembler's generation config.
  pub fn new(assembler: QuizAssembler, extractor: Arc<dyn TextExtractor>) -> Self {
    let min_text_chars = assembler.generation().min_text_chars;
    let max_questions = assembler.generation().max_questions.max(1);
    let max_upload_bytes = assembler.generation().max_upload_bytes;
    debug!(
      target: "bcs_mcq_backend",
      remote = assembler.has_remote(),
      min_text_chars,
      max_questions,
      max_upload_bytes,
      "App state ready"
    );
    Self { assembler: Arc::new(assembler), extractor, min_text_chars, max_questions, max_upload_bytes }
  }

  /// Build state from env: TOML config, optional OpenAI client, document extractor.
  #[instrument(level = "info", skip_all)]
  pub fn from_env() -> Self {
    let config = load_config_from_env();
    let mut builder = QuizAssembler::builder();
    match OpenAiClient::from_env(config.prompts.system.clone()) {
      Some(client) => {
        info!(target: "bcs_mcq_backend", model = %client.model(), "OpenAI enabled.");
        builder = builder.llm(Arc::new(client));
      }
      None => {
        info!(target: "bcs_mcq_backend", "OpenAI disabled (no OPENAI_API_KEY). Using rule-based generation.");
      }
    }
    info!(
      target: "bcs_mcq_backend",
      cache_capacity = config.generation.cache_capacity,
      max_questions = config.generation.max_questions,
      domain_rules = config.domain_rules.len(),
      "Generation settings loaded"
    );
    Self::new(builder.config(config).build(), Arc::new(DocumentExtractor))
  }
}
