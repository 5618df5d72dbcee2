//! Service configuration: prompts, generation knobs and extra domain rules,
//! loaded from the TOML file named by MCQ_CONFIG_PATH.
//!
//! Every section is optional; anything missing falls back to the defaults below.

use std::time::Duration;

use serde::Deserialize;
use tracing::{error, info};

use crate::llm::RetryPolicy;
use crate::parser::ValidationMode;
use crate::seeds::DomainRule;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub generation: GenerationConfig,
  /// Appended after the built-in BCS rules; the first match wins.
  #[serde(default)]
  pub domain_rules: Vec<DomainRule>,
}

/// Prompts for the remote model. Placeholders in `user_template`:
/// `{count}`, `{difficulty}`, `{language}`, `{focus}`, `{seed}`, `{metrics}`, `{text}`.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub system: String,
  pub user_template: String,
  pub focus_areas: Vec<String>,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      system: "You are an expert Bangladesh Civil Service (BCS) exam question writer. Respond ONLY with a JSON array.".into(),
      user_template: r#"Generate {count} multiple choice questions for the BCS examination from the text below.

Variation seed: {seed}. Focus on {focus} in the text.
Difficulty: {difficulty}. Write the questions in {language}.
Text profile: {metrics}.

Text:
{text}

Rules:
- Every question must be answerable from the text alone.
- Exactly 4 options per question, exactly one correct.
- Do not use "all of the above", "none of the above" or similar options.
- Avoid loaded words such as "obviously" or "clearly" in questions and options.
- Keep each question under 200 characters and do not trail off with "etc".
- Mix categories: factual, conceptual, analytical, application, critical_thinking.

Return a JSON array, each item shaped as:
{"question": "...", "options": ["A) ...", "B) ...", "C) ...", "D) ..."], "correct_answer": "A", "explanation": "...", "category": "factual", "difficulty": "{difficulty}"}"#
        .into(),
      focus_areas: [
        "key concepts and definitions",
        "chronological events and timelines",
        "cause-and-effect relationships",
        "comparative analysis between concepts",
        "practical applications and implications",
        "analytical reasoning and inference",
        "specific facts and statistics",
        "theoretical frameworks and models",
        "procedural steps and processes",
        "evaluative judgments and conclusions",
      ]
      .map(String::from)
      .to_vec(),
    }
  }
}

/// What happens when every remote attempt failed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteFailurePolicy {
  /// Degrade to rule-based generation.
  #[default]
  FallbackLocal,
  /// Surface `GenerationError::Failed` to the caller.
  Fail,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
  pub max_attempts: u32,
  pub base_backoff_ms: u64,
  pub call_timeout_secs: u64,
  pub cache_capacity: usize,
  pub excerpt_chars: usize,
  pub fingerprint_prefix_chars: usize,
  pub remote_failure: RemoteFailurePolicy,
  pub validation: ValidationMode,
  pub significant_numbers_only: bool,
  pub min_text_chars: usize,
  pub max_questions: usize,
  /// Request body cap for `/api/v1/upload`.
  pub max_upload_bytes: usize,
}

impl Default for GenerationConfig {
  fn default() -> Self {
    Self {
      max_attempts: 3,
      base_backoff_ms: 500,
      call_timeout_secs: 30,
      cache_capacity: 256,
      excerpt_chars: 4000,
      fingerprint_prefix_chars: 2000,
      remote_failure: RemoteFailurePolicy::FallbackLocal,
      validation: ValidationMode::Strict,
      significant_numbers_only: true,
      min_text_chars: 50,
      max_questions: 50,
      max_upload_bytes: 16 * 1024 * 1024,
    }
  }
}

impl GenerationConfig {
  pub fn retry_policy(&self) -> RetryPolicy {
    RetryPolicy {
      max_attempts: self.max_attempts.max(1),
      base_backoff: Duration::from_millis(self.base_backoff_ms),
      call_timeout: Duration::from_secs(self.call_timeout_secs.max(1)),
    }
  }
}

/// Load `AppConfig` from MCQ_CONFIG_PATH. Unset path, IO or parse errors all
/// yield the defaults (errors are logged).
pub fn load_config_from_env() -> AppConfig {
  match std::env::var("MCQ_CONFIG_PATH") {
    Ok(path) => load_config_file(&path).unwrap_or_default(),
    Err(_) => AppConfig::default(),
  }
}

pub fn load_config_file(path: &str) -> Option<AppConfig> {
  match std::fs::read_to_string(path) {
    Ok(s) => match parse_config(&s) {
      Ok(cfg) => {
        info!(target: "bcs_mcq_backend", %path, domain_rules = cfg.domain_rules.len(), "Loaded config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "bcs_mcq_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "bcs_mcq_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

pub fn parse_config(s: &str) -> Result<AppConfig, toml::de::Error> {
  toml::from_str::<AppConfig>(s)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_file_gives_defaults() {
    let cfg = parse_config("").unwrap();
    assert_eq!(cfg.generation.max_attempts, 3);
    assert_eq!(cfg.generation.remote_failure, RemoteFailurePolicy::FallbackLocal);
    assert_eq!(cfg.prompts.focus_areas.len(), 10);
    assert!(cfg.domain_rules.is_empty());
  }

  #[test]
  fn partial_sections_merge_with_defaults() {
    let cfg = parse_config(
      r#"
        [generation]
        remote_failure = "fail"
        validation = "relaxed"
        max_questions = 20

        [prompts]
        system = "Be terse."

        [[domain_rules]]
        keyword = "parliament"
        prompt = "What is the role of {concept}?"
        options = ["Makes laws", "Runs courts", "Prints money", "Collects tax"]
        explanation = "The text says {concept} makes laws."
      "#,
    )
    .unwrap();
    assert_eq!(cfg.generation.remote_failure, RemoteFailurePolicy::Fail);
    assert_eq!(cfg.generation.validation, ValidationMode::Relaxed);
    assert_eq!(cfg.generation.max_questions, 20);
    assert_eq!(cfg.generation.excerpt_chars, 4000);
    assert_eq!(cfg.prompts.system, "Be terse.");
    assert!(cfg.prompts.user_template.contains("{text}"));
    assert_eq!(cfg.domain_rules[0].keyword, "parliament");
  }

  #[test]
  fn retry_policy_from_knobs() {
    let g = GenerationConfig { base_backoff_ms: 10, call_timeout_secs: 0, ..Default::default() };
    let p = g.retry_policy();
    assert_eq!(p.base_backoff, Duration::from_millis(10));
    assert_eq!(p.call_timeout, Duration::from_secs(1));
  }

  #[test]
  fn unreadable_path_is_none() {
    assert!(load_config_file("/definitely/not/here.toml").is_none());
  }
}
