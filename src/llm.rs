//! Remote model access: the `LlmClient` seam, an OpenAI-compatible
//! chat.completions client, and the retry/backoff runner.
//!
//! We never log the API key or prompt bodies; only sizes, status codes and
//! token usage.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::error::LlmError;
use crate::util::trunc_for_log;

#[async_trait]
pub trait LlmClient: Send + Sync {
  /// One completion for `prompt`. Implementations must not retry internally.
  async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

#[derive(Clone)]
pub struct OpenAiClient {
  client: reqwest::Client,
  api_key: String,
  base_url: String,
  model: String,
  system: String,
  temperature: f32,
}

impl OpenAiClient {
  pub fn new(api_key: String, base_url: String, model: String, system: String) -> Result<Self, LlmError> {
    if api_key.trim().is_empty() {
      return Err(LlmError::Fatal("OPENAI_API_KEY is empty".into()));
    }
    // Per-call deadlines are enforced by the retry runner.
    let client = reqwest::Client::builder().build().map_err(|e| LlmError::Fatal(e.to_string()))?;
    Ok(Self { client, api_key, base_url: base_url.trim_end_matches('/').to_string(), model, system, temperature: 0.7 })
  }

  /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
  pub fn from_env(system: String) -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY").ok()?;
    let base_url = std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());
    match Self::new(api_key, base_url, model, system) {
      Ok(c) => Some(c),
      Err(e) => {
        warn!(target: "mcq", error = %e, "OpenAI client disabled");
        None
      }
    }
  }

  pub fn model(&self) -> &str {
    &self.model
  }
}

#[async_trait]
impl LlmClient for OpenAiClient {
  #[instrument(level = "info", skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
  async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
    let url = format!("{}/chat/completions", self.base_url);
    let req = ChatCompletionRequest {
      model: &self.model,
      messages: vec![
        ChatMessageReq { role: "system", content: &self.system },
        ChatMessageReq { role: "user", content: prompt },
      ],
      temperature: self.temperature,
    };

    let res = self
      .client
      .post(&url)
      .header(USER_AGENT, "bcs-mcq-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req)
      .send()
      .await
      .map_err(request_error)?;

    let status = res.status();
    if !status.is_success() {
      let body = res.text().await.unwrap_or_default();
      let msg = extract_openai_error(&body).unwrap_or_else(|| trunc_for_log(&body, 200));
      return Err(classify_status(status, &msg));
    }

    let body: ChatCompletionResponse =
      res.json().await.map_err(|e| LlmError::Transient(format!("malformed completion body: {e}")))?;
    if let Some(usage) = &body.usage {
      info!(target: "mcq", prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "OpenAI usage");
    }
    let text = body.choices.into_iter().next().and_then(|c| c.message.content).unwrap_or_default().trim().to_string();
    if text.is_empty() {
      return Err(LlmError::Transient("empty completion".into()));
    }
    Ok(text)
  }
}

/// 408, 429 and 5xx are worth retrying; every other failure status is not.
pub fn classify_status(status: StatusCode, msg: &str) -> LlmError {
  let detail = format!("OpenAI HTTP {}: {}", status.as_u16(), msg);
  if status == StatusCode::REQUEST_TIMEOUT || status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
    LlmError::Transient(detail)
  } else {
    LlmError::Fatal(detail)
  }
}

fn request_error(e: reqwest::Error) -> LlmError {
  if e.is_builder() {
    LlmError::Fatal(e.to_string())
  } else {
    LlmError::Transient(e.to_string())
  }
}

/// Attempts, backoff and per-call deadline for remote generation.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
  pub max_attempts: u32,
  pub base_backoff: Duration,
  pub call_timeout: Duration,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self { max_attempts: 3, base_backoff: Duration::from_millis(500), call_timeout: Duration::from_secs(30) }
  }
}

impl RetryPolicy {
  /// Delay before attempt `n + 1`, doubling from the base.
  pub fn backoff_after(&self, attempt: u32) -> Duration {
    self.base_backoff.saturating_mul(1u32 << attempt.saturating_sub(1).min(16))
  }
}

/// Run `attempt` sequentially until it succeeds, a fatal error occurs, or the
/// attempt budget is spent. Each call is bounded by `call_timeout`; a timeout
/// counts as a transient failure.
pub async fn run_with_retry<T, F, Fut>(policy: &RetryPolicy, mut attempt: F) -> Result<T, LlmError>
where
  F: FnMut(u32) -> Fut,
  Fut: Future<Output = Result<T, LlmError>>,
{
  let max = policy.max_attempts.max(1);
  let mut n = 1;
  loop {
    let outcome = match tokio::time::timeout(policy.call_timeout, attempt(n)).await {
      Ok(r) => r,
      Err(_) => Err(LlmError::Transient(format!("call timed out after {:?}", policy.call_timeout))),
    };
    match outcome {
      Ok(v) => return Ok(v),
      Err(e) if !e.is_transient() => {
        warn!(target: "mcq", attempt = n, error = %e, "remote call failed (fatal, not retrying)");
        return Err(e);
      }
      Err(e) if n >= max => {
        warn!(target: "mcq", attempt = n, error = %e, "remote call failed; attempts exhausted");
        return Err(e);
      }
      Err(e) => {
        let delay = policy.backoff_after(n);
        warn!(target: "mcq", attempt = n, error = %e, backoff_ms = delay.as_millis() as u64, "remote call failed; retrying");
        tokio::time::sleep(delay).await;
        n += 1;
      }
    }
  }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
  model: &'a str,
  messages: Vec<ChatMessageReq<'a>>,
  temperature: f32,
}
#[derive(Serialize)]
struct ChatMessageReq<'a> { role: &'a str, content: &'a str }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from an OpenAI error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}
