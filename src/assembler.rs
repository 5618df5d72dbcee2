//! Quiz assembly: cache lookup, remote or rule-based generation, quality
//! filtering, category balancing and padding to the exact requested count.
//!
//! `generate` only fails for unusable input (empty text, zero count) or when a
//! remote failure is configured to surface instead of degrading.

use std::collections::HashSet;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::cache::{cache_key, LruQuizCache, QuizCache};
use crate::config::{AppConfig, GenerationConfig, Prompts, RemoteFailurePolicy};
use crate::distribution::{balance, split_by_quota, DistributionTarget};
use crate::domain::{Category, Difficulty, FeatureKind, GenerationRequest, Question};
use crate::error::{GenerationError, LlmError};
use crate::features::{FeatureExtractor, FeatureSet};
use crate::language::{detect_script, ScriptProfile};
use crate::llm::{run_with_retry, LlmClient};
use crate::parser::ResponseParser;
use crate::quality::QualityFilter;
use crate::seeds::{builtin_domain_rules, static_fallback_question};
use crate::synth::QuestionSynthesizer;
use crate::util::{fill_template, take_chars};
use crate::wording::WordingPack;

const DEFAULT_FOCUS: &str = "the main ideas";

pub struct QuizAssembler {
  extractor: FeatureExtractor,
  synthesizer: QuestionSynthesizer,
  cache: Arc<dyn QuizCache>,
  llm: Option<Arc<dyn LlmClient>>,
  prompts: Prompts,
  generation: GenerationConfig,
  rng: Mutex<StdRng>,
}

pub struct QuizAssemblerBuilder {
  config: AppConfig,
  cache: Option<Arc<dyn QuizCache>>,
  llm: Option<Arc<dyn LlmClient>>,
  rng: Option<StdRng>,
}

impl QuizAssemblerBuilder {
  pub fn config(mut self, config: AppConfig) -> Self {
    self.config = config;
    self
  }

  pub fn llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
    self.llm = Some(llm);
    self
  }

  pub fn cache(mut self, cache: Arc<dyn QuizCache>) -> Self {
    self.cache = Some(cache);
    self
  }

  /// Fixed seed for reproducible distractor order, sentence picks and focus areas.
  pub fn seed(mut self, seed: u64) -> Self {
    self.rng = Some(StdRng::seed_from_u64(seed));
    self
  }

  pub fn build(self) -> QuizAssembler {
    let AppConfig { prompts, generation, domain_rules } = self.config;
    let mut rules = builtin_domain_rules();
    rules.extend(domain_rules);
    let extractor = FeatureExtractor {
      significant_numbers_only: generation.significant_numbers_only,
      keep_terms: rules.iter().map(|r| r.keyword.trim().to_lowercase()).collect(),
      ..Default::default()
    };
    let cache = self.cache.unwrap_or_else(|| Arc::new(LruQuizCache::new(generation.cache_capacity)));
    QuizAssembler {
      extractor,
      synthesizer: QuestionSynthesizer::new(rules),
      cache,
      llm: self.llm,
      prompts,
      generation,
      rng: Mutex::new(self.rng.unwrap_or_else(StdRng::from_entropy)),
    }
  }
}

impl QuizAssembler {
  pub fn builder() -> QuizAssemblerBuilder {
    QuizAssemblerBuilder { config: AppConfig::default(), cache: None, llm: None, rng: None }
  }

  pub fn has_remote(&self) -> bool {
    self.llm.is_some()
  }

  pub fn generation(&self) -> &GenerationConfig {
    &self.generation
  }

  #[instrument(
    level = "info",
    skip(self, request),
    fields(text_len = request.text.len(), count = request.count, difficulty = request.difficulty.as_str())
  )]
  pub async fn generate(&self, request: &GenerationRequest) -> Result<Vec<Question>, GenerationError> {
    let count = request.count;
    let difficulty = request.difficulty;
    if count == 0 {
      return Err(GenerationError::failed("requested question count must be at least 1"));
    }
    let text = request.text.trim();
    if text.is_empty() {
      return Err(GenerationError::failed("no usable text to generate from"));
    }

    let key = cache_key(text, self.generation.fingerprint_prefix_chars, count, difficulty);
    if let Some(hit) = self.cache.get(&key).await {
      info!(target: "mcq", %key, "cache hit");
      return Ok(hit);
    }

    let profile = detect_script(text).profile();
    let pack = WordingPack::for_profile(profile);
    let features = self.extractor.extract(text);
    debug!(
      target: "mcq",
      language = profile.language_name(),
      features = features.total(),
      metrics = %features.metrics.describe(),
      "features extracted"
    );
    let target = DistributionTarget::for_difficulty(difficulty);
    let mut seen: HashSet<String> = HashSet::new();

    // Remote questions within their category quota, and the ones past it.
    let mut remote: Vec<Question> = Vec::new();
    let mut surplus: Vec<Question> = Vec::new();
    if let Some(llm) = &self.llm {
      match self.remote_questions(llm.as_ref(), request, text, &features, profile, pack).await {
        Ok(candidates) => {
          let received = candidates.len();
          let filtered = QualityFilter::new(&features.concept_terms()).retain(candidates);
          let unique: Vec<Question> = filtered.into_iter().filter(|q| seen.insert(q.dedup_key())).collect();
          (remote, surplus) = split_by_quota(unique, &target, count);
          info!(target: "mcq", received, within_quota = remote.len(), surplus = surplus.len(), "remote questions accepted");
        }
        Err(e) => match self.generation.remote_failure {
          RemoteFailurePolicy::FallbackLocal => {
            warn!(target: "mcq", error = %e, "remote generation failed; falling back to rule-based questions");
          }
          RemoteFailurePolicy::Fail => {
            return Err(GenerationError::failed(format!("remote generation failed: {e}")));
          }
        },
      }
    }

    // Rule-based questions go to the categories the remote batch left open.
    // Surplus remote questions only fill what the rules could not.
    let (mut batch, from_remote, from_rules, padded) = {
      let schedule = target.schedule_remaining(count, &remote);
      let mut rng = self.rng.lock().await;
      let local = self.local_questions(text, &features, &schedule, difficulty, pack, &mut seen, &mut *rng);
      let from_rules = local.len();
      let candidates: Vec<Question> = remote.into_iter().chain(local).chain(surplus).collect();
      let mut batch = balance(candidates, &target, count);
      let from_remote = batch.len().saturating_sub(from_rules);
      let open = target.schedule_remaining(count, &batch);
      let padded = self.pad(&mut batch, count, &open, text, difficulty, pack, &mut seen, &mut *rng);
      (batch, from_remote, from_rules, padded)
    };
    batch.truncate(count);

    if batch.is_empty() {
      return Err(GenerationError::failed("neither remote nor rule-based generation produced a question"));
    }
    info!(target: "mcq", from_remote, from_rules, padded, total = batch.len(), "quiz assembled");
    self.cache.put(key, batch.clone()).await;
    Ok(batch)
  }

  async fn remote_questions(
    &self,
    llm: &dyn LlmClient,
    request: &GenerationRequest,
    text: &str,
    features: &FeatureSet,
    profile: ScriptProfile,
    pack: &'static WordingPack,
  ) -> Result<Vec<Question>, LlmError> {
    let (focus, seed) = {
      let mut rng = self.rng.lock().await;
      let focus = self.prompts.focus_areas.choose(&mut *rng).cloned().unwrap_or_else(|| DEFAULT_FOCUS.to_string());
      (focus, rng.gen::<u32>())
    };
    let prompt = self.build_prompt(request, text, features, profile, &focus, seed);
    debug!(target: "mcq", %focus, seed, prompt_len = prompt.len(), "remote prompt built");

    let parser = ResponseParser::new(self.generation.validation, request.difficulty, pack);
    let policy = self.generation.retry_policy();
    let prompt: &str = &prompt;
    run_with_retry(&policy, |attempt| async move {
      debug!(target: "mcq", attempt, "calling model");
      let raw = llm.complete(prompt).await?;
      let questions = parser.parse(&raw);
      if questions.is_empty() {
        return Err(LlmError::Transient("response contained no usable questions".into()));
      }
      Ok(questions)
    })
    .await
  }

  fn build_prompt(
    &self,
    request: &GenerationRequest,
    text: &str,
    features: &FeatureSet,
    profile: ScriptProfile,
    focus: &str,
    seed: u32,
  ) -> String {
    let mut excerpt = take_chars(text, self.generation.excerpt_chars).to_string();
    if excerpt.len() < text.len() {
      excerpt.push_str("...");
    }
    let count = request.count.to_string();
    let seed = seed.to_string();
    let metrics = features.metrics.describe();
    // `text` goes last so placeholders inside the document stay untouched.
    fill_template(
      &self.prompts.user_template,
      &[
        ("count", &count),
        ("difficulty", request.difficulty.as_str()),
        ("language", profile.language_name()),
        ("focus", focus),
        ("seed", &seed),
        ("metrics", &metrics),
        ("text", &excerpt),
      ],
    )
  }

  /// One rule-based question per schedule slot, rotating through feature kinds.
  /// Stops early once every feature is used up.
  #[allow(clippy::too_many_arguments)]
  fn local_questions(
    &self,
    text: &str,
    features: &FeatureSet,
    schedule: &[Category],
    difficulty: Difficulty,
    pack: &WordingPack,
    seen: &mut HashSet<String>,
    rng: &mut StdRng,
  ) -> Vec<Question> {
    let kinds = FeatureKind::ROTATION;
    let mut cursors = [0usize; 6];
    let mut next_kind = 0usize;
    let mut out = Vec::with_capacity(schedule.len());

    'slots: for &category in schedule {
      for step in 0..kinds.len() {
        let k = (next_kind + step) % kinds.len();
        let pool = features.of_kind(kinds[k]);
        while cursors[k] < pool.len() {
          let feature = &pool[cursors[k]];
          cursors[k] += 1;
          let Some(q) = self.synthesizer.synthesize(feature, text, category, difficulty, pack, rng) else { continue };
          if seen.insert(q.dedup_key()) {
            out.push(q);
            next_kind = (k + 1) % kinds.len();
            continue 'slots;
          }
        }
      }
      debug!(target: "mcq", produced = out.len(), wanted = schedule.len(), "features exhausted");
      break;
    }
    out
  }

  /// Generic "main point" questions, then the static question, until `count`.
  /// Returns how many were added.
  #[allow(clippy::too_many_arguments)]
  fn pad(
    &self,
    batch: &mut Vec<Question>,
    count: usize,
    categories: &[Category],
    text: &str,
    difficulty: Difficulty,
    pack: &WordingPack,
    seen: &mut HashSet<String>,
    rng: &mut StdRng,
  ) -> usize {
    let start = batch.len();
    let mut attempts = 0usize;
    // Past this many tries duplicates are accepted so the loop always ends.
    let patience = count * 3;
    while batch.len() < count {
      let category = categories.get(batch.len() - start).copied().unwrap_or(Category::Factual);
      let q = self
        .synthesizer
        .generic_question(text, category, difficulty, pack, rng)
        .unwrap_or_else(|| static_fallback_question(pack, category, difficulty));
      attempts += 1;
      if seen.insert(q.dedup_key()) || attempts > patience {
        batch.push(q);
      }
    }
    batch.len() - start
  }
}
