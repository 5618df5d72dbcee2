//! Quality gate for model-generated questions.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::domain::Question;
use crate::features::words_lower;

const AMBIGUOUS_PHRASES: &[&str] = &["all of the above", "none of the above", "both a and b", "either a or b"];
const MAX_PROMPT_CHARS: usize = 200;

static BIASED: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(?:obviously|clearly|definitely|certainly)\b").unwrap());
static VAGUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\betc\b|\band so on\b|\.\.\.|…").unwrap());

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
  Ambiguous,
  Biased,
  Unclear,
  Irrelevant,
}

impl Rejection {
  pub fn as_str(self) -> &'static str {
    match self {
      Rejection::Ambiguous => "ambiguous",
      Rejection::Biased => "biased",
      Rejection::Unclear => "unclear",
      Rejection::Irrelevant => "irrelevant",
    }
  }
}

pub struct QualityFilter {
  concepts: HashSet<String>,
}

impl QualityFilter {
  /// `concepts` is the extracted concept vocabulary of the source text. With an
  /// empty vocabulary the relevance check is skipped.
  pub fn new<S: AsRef<str>>(concepts: &[S]) -> Self {
    Self { concepts: concepts.iter().map(|c| c.as_ref().to_lowercase()).collect() }
  }

  pub fn check(&self, q: &Question) -> Result<(), Rejection> {
    let prompt = q.prompt();
    let mut surface = prompt.to_lowercase();
    for opt in q.options() {
      surface.push('\n');
      surface.push_str(&opt.text.to_lowercase());
    }

    if AMBIGUOUS_PHRASES.iter().any(|p| surface.contains(p)) {
      return Err(Rejection::Ambiguous);
    }
    if BIASED.is_match(&surface) {
      return Err(Rejection::Biased);
    }
    if prompt.chars().count() > MAX_PROMPT_CHARS || VAGUE.is_match(prompt) {
      return Err(Rejection::Unclear);
    }
    if !self.concepts.is_empty() && !words_lower(&surface).iter().any(|w| self.concepts.contains(w)) {
      return Err(Rejection::Irrelevant);
    }
    Ok(())
  }

  pub fn retain(&self, questions: Vec<Question>) -> Vec<Question> {
    let before = questions.len();
    let kept: Vec<Question> = questions
      .into_iter()
      .filter(|q| match self.check(q) {
        Ok(()) => true,
        Err(reason) => {
          debug!(target: "mcq", reason = reason.as_str(), prompt = %q.prompt(), "quality filter dropped question");
          false
        }
      })
      .collect();
    debug!(target: "mcq", before, after = kept.len(), "quality filter applied");
    kept
  }
}
