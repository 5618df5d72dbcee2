//! Turns a raw model response into validated questions.
//!
//! Three strategies, tried in order until one yields something:
//!   1. the outermost `[` .. `]` span parsed as a JSON list,
//!   2. standalone `{ .. "question": .. }` fragments parsed one by one,
//!   3. line-oriented recovery of "question / A) .. D) .." blocks.
//! Records that fail validation are dropped individually. Parsing never fails:
//! the worst case is an empty list.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::{Category, Difficulty, OptionLabel, Question};
use crate::error::ValidationError;
use crate::wording::WordingPack;

// One level of nesting covers `"options": {"A": ..}` maps.
static OBJECT_FRAGMENT: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r#"(?s)\{(?:[^{}]|\{[^{}]*\})*"(?:question|prompt)"(?:[^{}]|\{[^{}]*\})*\}"#).unwrap()
});
static LABEL_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\(?[A-Da-d][).:]\s+").unwrap());
static OPTION_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\(?([A-Da-d])[).:]\s+(.+)$").unwrap());
static ANSWER_LINE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"(?i)^\s*\**\s*(?:correct\s+)?answer\s*\**\s*[:\-]\s*\**\s*\(?([A-D])\b").unwrap());
static EXPLANATION_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\s*\**\s*explanation\s*\**\s*[:\-]\s*(.+)$").unwrap());
static QUESTION_NUMBER: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"(?i)^\s*(?:\*\*)?\s*(?:q(?:uestion)?\s*)?\d{1,3}\s*[.):]\s*(?:\*\*)?\s*").unwrap());

/// How strictly option lists from a model are checked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
  /// Exactly four options.
  #[default]
  Strict,
  /// Two or more options; short lists are padded with filler distractors and
  /// long ones truncated when the answer stays within the first four.
  Relaxed,
}

#[derive(Clone, Copy)]
pub struct ResponseParser {
  mode: ValidationMode,
  difficulty: Difficulty,
  pack: &'static WordingPack,
}

/// Loosely-typed record as models tend to emit it.
#[derive(Debug, Default, Deserialize)]
struct RawQuestion {
  #[serde(default, alias = "prompt", alias = "stem")]
  question: Option<String>,
  #[serde(default)]
  options: Option<RawOptions>,
  #[serde(default, alias = "answer", alias = "correct", alias = "correctLabel", alias = "correct_label")]
  correct_answer: Option<serde_json::Value>,
  #[serde(default)]
  explanation: Option<String>,
  #[serde(default)]
  category: Option<String>,
  #[serde(default)]
  difficulty: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawOptions {
  List(Vec<String>),
  /// `{"A": "..", "B": ".."}`
  Map(BTreeMap<String, String>),
}

impl RawOptions {
  fn into_texts(self) -> Vec<String> {
    match self {
      RawOptions::List(v) => v,
      RawOptions::Map(m) => {
        let mut keyed: Vec<(usize, String)> =
          m.into_iter().filter_map(|(k, v)| OptionLabel::parse(&k).map(|l| (l.index(), v))).collect();
        keyed.sort_by_key(|(i, _)| *i);
        keyed.into_iter().map(|(_, v)| v).collect()
      }
    }
  }
}

impl ResponseParser {
  pub fn new(mode: ValidationMode, difficulty: Difficulty, pack: &'static WordingPack) -> Self {
    Self { mode, difficulty, pack }
  }

  pub fn parse(&self, raw: &str) -> Vec<Question> {
    let from_list = self.parse_json_list(raw);
    if !from_list.is_empty() {
      debug!(target: "mcq", count = from_list.len(), "parsed response as JSON list");
      return from_list;
    }
    let from_objects = self.parse_json_objects(raw);
    if !from_objects.is_empty() {
      debug!(target: "mcq", count = from_objects.len(), "parsed response from object fragments");
      return from_objects;
    }
    let manual = self.parse_lines(raw);
    debug!(target: "mcq", count = manual.len(), "parsed response line by line");
    manual
  }

  fn parse_json_list(&self, raw: &str) -> Vec<Question> {
    let (Some(start), Some(end)) = (raw.find('['), raw.rfind(']')) else { return Vec::new() };
    if end <= start {
      return Vec::new();
    }
    let items: Vec<serde_json::Value> = match serde_json::from_str(&raw[start..=end]) {
      Ok(v) => v,
      Err(e) => {
        debug!(target: "mcq", error = %e, "response list is not valid JSON");
        return Vec::new();
      }
    };
    items
      .into_iter()
      .filter_map(|item| serde_json::from_value::<RawQuestion>(item).ok())
      .filter_map(|rq| self.keep(rq))
      .collect()
  }

  fn parse_json_objects(&self, raw: &str) -> Vec<Question> {
    OBJECT_FRAGMENT
      .find_iter(raw)
      .filter_map(|m| serde_json::from_str::<RawQuestion>(m.as_str()).ok())
      .filter_map(|rq| self.keep(rq))
      .collect()
  }

  fn parse_lines(&self, raw: &str) -> Vec<Question> {
    let mut blocks: Vec<ManualBlock> = Vec::new();
    let mut current: Option<ManualBlock> = None;

    for line in raw.lines().map(str::trim).filter(|l| !l.is_empty()) {
      if let Some(caps) = OPTION_LINE.captures(line) {
        if let Some(block) = current.as_mut() {
          block.options.push(caps[2].trim().to_string());
        }
      } else if let Some(caps) = ANSWER_LINE.captures(line) {
        if let Some(block) = current.as_mut() {
          block.answer = OptionLabel::parse(&caps[1]);
        }
      } else if let Some(caps) = EXPLANATION_LINE.captures(line) {
        if let Some(block) = current.as_mut() {
          block.explanation = Some(caps[1].trim().to_string());
        }
      } else if line.contains('?') || QUESTION_NUMBER.is_match(line) {
        blocks.extend(current.take());
        let prompt = QUESTION_NUMBER.replace(line, "").trim().trim_matches('*').trim().to_string();
        current = Some(ManualBlock { prompt, ..Default::default() });
      } else if let Some(block) = current.as_mut() {
        // Wrapped stem lines before the first option.
        if block.options.is_empty() {
          block.prompt.push(' ');
          block.prompt.push_str(line);
        }
      }
    }
    blocks.extend(current);

    blocks
      .into_iter()
      .filter(|b| !b.options.is_empty())
      .filter_map(|b| {
        let answer = match b.answer {
          Some(label) => label,
          None => {
            warn!(target: "mcq", prompt = %b.prompt, "recovered block has no answer line; assuming A");
            OptionLabel::A
          }
        };
        let rq = RawQuestion {
          question: Some(b.prompt),
          options: Some(RawOptions::List(b.options)),
          correct_answer: Some(serde_json::Value::String(answer.to_string())),
          explanation: b.explanation,
          ..Default::default()
        };
        self.keep(rq)
      })
      .collect()
  }

  fn keep(&self, rq: RawQuestion) -> Option<Question> {
    match self.validate(rq) {
      Ok(q) => Some(q),
      Err(err) => {
        debug!(target: "mcq", %err, "dropping invalid record");
        None
      }
    }
  }

  fn validate(&self, rq: RawQuestion) -> Result<Question, ValidationError> {
    let prompt = rq.question.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).ok_or(ValidationError::MissingPrompt)?;
    let mut options: Vec<String> = rq
      .options
      .map(RawOptions::into_texts)
      .unwrap_or_default()
      .into_iter()
      .map(|o| LABEL_PREFIX.replace(&o, "").trim().to_string())
      .collect();

    let answer = match rq.correct_answer {
      None | Some(serde_json::Value::Null) => return Err(ValidationError::MissingAnswer),
      Some(serde_json::Value::String(s)) => s,
      Some(other) => return Err(ValidationError::BadAnswer(other.to_string())),
    };
    let index = resolve_answer(&answer, &options).ok_or_else(|| ValidationError::BadAnswer(answer.clone()))?;

    match self.mode {
      ValidationMode::Strict => {
        if options.len() != 4 {
          return Err(ValidationError::OptionCount(options.len()));
        }
      }
      ValidationMode::Relaxed => {
        if options.len() < 2 {
          return Err(ValidationError::OptionCount(options.len()));
        }
        options.truncate(4);
        for filler in self.pack.filler_distractors {
          if options.len() == 4 {
            break;
          }
          if !options.iter().any(|o| o.eq_ignore_ascii_case(filler)) {
            options.push(filler.to_string());
          }
        }
      }
    }
    // Also rejects answers that sat beyond a truncated tail.
    let correct = OptionLabel::from_index(index)
      .filter(|_| index < options.len())
      .ok_or_else(|| ValidationError::BadAnswer(answer.clone()))?;

    let explanation = rq
      .explanation
      .map(|s| s.trim().to_string())
      .filter(|s| !s.is_empty())
      .unwrap_or_else(|| self.pack.default_explanation.to_string());
    let difficulty = match rq.difficulty.as_deref() {
      Some(d) if !d.trim().is_empty() => Difficulty::parse_lenient(Some(d)),
      _ => self.difficulty,
    };

    Question::new(prompt, options, correct, explanation, Category::parse_lenient(rq.category.as_deref()), difficulty)
  }
}

#[derive(Default)]
struct ManualBlock {
  prompt: String,
  options: Vec<String>,
  answer: Option<OptionLabel>,
  explanation: Option<String>,
}

/// A label ("B", "b)", "Option B") or, failing that, the text of one option.
fn resolve_answer(answer: &str, options: &[String]) -> Option<usize> {
  if let Some(label) = OptionLabel::parse(answer) {
    return Some(label.index());
  }
  let wanted = LABEL_PREFIX.replace(answer, "").trim().to_lowercase();
  options.iter().position(|o| o.to_lowercase() == wanted)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::language::ScriptProfile;

  fn parser(mode: ValidationMode) -> ResponseParser {
    ResponseParser::new(mode, Difficulty::Medium, WordingPack::for_profile(ScriptProfile::Latin))
  }

  fn question(prompt: &str, correct: OptionLabel, category: Category) -> Question {
    let opts = vec!["1971".to_string(), "1972".into(), "1973".into(), "1975".into()];
    Question::new(prompt, opts, correct, "Stated in the text.", category, Difficulty::Hard).unwrap()
  }

  #[test]
  fn recovers_serialized_questions_inside_prose_and_fences() {
    let originals = vec![
      question("When was the service founded?", OptionLabel::B, Category::Factual),
      question("Which year followed independence?", OptionLabel::D, Category::Analytical),
    ];
    let body = serde_json::to_string_pretty(&originals).unwrap();
    let raw = format!("Sure! Here are the questions:\n```json\n{body}\n```\nGood luck.");
    assert_eq!(parser(ValidationMode::Strict).parse(&raw), originals);
  }

  #[test]
  fn garbage_yields_nothing() {
    let p = parser(ValidationMode::Strict);
    assert!(p.parse("").is_empty());
    assert!(p.parse("lorem ipsum dolor sit amet ] [ {{{ not json").is_empty());
    assert!(p.parse("What? Nothing follows this line").is_empty());
  }

  #[test]
  fn drops_invalid_records_but_keeps_the_rest() {
    let raw = r#"[
      {"question": "Q1?", "options": ["a", "b", "c", "d"], "correct_answer": "C", "explanation": "x"},
      {"question": "Q2?", "options": ["a", "b", "c"], "correct_answer": "A", "explanation": "x"},
      {"question": "", "options": ["a", "b", "c", "d"], "correct_answer": "A"},
      {"question": "Q4?", "options": ["a", "b", "c", "d"], "correct_answer": "E"},
      {"question": "Q5?", "options": ["a", "b", "c", "d"]}
    ]"#;
    let out = parser(ValidationMode::Strict).parse(raw);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].correct_label(), OptionLabel::C);
    assert_eq!(out[0].difficulty(), Difficulty::Medium);
  }

  #[test]
  fn falls_back_to_object_fragments() {
    let raw = r#"Question one: {"prompt": "What is BCS?", "options": {"B": "Bank", "A": "Civil service", "C": "Court", "D": "Council"}, "answer": "A", "explanation": "From the text."}
      trailing ] junk [ and {"question": "Second?", "options": ["w", "x", "y", "z"], "correctLabel": "z"}"#;
    let out = parser(ValidationMode::Strict).parse(raw);
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].correct_option().text, "Civil service");
    assert_eq!(out[1].correct_label(), OptionLabel::D);
    assert_eq!(out[1].explanation(), "The correct answer is supported by the source text.");
  }

  #[test]
  fn manual_blocks_honour_answer_lines() {
    let raw = "1. Which body conducts the BCS exam?\nA) The PSC\nB) The army\nC) A bank\nD) A school\nAnswer: A\n\
      Explanation: The commission runs it.\n\n2. How many stages are there?\na) One\nb) Two\nc) Three\nd) Four\nCorrect answer: C";
    let out = parser(ValidationMode::Strict).parse(raw);
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].prompt(), "Which body conducts the BCS exam?");
    assert_eq!(out[0].explanation(), "The commission runs it.");
    assert_eq!(out[1].correct_label(), OptionLabel::C);
    assert_eq!(out[1].correct_option().text, "Three");
  }

  #[test]
  fn manual_block_without_answer_defaults_to_a() {
    let raw = "What is the capital?\nA) Dhaka\nB) Khulna\nC) Sylhet\nD) Rajshahi";
    let out = parser(ValidationMode::Strict).parse(raw);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].correct_label(), OptionLabel::A);
  }

  #[test]
  fn relaxed_mode_pads_and_truncates() {
    let raw = r#"[
      {"question": "Short?", "options": ["yes", "no"], "correct_answer": "B", "explanation": "x"},
      {"question": "Long?", "options": ["a", "b", "c", "d", "e"], "correct_answer": "A", "explanation": "x"},
      {"question": "Lost?", "options": ["a", "b", "c", "d", "e"], "correct_answer": "e", "explanation": "x"}
    ]"#;
    let relaxed = parser(ValidationMode::Relaxed).parse(raw);
    assert_eq!(relaxed.len(), 2);
    assert_eq!(relaxed[0].options()[2].text, "Not stated in the text");
    assert_eq!(relaxed[0].correct_option().text, "no");
    assert_eq!(relaxed[1].options()[3].text, "d");
    assert!(parser(ValidationMode::Strict).parse(raw).is_empty());
  }
}
