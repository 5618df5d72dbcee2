//! Domain models: generated questions, their labels/categories/difficulty, the
//! generation request, and the features extracted from source text.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::ValidationError;

/// Stable option label. Label order always matches option index order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OptionLabel {
  A,
  B,
  C,
  D,
}

impl OptionLabel {
  pub const ALL: [OptionLabel; 4] = [OptionLabel::A, OptionLabel::B, OptionLabel::C, OptionLabel::D];

  pub fn index(self) -> usize {
    match self {
      OptionLabel::A => 0,
      OptionLabel::B => 1,
      OptionLabel::C => 2,
      OptionLabel::D => 3,
    }
  }

  pub fn from_index(i: usize) -> Option<Self> {
    Self::ALL.get(i).copied()
  }

  pub fn as_char(self) -> char {
    match self {
      OptionLabel::A => 'A',
      OptionLabel::B => 'B',
      OptionLabel::C => 'C',
      OptionLabel::D => 'D',
    }
  }

  /// Lenient label parsing: accepts "A", "b", "C)", "(d)", "Option B", "a.".
  /// Rejects words that merely start with a label letter ("Apple").
  pub fn parse(raw: &str) -> Option<Self> {
    let s = raw.trim();
    let s = match (s.get(..6), s.get(6..)) {
      (Some(head), Some(rest)) if head.eq_ignore_ascii_case("option") => rest.trim_start(),
      _ => s,
    };
    let s = s.trim_start_matches('(');
    let mut chars = s.chars();
    let first = chars.next()?;
    if chars.as_str().chars().next().map_or(false, |c| c.is_alphanumeric()) {
      return None;
    }
    match first.to_ascii_uppercase() {
      'A' => Some(OptionLabel::A),
      'B' => Some(OptionLabel::B),
      'C' => Some(OptionLabel::C),
      'D' => Some(OptionLabel::D),
      _ => None,
    }
  }
}

impl fmt::Display for OptionLabel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_char())
  }
}

/// Cognitive category a question targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
  Factual,
  Conceptual,
  Analytical,
  Application,
  CriticalThinking,
}

impl Category {
  pub const ALL: [Category; 5] = [
    Category::Factual,
    Category::Conceptual,
    Category::Analytical,
    Category::Application,
    Category::CriticalThinking,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Category::Factual => "factual",
      Category::Conceptual => "conceptual",
      Category::Analytical => "analytical",
      Category::Application => "application",
      Category::CriticalThinking => "critical_thinking",
    }
  }

  /// Unknown or missing values map to `Factual`.
  pub fn parse_lenient(raw: Option<&str>) -> Self {
    let norm = raw.unwrap_or_default().trim().to_lowercase().replace([' ', '-'], "_");
    match norm.as_str() {
      "conceptual" => Category::Conceptual,
      "analytical" => Category::Analytical,
      "application" => Category::Application,
      "critical_thinking" | "critical" => Category::CriticalThinking,
      _ => Category::Factual,
    }
  }

  pub(crate) fn slot(self) -> usize {
    match self {
      Category::Factual => 0,
      Category::Conceptual => 1,
      Category::Analytical => 2,
      Category::Application => 3,
      Category::CriticalThinking => 4,
    }
  }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
  Easy,
  #[default]
  Medium,
  Hard,
}

impl Difficulty {
  pub fn as_str(self) -> &'static str {
    match self {
      Difficulty::Easy => "easy",
      Difficulty::Medium => "medium",
      Difficulty::Hard => "hard",
    }
  }

  /// Unknown or missing values map to `Medium`.
  pub fn parse_lenient(raw: Option<&str>) -> Self {
    match raw.unwrap_or_default().trim().to_lowercase().as_str() {
      "easy" => Difficulty::Easy,
      "hard" => Difficulty::Hard,
      _ => Difficulty::Medium,
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionOption {
  pub label: OptionLabel,
  pub text: String,
}

impl fmt::Display for QuestionOption {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}) {}", self.label, self.text)
  }
}

/// One validated MCQ. Immutable once built: exactly four labelled options and a
/// correct label that always indexes one of them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Question {
  prompt: String,
  options: [QuestionOption; 4],
  correct: OptionLabel,
  explanation: String,
  category: Category,
  difficulty: Difficulty,
}

impl Question {
  pub fn new(
    prompt: impl Into<String>,
    options: Vec<String>,
    correct: OptionLabel,
    explanation: impl Into<String>,
    category: Category,
    difficulty: Difficulty,
  ) -> Result<Self, ValidationError> {
    let prompt = prompt.into().trim().to_string();
    if prompt.is_empty() {
      return Err(ValidationError::MissingPrompt);
    }
    if options.len() != 4 {
      return Err(ValidationError::OptionCount(options.len()));
    }
    let texts: Vec<String> = options.into_iter().map(|o| o.trim().to_string()).collect();
    if texts.iter().any(|t| t.is_empty()) {
      return Err(ValidationError::EmptyOption);
    }
    for (i, a) in texts.iter().enumerate() {
      if texts[..i].iter().any(|b| b.to_lowercase() == a.to_lowercase()) {
        return Err(ValidationError::DuplicateOption(a.clone()));
      }
    }
    let explanation = explanation.into().trim().to_string();
    if explanation.is_empty() {
      return Err(ValidationError::MissingExplanation);
    }

    let mut it = texts.into_iter();
    let mut next = |label| QuestionOption { label, text: it.next().unwrap_or_default() };
    let options = [next(OptionLabel::A), next(OptionLabel::B), next(OptionLabel::C), next(OptionLabel::D)];

    Ok(Self { prompt, options, correct, explanation, category, difficulty })
  }

  /// For fixed built-in content only; skips validation.
  pub(crate) fn from_static(
    prompt: &str,
    options: [&str; 4],
    explanation: &str,
    category: Category,
    difficulty: Difficulty,
  ) -> Self {
    let [a, b, c, d] = options;
    let opt = |label, text: &str| QuestionOption { label, text: text.to_string() };
    Self {
      prompt: prompt.to_string(),
      options: [opt(OptionLabel::A, a), opt(OptionLabel::B, b), opt(OptionLabel::C, c), opt(OptionLabel::D, d)],
      correct: OptionLabel::A,
      explanation: explanation.to_string(),
      category,
      difficulty,
    }
  }

  pub fn prompt(&self) -> &str { &self.prompt }
  pub fn options(&self) -> &[QuestionOption; 4] { &self.options }
  pub fn correct_label(&self) -> OptionLabel { self.correct }
  pub fn correct_option(&self) -> &QuestionOption { &self.options[self.correct.index()] }
  pub fn explanation(&self) -> &str { &self.explanation }
  pub fn category(&self) -> Category { self.category }
  pub fn difficulty(&self) -> Difficulty { self.difficulty }

  /// Identity used for de-duplication: same stem and same correct answer.
  pub fn dedup_key(&self) -> String {
    format!("{}|{}", self.prompt.to_lowercase(), self.correct_option().text.to_lowercase())
  }
}

/// Wire shape shared by the HTTP API and the model prompt:
/// `{question, options: ["A) ..", ..], correct_answer, explanation, category, difficulty}`.
#[derive(Serialize)]
struct QuestionWire<'a> {
  question: &'a str,
  options: Vec<String>,
  correct_answer: String,
  explanation: &'a str,
  category: Category,
  difficulty: Difficulty,
}

impl Serialize for Question {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    QuestionWire {
      question: &self.prompt,
      options: self.options.iter().map(|o| o.to_string()).collect(),
      correct_answer: self.correct.to_string(),
      explanation: &self.explanation,
      category: self.category,
      difficulty: self.difficulty,
    }
    .serialize(serializer)
  }
}

/// Input contract of `generate`. Callers pre-validate the minimum text length.
#[derive(Clone, Debug)]
pub struct GenerationRequest {
  pub text: String,
  pub count: usize,
  pub difficulty: Difficulty,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RelationKind {
  CauseEffect,
  Similarity,
  Difference,
  Dependency,
}

impl RelationKind {
  pub const ALL: [RelationKind; 4] =
    [RelationKind::CauseEffect, RelationKind::Similarity, RelationKind::Difference, RelationKind::Dependency];
}

/// Discriminant of `ExtractedFeature`; also the fixed local-path rotation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FeatureKind {
  Fact,
  Concept,
  Date,
  Number,
  Definition,
  Relationship,
}

impl FeatureKind {
  pub const ROTATION: [FeatureKind; 6] = [
    FeatureKind::Fact,
    FeatureKind::Concept,
    FeatureKind::Date,
    FeatureKind::Number,
    FeatureKind::Definition,
    FeatureKind::Relationship,
  ];
}

/// One unit of signal pulled out of a text body. Transient: produced per run and
/// consumed immediately by the synthesizer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExtractedFeature {
  Fact { sentence: String },
  Concept { term: String, frequency: usize },
  Date { value: String },
  Number { value: String },
  Definition { sentence: String },
  Relationship { term_a: String, term_b: String, kind: RelationKind },
}

impl ExtractedFeature {
  pub fn kind(&self) -> FeatureKind {
    match self {
      ExtractedFeature::Fact { .. } => FeatureKind::Fact,
      ExtractedFeature::Concept { .. } => FeatureKind::Concept,
      ExtractedFeature::Date { .. } => FeatureKind::Date,
      ExtractedFeature::Number { .. } => FeatureKind::Number,
      ExtractedFeature::Definition { .. } => FeatureKind::Definition,
      ExtractedFeature::Relationship { .. } => FeatureKind::Relationship,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn opts() -> Vec<String> {
    vec!["one".into(), "two".into(), "three".into(), "four".into()]
  }

  #[test]
  fn label_parsing_is_lenient_but_not_greedy() {
    assert_eq!(OptionLabel::parse("A"), Some(OptionLabel::A));
    assert_eq!(OptionLabel::parse(" c) "), Some(OptionLabel::C));
    assert_eq!(OptionLabel::parse("(d)"), Some(OptionLabel::D));
    assert_eq!(OptionLabel::parse("Option B"), Some(OptionLabel::B));
    assert_eq!(OptionLabel::parse("Apple"), None);
    assert_eq!(OptionLabel::parse("E"), None);
    assert_eq!(OptionLabel::parse(""), None);
  }

  #[test]
  fn question_requires_exactly_four_distinct_options() {
    let three = vec!["a".to_string(), "b".into(), "c".into()];
    assert_eq!(
      Question::new("Q?", three, OptionLabel::A, "why", Category::Factual, Difficulty::Easy),
      Err(ValidationError::OptionCount(3))
    );
    let dup = vec!["a".to_string(), "B".into(), "b".into(), "c".into()];
    assert!(matches!(
      Question::new("Q?", dup, OptionLabel::A, "why", Category::Factual, Difficulty::Easy),
      Err(ValidationError::DuplicateOption(_))
    ));
    let q = Question::new("Q?", opts(), OptionLabel::C, "why", Category::Factual, Difficulty::Easy).unwrap();
    assert_eq!(q.correct_option().text, "three");
    assert_eq!(q.options()[3].to_string(), "D) four");
  }

  #[test]
  fn serializes_with_labelled_options() {
    let q = Question::new("Q?", opts(), OptionLabel::B, "why", Category::CriticalThinking, Difficulty::Hard).unwrap();
    let v = serde_json::to_value(&q).unwrap();
    assert_eq!(v["question"], "Q?");
    assert_eq!(v["options"][0], "A) one");
    assert_eq!(v["correct_answer"], "B");
    assert_eq!(v["category"], "critical_thinking");
    assert_eq!(v["difficulty"], "hard");
  }

  #[test]
  fn lenient_enums_fall_back_to_defaults() {
    assert_eq!(Category::parse_lenient(Some("Critical Thinking")), Category::CriticalThinking);
    assert_eq!(Category::parse_lenient(Some("weird")), Category::Factual);
    assert_eq!(Category::parse_lenient(None), Category::Factual);
    assert_eq!(Difficulty::parse_lenient(Some("HARD")), Difficulty::Hard);
    assert_eq!(Difficulty::parse_lenient(Some("")), Difficulty::Medium);
  }
}
