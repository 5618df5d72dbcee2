//! Feature extraction: facts, concept terms, dates, numbers, definitions and
//! term relationships pulled out of a normalized text body, plus coarse metrics.
//!
//! Extraction never fails. A category with nothing in it is an empty list and
//! the synthesizer simply skips it.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::domain::{ExtractedFeature, FeatureKind, RelationKind};
use crate::normalize::TERMINATORS;

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").unwrap());
static DATE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"\b\d{1,2}/\d{1,2}/\d{2,4}\b|\b\d{1,2}-\d{1,2}-\d{2,4}\b|\b\d{4}\b").unwrap());
static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d+(?:\.\d+)?\b").unwrap());

static RELATION_TRIGGERS: Lazy<Vec<(RelationKind, Regex)>> = Lazy::new(|| {
  let table: [(RelationKind, &str); 4] = [
    (RelationKind::CauseEffect, r"(?i)\b(?:leads to|results in|gives rise to|causes)\b"),
    (RelationKind::Similarity, r"(?i)\b(?:is similar to|is comparable to|resembles|is like)\b"),
    (RelationKind::Difference, r"(?i)\b(?:differs from|is different from|in contrast to|unlike)\b"),
    (RelationKind::Dependency, r"(?i)\b(?:depends on|relies on|is based on|requires)\b"),
  ];
  table.into_iter().map(|(kind, pat)| (kind, Regex::new(pat).unwrap())).collect()
});

const FACT_MARKERS: &[&str] = &[
  "is", "are", "was", "were", "has", "have", "consists", "includes", "contains", "established", "created",
  "formed", "হয়", "ছিল", "আছে", "হলো", "হয়েছিল", "প্রতিষ্ঠিত", "গঠিত",
];

const DEFINITION_MARKERS: &[&str] = &[
  "is defined as", "refers to", "means", "is a", "are", "is the", "known as", "বলা হয়", "অর্থ", "হলো",
];

const STOP_WORDS: &[&str] = &[
  "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "is", "are", "was", "were", "be",
  "been", "have", "has", "had", "do", "does", "did", "will", "would", "could", "should", "may", "might", "can",
  "this", "that", "these", "those", "a", "an", "as", "from", "not", "no", "yes", "so", "if", "then", "else",
  "when", "where", "why", "how", "what", "which", "who", "whom", "whose", "there", "their", "about", "after",
  "before", "other", "into", "through", "during", "under", "between", "while", "also", "such", "being", "its",
  "they", "them", "these", "each", "every", "some", "more", "most", "very", "only", "than", "several",
  "এবং", "একটি", "এই", "থেকে", "করে", "জন্য", "সঙ্গে", "তার", "কিন্তু", "অথবা", "যেমন", "করা", "হয়",
];

/// Upper bound per category; keeps downstream work small.
#[derive(Clone, Copy, Debug)]
pub struct ExtractionLimits {
  pub facts: usize,
  pub concepts: usize,
  pub dates: usize,
  pub numbers: usize,
  pub definitions: usize,
  pub relationships: usize,
}

impl Default for ExtractionLimits {
  fn default() -> Self {
    Self { facts: 10, concepts: 20, dates: 10, numbers: 10, definitions: 10, relationships: 10 }
  }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct TextMetrics {
  pub sentence_count: usize,
  pub word_count: usize,
  pub avg_sentence_words: f32,
  pub lexical_diversity: f32,
}

impl TextMetrics {
  /// Short human-readable summary for prompts and logs.
  pub fn describe(&self) -> String {
    let level = if self.avg_sentence_words > 22.0 || self.lexical_diversity > 0.7 {
      "dense"
    } else if self.avg_sentence_words > 12.0 {
      "moderate"
    } else {
      "simple"
    };
    format!(
      "{} sentences, {} words, {:.1} words/sentence, {} prose",
      self.sentence_count, self.word_count, self.avg_sentence_words, level
    )
  }
}

/// Everything one extraction pass produced.
#[derive(Clone, Debug, Default)]
pub struct FeatureSet {
  pub facts: Vec<ExtractedFeature>,
  pub concepts: Vec<ExtractedFeature>,
  pub dates: Vec<ExtractedFeature>,
  pub numbers: Vec<ExtractedFeature>,
  pub definitions: Vec<ExtractedFeature>,
  pub relationships: Vec<ExtractedFeature>,
  pub metrics: TextMetrics,
}

impl FeatureSet {
  pub fn of_kind(&self, kind: FeatureKind) -> &[ExtractedFeature] {
    match kind {
      FeatureKind::Fact => &self.facts,
      FeatureKind::Concept => &self.concepts,
      FeatureKind::Date => &self.dates,
      FeatureKind::Number => &self.numbers,
      FeatureKind::Definition => &self.definitions,
      FeatureKind::Relationship => &self.relationships,
    }
  }

  pub fn concept_terms(&self) -> Vec<&str> {
    self
      .concepts
      .iter()
      .filter_map(|f| match f {
        ExtractedFeature::Concept { term, .. } => Some(term.as_str()),
        _ => None,
      })
      .collect()
  }

  pub fn total(&self) -> usize {
    FeatureKind::ROTATION.iter().map(|k| self.of_kind(*k).len()).sum()
  }
}

#[derive(Clone, Debug)]
pub struct FeatureExtractor {
  pub limits: ExtractionLimits,
  /// Drop numbers <= 10; small counts rarely make meaningful questions.
  pub significant_numbers_only: bool,
  /// Lowercase terms kept as concepts even when shorter than the usual
  /// five-character minimum (domain keywords such as "bcs" or "exam").
  pub keep_terms: Vec<String>,
}

impl Default for FeatureExtractor {
  fn default() -> Self {
    Self { limits: ExtractionLimits::default(), significant_numbers_only: true, keep_terms: Vec::new() }
  }
}

impl FeatureExtractor {
  pub fn extract(&self, text: &str) -> FeatureSet {
    let sentences = split_sentences(text);
    FeatureSet {
      facts: self.facts(&sentences),
      concepts: self.concepts(text),
      dates: self.dates(text),
      numbers: self.numbers(text),
      definitions: self.definitions(&sentences),
      relationships: self.relationships(&sentences),
      metrics: metrics(text, &sentences),
    }
  }

  fn facts(&self, sentences: &[&str]) -> Vec<ExtractedFeature> {
    sentences
      .iter()
      .filter(|s| s.chars().count() > 20)
      .filter(|s| words_lower(s).iter().any(|w| FACT_MARKERS.contains(&w.as_str())))
      .take(self.limits.facts)
      .map(|s| ExtractedFeature::Fact { sentence: s.to_string() })
      .collect()
  }

  fn concepts(&self, text: &str) -> Vec<ExtractedFeature> {
    // (frequency, first occurrence) per term; sort is stable on first occurrence.
    let mut freq: HashMap<String, (usize, usize)> = HashMap::new();
    for (pos, word) in words_lower(text).into_iter().enumerate() {
      let short = word.chars().count() <= 4 && !self.keep_terms.iter().any(|k| *k == word);
      if short || STOP_WORDS.contains(&word.as_str()) || word.chars().all(|c| c.is_numeric()) {
        continue;
      }
      freq.entry(word).or_insert((0, pos)).0 += 1;
    }
    let mut ranked: Vec<(String, usize, usize)> = freq.into_iter().map(|(w, (n, first))| (w, n, first)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    ranked
      .into_iter()
      .take(self.limits.concepts)
      .map(|(term, frequency, _)| ExtractedFeature::Concept { term, frequency })
      .collect()
  }

  fn dates(&self, text: &str) -> Vec<ExtractedFeature> {
    unique_matches(&DATE, text)
      .into_iter()
      .take(self.limits.dates)
      .map(|value| ExtractedFeature::Date { value })
      .collect()
  }

  /// Values that already read as a date ("1972") are left to the date list.
  fn numbers(&self, text: &str) -> Vec<ExtractedFeature> {
    let date_values: HashSet<&str> = DATE.find_iter(text).map(|m| m.as_str()).collect();
    unique_matches(&NUMBER, text)
      .into_iter()
      .filter(|n| !date_values.contains(n.as_str()))
      .filter(|n| !self.significant_numbers_only || parse_number(n).map_or(true, |v| v > 10.0))
      .take(self.limits.numbers)
      .map(|value| ExtractedFeature::Number { value })
      .collect()
  }

  fn definitions(&self, sentences: &[&str]) -> Vec<ExtractedFeature> {
    sentences
      .iter()
      .filter(|s| s.chars().count() > 20)
      .filter(|s| {
        let padded = format!(" {} ", words_lower(s).join(" "));
        DEFINITION_MARKERS.iter().any(|m| padded.contains(&format!(" {m} ")))
      })
      .take(self.limits.definitions)
      .map(|s| ExtractedFeature::Definition { sentence: s.to_string() })
      .collect()
  }

  fn relationships(&self, sentences: &[&str]) -> Vec<ExtractedFeature> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    for sentence in sentences {
      for (kind, trigger) in RELATION_TRIGGERS.iter() {
        let Some(m) = trigger.find(sentence) else { continue };
        let before = content_words(&sentence[..m.start()]);
        let after = content_words(&sentence[m.end()..]);
        if before.is_empty() || after.is_empty() {
          continue;
        }
        let term_a = before[before.len().saturating_sub(2)..].join(" ");
        let term_b = after[..after.len().min(2)].join(" ");
        if seen.insert((term_a.to_lowercase(), term_b.to_lowercase(), *kind)) {
          out.push(ExtractedFeature::Relationship { term_a, term_b, kind: *kind });
        }
      }
      if out.len() >= self.limits.relationships {
        break;
      }
    }
    out.truncate(self.limits.relationships);
    out
  }
}

/// Split on sentence terminators. A '.' inside a number ("3.5") is not a boundary.
pub fn split_sentences(text: &str) -> Vec<&str> {
  let mut out = Vec::new();
  let mut start = 0usize;
  let mut iter = text.char_indices().peekable();
  while let Some((idx, ch)) = iter.next() {
    if !TERMINATORS.contains(&ch) {
      continue;
    }
    let at_boundary = match iter.peek() {
      None => true,
      Some((_, next)) => next.is_whitespace() || ch == '।' || ch == '॥',
    };
    if at_boundary {
      let s = text[start..idx].trim();
      if !s.is_empty() {
        out.push(s);
      }
      start = idx + ch.len_utf8();
    }
  }
  let tail = text[start..].trim();
  if !tail.is_empty() {
    out.push(tail);
  }
  out
}

/// Lowercased word tokens (Unicode word chars, marks included).
pub fn words_lower(text: &str) -> Vec<String> {
  WORD.find_iter(text).map(|m| m.as_str().to_lowercase()).collect()
}

pub fn is_stop_word(word: &str) -> bool {
  STOP_WORDS.contains(&word.to_lowercase().as_str())
}

fn content_words(fragment: &str) -> Vec<&str> {
  WORD.find_iter(fragment).map(|m| m.as_str()).filter(|w| !is_stop_word(w)).collect()
}

fn unique_matches(re: &Regex, text: &str) -> Vec<String> {
  let mut seen = HashSet::new();
  re.find_iter(text)
    .map(|m| m.as_str().to_string())
    .filter(|v| seen.insert(v.clone()))
    .collect()
}

/// Parse a number written in ASCII or Bengali digits.
pub fn parse_number(raw: &str) -> Option<f64> {
  let ascii: String = raw
    .chars()
    .map(|c| match c {
      '\u{09E6}'..='\u{09EF}' => char::from(b'0' + (c as u32 - 0x09E6) as u8),
      other => other,
    })
    .collect();
  ascii.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn metrics(text: &str, sentences: &[&str]) -> TextMetrics {
  let words = words_lower(text);
  let unique: HashSet<&String> = words.iter().collect();
  let sentence_count = sentences.len();
  TextMetrics {
    sentence_count,
    word_count: words.len(),
    avg_sentence_words: if sentence_count == 0 { 0.0 } else { words.len() as f32 / sentence_count as f32 },
    lexical_diversity: if words.is_empty() { 0.0 } else { unique.len() as f32 / words.len() as f32 },
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const BCS: &str = "The Bangladesh Civil Service was established in 1972 following independence. \
    The examination consists of preliminary, written and viva voce stages. \
    The preliminary examination has 200 multiple choice questions. \
    A cadre refers to a branch of the civil service with its own duties. \
    Strong preparation leads to better results in the examination. \
    Candidates sat the test on 12/05/2021 and results came 3.5 months later.";

  #[test]
  fn splits_sentences_without_breaking_decimals() {
    let s = split_sentences("Growth was 3.5 percent. Next one! আমার নাম। Last");
    assert_eq!(s, vec!["Growth was 3.5 percent", "Next one", "আমার নাম", "Last"]);
  }

  #[test]
  fn facts_need_length_and_a_copula() {
    let fs = FeatureExtractor::default().extract(BCS);
    assert!(fs.facts.iter().any(|f| matches!(f, ExtractedFeature::Fact { sentence } if sentence.contains("established in 1972"))));
    let short = FeatureExtractor::default().extract("It is. Dogs run fast across the big open field.");
    assert!(short.facts.is_empty());
  }

  #[test]
  fn concepts_rank_by_frequency_with_stable_ties() {
    let fs = FeatureExtractor::default().extract("alpha gamma beta gamma delta gamma alpha zebra.");
    let terms = fs.concept_terms();
    assert_eq!(terms, vec!["gamma", "alpha", "delta", "zebra"]);
    match &fs.concepts[0] {
      ExtractedFeature::Concept { frequency, .. } => assert_eq!(*frequency, 3),
      other => panic!("unexpected {other:?}"),
    }
  }

  #[test]
  fn finds_single_year_once() {
    let fs = FeatureExtractor::default().extract("The agency was established in 1984 by decree. It was established in 1984.");
    assert_eq!(fs.dates, vec![ExtractedFeature::Date { value: "1984".into() }]);
  }

  #[test]
  fn date_forms_and_significant_numbers() {
    let fs = FeatureExtractor::default().extract(BCS);
    let dates: Vec<_> = fs.dates.iter().map(|d| match d { ExtractedFeature::Date { value } => value.as_str(), _ => "" }).collect();
    assert_eq!(dates, vec!["1972", "12/05/2021"]);
    let numbers: Vec<_> = fs.numbers.iter().map(|d| match d { ExtractedFeature::Number { value } => value.as_str(), _ => "" }).collect();
    assert!(numbers.contains(&"200"));
    assert!(!numbers.contains(&"3.5"));
    assert!(!numbers.contains(&"05"));
  }

  #[test]
  fn years_are_dates_not_numbers() {
    let fs = FeatureExtractor::default().extract("The service was formed in 1972 and now has 350 officers in 1972 posts.");
    assert_eq!(fs.dates, vec![ExtractedFeature::Date { value: "1972".into() }]);
    assert_eq!(fs.numbers, vec![ExtractedFeature::Number { value: "350".into() }]);
  }

  #[test]
  fn keep_terms_survive_the_length_cut() {
    let text = "The BCS exam is held each year. The BCS exam draws many candidates.";
    assert!(!FeatureExtractor::default().extract(text).concept_terms().contains(&"bcs"));

    let extractor = FeatureExtractor { keep_terms: vec!["bcs".into(), "exam".into()], ..Default::default() };
    let terms = extractor.extract(text).concept_terms().into_iter().map(String::from).collect::<Vec<_>>();
    assert_eq!(&terms[..2], &["bcs".to_string(), "exam".to_string()]);
    assert!(!terms.contains(&"held".to_string()));
  }

  #[test]
  fn definitions_and_relationships() {
    let fs = FeatureExtractor::default().extract(BCS);
    assert!(fs.definitions.iter().any(|f| matches!(f, ExtractedFeature::Definition { sentence } if sentence.starts_with("A cadre refers to"))));
    assert!(fs.relationships.contains(&ExtractedFeature::Relationship {
      term_a: "Strong preparation".into(),
      term_b: "better results".into(),
      kind: RelationKind::CauseEffect,
    }));
  }

  #[test]
  fn empty_text_yields_empty_lists() {
    let fs = FeatureExtractor::default().extract("");
    assert_eq!(fs.total(), 0);
    assert_eq!(fs.metrics, TextMetrics::default());
  }

  #[test]
  fn parses_bengali_digits() {
    assert_eq!(parse_number("১৯৭২"), Some(1972.0));
    assert_eq!(parse_number("3.5"), Some(3.5));
    assert_eq!(parse_number("12/05"), None);
  }
}
