//! Rule-based question synthesis: one template family per feature kind.
//!
//! Rule-based questions always put the correct answer at `A`; the three
//! distractors are shuffled over `B..D` with the injected RNG.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::domain::{Category, Difficulty, ExtractedFeature, OptionLabel, Question, RelationKind};
use crate::features::{is_stop_word, parse_number, split_sentences};
use crate::seeds::{builtin_domain_rules, find_rule, DomainRule};
use crate::util::{clip_sentence, fill_template};
use crate::wording::{WordingPack, BLANK};

const OPTION_CHARS: usize = 160;
const SOURCE_CHARS: usize = 200;
const CLOZE_CHARS: usize = 180;
const GENERIC_MIN_CHARS: usize = 30;

#[derive(Clone, Debug)]
pub struct QuestionSynthesizer {
  rules: Vec<DomainRule>,
}

impl Default for QuestionSynthesizer {
  fn default() -> Self {
    Self::new(builtin_domain_rules())
  }
}

impl QuestionSynthesizer {
  pub fn new(rules: Vec<DomainRule>) -> Self {
    Self { rules }
  }

  /// Turn one feature into a question for `category`. `None` when the feature
  /// is unusable (empty values, or options that collapse into duplicates).
  pub fn synthesize<R: Rng + ?Sized>(
    &self,
    feature: &ExtractedFeature,
    full_text: &str,
    category: Category,
    difficulty: Difficulty,
    pack: &WordingPack,
    rng: &mut R,
  ) -> Option<Question> {
    let draft = match feature {
      ExtractedFeature::Fact { sentence } => fact_draft(sentence, category, pack)?,
      ExtractedFeature::Definition { sentence } => definition_draft(sentence, category, pack)?,
      ExtractedFeature::Concept { term, frequency } => {
        let term = term.trim();
        if term.is_empty() {
          return None;
        }
        if let Some(rule) = find_rule(&self.rules, term) {
          debug!(target: "mcq", keyword = %rule.keyword, concept = %term, "domain rule matched");
          return rule.render(term, category, difficulty).ok();
        }
        concept_draft(term, *frequency, full_text, category, pack)
      }
      ExtractedFeature::Date { value } => {
        let kind = if value.chars().count() == 4 && parse_number(value).is_some() { pack.kind_year } else { pack.kind_date };
        value_draft(value, kind, full_text, category, pack)?
      }
      ExtractedFeature::Number { value } => value_draft(value, pack.kind_number, full_text, category, pack)?,
      ExtractedFeature::Relationship { term_a, term_b, kind } => relationship_draft(term_a, term_b, *kind, category, pack)?,
    };
    draft.build(category, difficulty, rng)
  }

  /// "Main point" question over a random sentence longer than 30 chars.
  /// `None` when the text has no such sentence.
  pub fn generic_question<R: Rng + ?Sized>(
    &self,
    full_text: &str,
    category: Category,
    difficulty: Difficulty,
    pack: &WordingPack,
    rng: &mut R,
  ) -> Option<Question> {
    let candidates: Vec<&str> =
      split_sentences(full_text).into_iter().filter(|s| s.chars().count() > GENERIC_MIN_CHARS).collect();
    let sentence = candidates.choose(rng)?;
    Draft {
      prompt: pack.generic_prompt.to_string(),
      correct: clip_sentence(sentence, OPTION_CHARS),
      distractors: pack.generic_distractors.iter().map(|s| s.to_string()).collect(),
      explanation: fill_template(pack.explain_generic, &[("source", &clip_sentence(sentence, SOURCE_CHARS))]),
    }
    .build(category, difficulty, rng)
  }
}

/// Prompt, correct answer and three distractors before shuffling/validation.
struct Draft {
  prompt: String,
  correct: String,
  distractors: Vec<String>,
  explanation: String,
}

impl Draft {
  fn build<R: Rng + ?Sized>(mut self, category: Category, difficulty: Difficulty, rng: &mut R) -> Option<Question> {
    self.distractors.shuffle(rng);
    let mut options = Vec::with_capacity(4);
    options.push(self.correct);
    options.extend(self.distractors);
    match Question::new(self.prompt, options, OptionLabel::A, self.explanation, category, difficulty) {
      Ok(q) => Some(q),
      Err(err) => {
        debug!(target: "mcq", %err, "synthesized question rejected");
        None
      }
    }
  }
}

fn fact_draft(sentence: &str, category: Category, pack: &WordingPack) -> Option<Draft> {
  let sentence = sentence.trim();
  if sentence.is_empty() {
    return None;
  }
  let subject = leading_phrase(sentence).unwrap_or_else(|| pack.fact_fallback_subject.to_string());
  Some(Draft {
    prompt: fill_template(pack.statement_stem(category), &[("subject", &subject)]),
    correct: clip_sentence(sentence, OPTION_CHARS),
    distractors: pack.fact_distractors.iter().map(|s| s.to_string()).collect(),
    explanation: fill_template(pack.explain_fact, &[("source", &clip_sentence(sentence, SOURCE_CHARS))]),
  })
}

fn definition_draft(sentence: &str, category: Category, pack: &WordingPack) -> Option<Draft> {
  let sentence = sentence.trim();
  if sentence.is_empty() {
    return None;
  }
  // The defined term leads the sentence ("A cadre refers to ...").
  let subject = content_words(sentence).into_iter().next().unwrap_or(pack.definition_fallback_subject);
  Some(Draft {
    prompt: fill_template(pack.statement_stem(category), &[("subject", subject)]),
    correct: clip_sentence(sentence, OPTION_CHARS),
    distractors: pack.definition_distractors.iter().map(|s| s.to_string()).collect(),
    explanation: fill_template(pack.explain_definition, &[("source", &clip_sentence(sentence, SOURCE_CHARS))]),
  })
}

fn concept_draft(term: &str, frequency: usize, full_text: &str, category: Category, pack: &WordingPack) -> Draft {
  let [correct, rest @ ..] = pack.concept_options.map(|o| fill_template(o, &[("concept", term)]));
  let needle = term.to_lowercase();
  let source = split_sentences(full_text)
    .into_iter()
    .find(|s| s.to_lowercase().contains(&needle))
    .map(|s| clip_sentence(s, SOURCE_CHARS))
    .unwrap_or_else(|| term.to_string());
  let count = frequency.max(1).to_string();
  Draft {
    prompt: fill_template(pack.statement_stem(category), &[("subject", term)]),
    correct,
    distractors: rest.to_vec(),
    explanation: fill_template(pack.explain_concept, &[("concept", term), ("count", &count), ("source", &source)]),
  }
}

/// Date and number questions: cloze over the sentence holding the value.
fn value_draft(value: &str, kind: &str, full_text: &str, category: Category, pack: &WordingPack) -> Option<Draft> {
  let value = value.trim();
  if value.is_empty() {
    return None;
  }
  let located = split_sentences(full_text).into_iter().find_map(|s| find_whole(s, value).map(|at| (s, at)));
  let sentence = located.map(|(s, _)| s);
  let cloze = located
    .map(|(s, at)| clip_sentence(&format!("{}{}{}", &s[..at], BLANK, &s[at + value.len()..]), CLOZE_CHARS))
    .filter(|c| c.contains(BLANK));

  let (prompt, explanation) = match (cloze, sentence) {
    (Some(cloze), Some(sentence)) => (
      fill_template(pack.value_stem(category), &[("kind", kind), ("statement", &cloze)]),
      fill_template(pack.explain_value, &[("source", &clip_sentence(sentence, SOURCE_CHARS))]),
    ),
    _ => (
      fill_template(pack.value_stem_no_context, &[("kind", kind)]),
      fill_template(pack.explain_value_no_context, &[("value", value)]),
    ),
  };
  Some(Draft { prompt, correct: value.to_string(), distractors: numeric_distractors(value).to_vec(), explanation })
}

/// Byte offset of the first occurrence of `needle` that stands as its own
/// token, so "200" is not found inside "2000" or "200.5".
fn find_whole(haystack: &str, needle: &str) -> Option<usize> {
  haystack.match_indices(needle).map(|(at, _)| at).find(|&at| {
    let mut before = haystack[..at].chars().rev();
    let mut after = haystack[at + needle.len()..].chars();
    let (b1, b2) = (before.next(), before.next());
    let (a1, a2) = (after.next(), after.next());
    token_edge(b1, b2) && token_edge(a1, a2)
  })
}

/// Whether `next` ends a number token; a '.' or ',' only does when no digit follows it.
fn token_edge(next: Option<char>, beyond: Option<char>) -> bool {
  match next {
    None => true,
    Some(c) if c.is_alphanumeric() => false,
    Some('.' | ',') => !beyond.is_some_and(char::is_numeric),
    Some(_) => true,
  }
}

fn relationship_draft(a: &str, b: &str, kind: RelationKind, category: Category, pack: &WordingPack) -> Option<Draft> {
  let (a, b) = (a.trim(), b.trim());
  if a.is_empty() || b.is_empty() {
    return None;
  }
  let phrase = |k: RelationKind, x: &str, y: &str| fill_template(pack.relation_phrase(k), &[("a", x), ("b", y)]);
  let correct = phrase(kind, a, b);
  let others: Vec<RelationKind> = RelationKind::ALL.into_iter().filter(|k| *k != kind).collect();

  let mut distractors = vec![fill_template(pack.relation_unrelated, &[("a", a), ("b", b)]), phrase(others[0], a, b)];
  // Similarity and difference read the same in both directions.
  match kind {
    RelationKind::CauseEffect | RelationKind::Dependency => distractors.push(phrase(kind, b, a)),
    RelationKind::Similarity | RelationKind::Difference => distractors.push(phrase(others[1], a, b)),
  }

  let subject = format!("{a}{}{b}", pack.pair_joiner);
  Some(Draft {
    prompt: fill_template(pack.statement_stem(category), &[("subject", &subject)]),
    explanation: fill_template(pack.explain_relation, &[("relation", &correct)]),
    correct,
    distractors,
  })
}

/// Three distinct wrong values. Numeric values use `v+1, v-1, v*2, v+2, v+10`
/// (first three distinct), keeping the decimal precision and digit script of
/// the source. Compound dates perturb their last component. Anything else gets
/// suffix variants.
pub fn numeric_distractors(value: &str) -> [String; 3] {
  let split_at = value.rfind(['/', '-']).map(|i| i + 1).unwrap_or(0);
  let (head, tail) = value.split_at(split_at);
  let Some(v) = parse_number(tail) else {
    return [format!("{value}0"), format!("{value}00"), format!("{value}000")];
  };

  let precision = tail.split_once('.').map_or(0, |(_, frac)| frac.chars().count());
  let bengali = tail.chars().any(|c| ('\u{09E6}'..='\u{09EF}').contains(&c));
  let render = |x: f64| {
    let ascii = format!("{:.*}", precision, x);
    let ascii = if bengali { to_bengali_digits(&ascii) } else { ascii };
    format!("{head}{ascii}")
  };

  let mut picked: Vec<String> = Vec::with_capacity(3);
  for candidate in [v + 1.0, v - 1.0, v * 2.0, v + 2.0, v + 10.0] {
    let rendered = render(candidate);
    if rendered != value && !picked.contains(&rendered) {
      picked.push(rendered);
    }
    if picked.len() == 3 {
      break;
    }
  }
  match <[String; 3]>::try_from(picked) {
    Ok(arr) => arr,
    // Five candidates over a finite value always leave three distinct ones;
    // fall back to suffixes rather than trusting that.
    Err(_) => [format!("{value}0"), format!("{value}00"), format!("{value}000")],
  }
}

fn to_bengali_digits(s: &str) -> String {
  s.chars()
    .map(|c| match c.to_digit(10) {
      Some(d) if c.is_ascii_digit() => char::from_u32(0x09E6 + d).unwrap_or(c),
      _ => c,
    })
    .collect()
}

fn tokens(sentence: &str) -> impl Iterator<Item = &str> {
  sentence.split(|c: char| !(c.is_alphanumeric() || is_combining_mark(c))).filter(|w| !w.is_empty())
}

fn is_numeric_token(w: &str) -> bool {
  w.chars().all(|c| c.is_numeric())
}

fn content_words(sentence: &str) -> Vec<&str> {
  tokens(sentence).filter(|w| w.chars().count() > 3 && !is_stop_word(w) && !is_numeric_token(w)).collect()
}

/// Grammatical subject approximation: the first run of non-stop words, up to
/// four tokens ("The Bangladesh Civil Service was ..." gives the middle three).
fn leading_phrase(sentence: &str) -> Option<String> {
  let phrase: Vec<&str> = tokens(sentence)
    .skip_while(|w| is_stop_word(w))
    .take_while(|w| !is_stop_word(w) && !is_numeric_token(w))
    .take(4)
    .collect();
  let phrase = phrase.join(" ");
  (phrase.chars().count() >= 3).then_some(phrase)
}

/// Bengali vowel signs and the virama are marks, not alphanumerics.
fn is_combining_mark(c: char) -> bool {
  matches!(c, '\u{0981}'..='\u{0983}' | '\u{09BC}' | '\u{09BE}'..='\u{09CD}' | '\u{09D7}' | '\u{09E2}'..='\u{09E3}')
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::language::ScriptProfile;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  const TEXT: &str = "The Bangladesh Civil Service was established in 1984 by decree. \
    The commission recruits 2500 officers every year. \
    A cadre refers to a branch of the civil service with its own duties.";

  fn en() -> &'static WordingPack {
    WordingPack::for_profile(ScriptProfile::Latin)
  }

  fn rng() -> StdRng {
    StdRng::seed_from_u64(7)
  }

  fn synth(feature: ExtractedFeature, category: Category) -> Option<Question> {
    QuestionSynthesizer::default().synthesize(&feature, TEXT, category, Difficulty::Medium, en(), &mut rng())
  }

  #[test]
  fn date_question_blanks_the_year_and_answers_with_it() {
    let q = synth(ExtractedFeature::Date { value: "1984".into() }, Category::Factual).unwrap();
    assert_eq!(q.correct_label(), OptionLabel::A);
    assert_eq!(q.correct_option().text, "1984");
    assert!(q.prompt().contains("established in ____ by decree"));
    assert!(q.prompt().contains("year"));
    let mut wrong: Vec<&str> = q.options()[1..].iter().map(|o| o.text.as_str()).collect();
    wrong.sort();
    assert_eq!(wrong, vec!["1983", "1985", "3968"]);
  }

  #[test]
  fn value_is_blanked_as_a_whole_number() {
    let s = QuestionSynthesizer::default();
    let text = "In 2000 the commission had 200 members in total.";
    let q = s
      .synthesize(&ExtractedFeature::Number { value: "200".into() }, text, Category::Factual, Difficulty::Easy, en(), &mut rng())
      .unwrap();
    assert!(q.prompt().contains("In 2000 the commission had ____ members"), "{}", q.prompt());
    assert_eq!(q.correct_option().text, "200");

    let text = "The budget grew to 2000 crore and then to 200.5 crore.";
    let q = s
      .synthesize(&ExtractedFeature::Number { value: "200".into() }, text, Category::Factual, Difficulty::Easy, en(), &mut rng())
      .unwrap();
    assert_eq!(q.prompt(), "Which of the following numbers is mentioned in the text?");
  }

  #[test]
  fn whole_token_search() {
    assert_eq!(find_whole("in 1912 with 12 members", "12"), Some(13));
    assert_eq!(find_whole("on 12/05/2021, then", "12/05/2021"), Some(3));
    assert_eq!(find_whole("grew 3.5%", "3.5"), Some(5));
    assert_eq!(find_whole("grew 13.5 and 3.55", "3.5"), None);
    assert_eq!(find_whole("১৯৭২ সালে ৭২ জন", "৭২"), Some("১৯৭২ সালে ".len()));
  }

  #[test]
  fn number_without_context_uses_plain_stem() {
    let q = synth(ExtractedFeature::Number { value: "777".into() }, Category::Analytical).unwrap();
    assert_eq!(q.prompt(), "Which of the following numbers is mentioned in the text?");
    assert_eq!(q.explanation(), "777 is explicitly mentioned in the text.");
  }

  #[test]
  fn numeric_distractors_keep_precision_and_script() {
    assert_eq!(numeric_distractors("3.5"), ["4.5".to_string(), "2.5".into(), "7.0".into()]);
    assert_eq!(numeric_distractors("১৯৭২"), ["১৯৭৩".to_string(), "১৯৭১".into(), "৩৯৪৪".into()]);
    assert_eq!(numeric_distractors("0"), ["1".to_string(), "-1".into(), "2".into()]);
    assert_eq!(numeric_distractors("12/05/2021")[0], "12/05/2022");
    assert_eq!(numeric_distractors("MCMLXXII"), ["MCMLXXII0".to_string(), "MCMLXXII00".into(), "MCMLXXII000".into()]);
  }

  #[test]
  fn stems_follow_the_requested_category() {
    let fact = ExtractedFeature::Fact { sentence: "The Bangladesh Civil Service was established in 1984 by decree".into() };
    let factual = synth(fact.clone(), Category::Factual).unwrap();
    let critical = synth(fact, Category::CriticalThinking).unwrap();
    assert_ne!(factual.prompt(), critical.prompt());
    assert_eq!(critical.category(), Category::CriticalThinking);
    assert!(factual.prompt().contains("Bangladesh"));
    assert!(factual.correct_option().text.starts_with("The Bangladesh Civil Service"));
  }

  #[test]
  fn domain_rule_overrides_concept_template() {
    let q = synth(ExtractedFeature::Concept { term: "cadre".into(), frequency: 3 }, Category::Conceptual).unwrap();
    assert!(q.prompt().contains("significance of the different cadre"));
    let q = synth(ExtractedFeature::Concept { term: "commission".into(), frequency: 1 }, Category::Conceptual).unwrap();
    assert_eq!(q.correct_option().text, "commission plays an important role as discussed in the text");
    assert!(q.explanation().contains("recruits 2500 officers"));
  }

  #[test]
  fn definition_subject_is_the_leading_term() {
    let sentence = "A cadre refers to a branch of the civil service with its own duties";
    let q = synth(ExtractedFeature::Definition { sentence: sentence.into() }, Category::Factual).unwrap();
    assert_eq!(q.prompt(), "According to the text, which statement about cadre is correct?");
  }

  #[test]
  fn relationship_distractors_are_distinct() {
    let f = ExtractedFeature::Relationship {
      term_a: "preparation".into(),
      term_b: "results".into(),
      kind: RelationKind::CauseEffect,
    };
    let q = synth(f, Category::Analytical).unwrap();
    assert_eq!(q.correct_option().text, "preparation leads to results");
    assert!(q.options().iter().any(|o| o.text == "results leads to preparation"));
  }

  #[test]
  fn unusable_features_yield_none() {
    assert!(synth(ExtractedFeature::Fact { sentence: "  ".into() }, Category::Factual).is_none());
    assert!(synth(ExtractedFeature::Concept { term: "".into(), frequency: 0 }, Category::Factual).is_none());
    assert!(synth(ExtractedFeature::Date { value: "".into() }, Category::Factual).is_none());
  }

  #[test]
  fn generic_question_needs_a_long_sentence() {
    let s = QuestionSynthesizer::default();
    let q = s.generic_question(TEXT, Category::Factual, Difficulty::Easy, en(), &mut rng()).unwrap();
    assert_eq!(q.prompt(), en().generic_prompt);
    assert!(s.generic_question("Too short. Tiny.", Category::Factual, Difficulty::Easy, en(), &mut rng()).is_none());
  }

  #[test]
  fn same_seed_same_question() {
    let f = ExtractedFeature::Number { value: "2500".into() };
    assert_eq!(synth(f.clone(), Category::Application), synth(f, Category::Application));
  }

  #[test]
  fn bangla_pack_is_used_for_bangla_text() {
    let text = "বাংলাদেশ সিভিল সার্ভিস ১৯৭২ সালে প্রতিষ্ঠিত হয়।";
    let pack = WordingPack::for_profile(ScriptProfile::Bangla);
    let q = QuestionSynthesizer::default()
      .synthesize(&ExtractedFeature::Date { value: "১৯৭২".into() }, text, Category::Factual, Difficulty::Easy, pack, &mut rng())
      .unwrap();
    assert!(q.prompt().contains("সাল"));
    assert!(q.prompt().contains("____"));
    assert_eq!(q.correct_option().text, "১৯৭২");
  }
}
