//! Built-in content that keeps generation useful without config or a model:
//! the domain specialization table and the static last-resort question.

use serde::Deserialize;

use crate::domain::{Category, Difficulty, OptionLabel, Question};
use crate::error::ValidationError;
use crate::util::fill_template;
use crate::wording::WordingPack;

/// Keyword-triggered template for concept questions. Every string may use
/// `{concept}`; option 0 is the correct one.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct DomainRule {
  pub keyword: String,
  pub prompt: String,
  pub options: [String; 4],
  pub explanation: String,
}

impl DomainRule {
  fn new(keyword: &str, prompt: &str, options: [&str; 4], explanation: &str) -> Self {
    Self {
      keyword: keyword.to_string(),
      prompt: prompt.to_string(),
      options: options.map(String::from),
      explanation: explanation.to_string(),
    }
  }

  /// Case-insensitive substring match against a concept term.
  pub fn matches(&self, concept: &str) -> bool {
    let kw = self.keyword.trim().to_lowercase();
    !kw.is_empty() && concept.to_lowercase().contains(&kw)
  }

  pub fn render(&self, concept: &str, category: Category, difficulty: Difficulty) -> Result<Question, ValidationError> {
    let fill = |s: &str| fill_template(s, &[("concept", concept)]);
    Question::new(
      fill(&self.prompt),
      self.options.iter().map(|o| fill(o)).collect(),
      OptionLabel::A,
      fill(&self.explanation),
      category,
      difficulty,
    )
  }
}

/// The BCS rules the service ships with. Config rules are appended after these.
///
/// Concept extraction normally drops words of four characters or fewer, so the
/// assembler registers every rule keyword as a kept term. Without that "bcs" and
/// "exam" would only ever fire through longer words such as "examination".
pub fn builtin_domain_rules() -> Vec<DomainRule> {
  vec![
    DomainRule::new(
      "bcs",
      "According to the text, what is the primary role of {concept} in Bangladesh?",
      [
        "{concept} serves as the backbone of the administrative system",
        "{concept} is only responsible for minor tasks",
        "{concept} has no significant role in governance",
        "{concept} is primarily focused on international affairs",
      ],
      "According to the text, {concept} is described as the backbone of the administrative system of Bangladesh.",
    ),
    DomainRule::new(
      "exam",
      "What is the structure of the {concept} process as described in the text?",
      [
        "It consists of multiple stages including preliminary, written and viva voce",
        "It is a single-stage process",
        "It only includes a written examination",
        "It focuses only on oral interviews",
      ],
      "The text states that the examination is conducted in multiple stages: preliminary, written and viva voce.",
    ),
    DomainRule::new(
      "cadre",
      "What is the significance of the different {concept} groups in the BCS system?",
      [
        "Each cadre is responsible for a different aspect of government administration",
        "All cadres perform the same functions",
        "Cadres exist only for organizational purposes",
        "Cadres have no specific responsibilities",
      ],
      "The text explains that the service is divided into several cadres, each responsible for a different aspect of government administration.",
    ),
    DomainRule::new(
      "preliminary",
      "What does the {concept} examination consist of?",
      [
        "Multiple choice questions covering various subjects",
        "Only subjective questions",
        "Only language tests",
        "Only mathematical problems",
      ],
      "The text states that the preliminary examination is made of multiple choice questions covering various subjects.",
    ),
  ]
}

/// First rule whose keyword occurs in `concept`.
pub fn find_rule<'a>(rules: &'a [DomainRule], concept: &str) -> Option<&'a DomainRule> {
  rules.iter().find(|r| r.matches(concept))
}

/// Absolute last resort used for padding when the text has no usable sentence.
pub fn static_fallback_question(pack: &WordingPack, category: Category, difficulty: Difficulty) -> Question {
  Question::from_static(pack.static_prompt, pack.static_options, pack.static_explanation, category, difficulty)
}
