//! Wording packs for rule-based questions, one per script profile.
//!
//! Placeholders: `{subject}`, `{statement}`, `{kind}`, `{concept}`, `{count}`,
//! `{source}`, `{value}`, `{a}`, `{b}`, `{relation}`.

use crate::domain::{Category, RelationKind};
use crate::language::ScriptProfile;

pub struct WordingPack {
  /// Stems for statement-style answers (fact, definition, concept, relationship).
  pub statement_stems: [&'static str; 5],
  /// Cloze stems for date/number answers; `{statement}` holds the blanked sentence.
  pub value_stems: [&'static str; 5],
  pub value_stem_no_context: &'static str,
  pub kind_year: &'static str,
  pub kind_date: &'static str,
  pub kind_number: &'static str,
  pub fact_fallback_subject: &'static str,
  pub fact_distractors: [&'static str; 3],
  pub definition_distractors: [&'static str; 3],
  pub definition_fallback_subject: &'static str,
  pub concept_options: [&'static str; 4],
  pub relation_phrases: [&'static str; 4],
  pub relation_unrelated: &'static str,
  /// Joins the two related terms into one `{subject}`.
  pub pair_joiner: &'static str,
  pub generic_prompt: &'static str,
  pub generic_distractors: [&'static str; 3],
  /// Pads short option lists from a model response (relaxed validation).
  pub filler_distractors: [&'static str; 3],
  /// Used when a model response omits the explanation.
  pub default_explanation: &'static str,
  pub static_prompt: &'static str,
  pub static_options: [&'static str; 4],
  pub static_explanation: &'static str,
  pub explain_fact: &'static str,
  pub explain_definition: &'static str,
  pub explain_concept: &'static str,
  pub explain_value: &'static str,
  pub explain_value_no_context: &'static str,
  pub explain_relation: &'static str,
  pub explain_generic: &'static str,
}

impl WordingPack {
  pub fn for_profile(profile: ScriptProfile) -> &'static WordingPack {
    match profile {
      ScriptProfile::Latin => &ENGLISH,
      ScriptProfile::Bangla => &BANGLA,
    }
  }

  pub fn statement_stem(&self, category: Category) -> &'static str {
    self.statement_stems[category.slot()]
  }

  pub fn value_stem(&self, category: Category) -> &'static str {
    self.value_stems[category.slot()]
  }

  pub fn relation_phrase(&self, kind: RelationKind) -> &'static str {
    match kind {
      RelationKind::CauseEffect => self.relation_phrases[0],
      RelationKind::Similarity => self.relation_phrases[1],
      RelationKind::Difference => self.relation_phrases[2],
      RelationKind::Dependency => self.relation_phrases[3],
    }
  }
}

pub const BLANK: &str = "____";

static ENGLISH: WordingPack = WordingPack {
  statement_stems: [
    "According to the text, which statement about {subject} is correct?",
    "Which statement best describes {subject} as presented in the text?",
    "Based on the text, what can be inferred about {subject}?",
    "Which of the following best applies what the text says about {subject}?",
    "Which conclusion about {subject} is best supported by the text?",
  ],
  value_stems: [
    "According to the text, which {kind} completes the statement: \"{statement}\"?",
    "Which {kind} does the text associate with the following: \"{statement}\"?",
    "Reading the text closely, which {kind} correctly fills the blank: \"{statement}\"?",
    "If you had to cite the text, which {kind} would complete: \"{statement}\"?",
    "Which {kind} is consistent with the evidence in the text: \"{statement}\"?",
  ],
  value_stem_no_context: "Which of the following {kind}s is mentioned in the text?",
  kind_year: "year",
  kind_date: "date",
  kind_number: "number",
  fact_fallback_subject: "the information in the text",
  fact_distractors: [
    "The opposite of what is stated in the text",
    "Information not mentioned in the text",
    "A different interpretation of the text",
  ],
  definition_distractors: [
    "A similar but incorrect definition",
    "The opposite of the defined concept",
    "An unrelated definition from another source",
  ],
  definition_fallback_subject: "the concept defined in the text",
  concept_options: [
    "{concept} plays an important role as discussed in the text",
    "{concept} is not discussed in the text",
    "{concept} is only mentioned in passing",
    "{concept} has no significance in this context",
  ],
  relation_phrases: ["{a} leads to {b}", "{a} is similar to {b}", "{a} differs from {b}", "{a} depends on {b}"],
  relation_unrelated: "{a} has no connection with {b}",
  pair_joiner: " and ",
  generic_prompt: "What is the main point conveyed in the provided text?",
  generic_distractors: [
    "Information not mentioned in the text",
    "A different interpretation of the text",
    "An unrelated topic",
  ],
  filler_distractors: ["Not stated in the text", "Contradicted by the text", "Unrelated to the text"],
  default_explanation: "The correct answer is supported by the source text.",
  static_prompt: "What is the main topic discussed in the provided text?",
  static_options: [
    "The primary subject matter of the text",
    "A secondary topic mentioned briefly",
    "An unrelated topic not discussed",
    "A topic that contradicts the main content",
  ],
  static_explanation: "The main topic is the primary subject matter that the text focuses on and discusses in detail.",
  explain_fact: "This is stated directly in the text: \"{source}\"",
  explain_definition: "This definition is given in the text: \"{source}\"",
  explain_concept: "The text discusses {concept} ({count} mentions), for example: \"{source}\"",
  explain_value: "The text states: \"{source}\"",
  explain_value_no_context: "{value} is explicitly mentioned in the text.",
  explain_relation: "According to the text, {relation}.",
  explain_generic: "This information is stated directly in the text: \"{source}\"",
};

static BANGLA: WordingPack = WordingPack {
  statement_stems: [
    "পাঠ্য অনুযায়ী {subject} সম্পর্কে কোন বক্তব্যটি সঠিক?",
    "পাঠ্যে উপস্থাপিত {subject}-কে কোন বক্তব্যটি সবচেয়ে ভালোভাবে বর্ণনা করে?",
    "পাঠ্যের ভিত্তিতে {subject} সম্পর্কে কী অনুমান করা যায়?",
    "{subject} সম্পর্কে পাঠ্যের বক্তব্য কোনটিতে সবচেয়ে ভালোভাবে প্রয়োগ হয়?",
    "{subject} সম্পর্কে কোন সিদ্ধান্তটি পাঠ্য দ্বারা সবচেয়ে বেশি সমর্থিত?",
  ],
  value_stems: [
    "পাঠ্য অনুযায়ী কোন {kind} বাক্যটি সম্পূর্ণ করে: \"{statement}\"?",
    "পাঠ্যে নিচের বক্তব্যের সাথে কোন {kind} যুক্ত: \"{statement}\"?",
    "মনোযোগ দিয়ে পড়লে কোন {kind} শূন্যস্থানটি সঠিকভাবে পূরণ করে: \"{statement}\"?",
    "পাঠ্য থেকে উদ্ধৃতি দিতে হলে কোন {kind} দিয়ে বাক্যটি সম্পূর্ণ করবেন: \"{statement}\"?",
    "পাঠ্যের তথ্যের সাথে কোন {kind} সামঞ্জস্যপূর্ণ: \"{statement}\"?",
  ],
  value_stem_no_context: "নিচের কোন {kind} পাঠ্যে উল্লেখ করা হয়েছে?",
  kind_year: "সাল",
  kind_date: "তারিখ",
  kind_number: "সংখ্যা",
  fact_fallback_subject: "পাঠ্যের তথ্য",
  fact_distractors: [
    "পাঠ্যে যা বলা হয়েছে তার বিপরীত",
    "পাঠ্যে উল্লেখ নেই এমন তথ্য",
    "পাঠ্যের একটি ভিন্ন ব্যাখ্যা",
  ],
  definition_distractors: [
    "একটি অনুরূপ কিন্তু ভুল সংজ্ঞা",
    "সংজ্ঞায়িত ধারণার বিপরীত",
    "অন্য উৎসের একটি সম্পর্কহীন সংজ্ঞা",
  ],
  definition_fallback_subject: "পাঠ্যে সংজ্ঞায়িত ধারণা",
  concept_options: [
    "পাঠ্যে {concept} একটি গুরুত্বপূর্ণ ভূমিকা পালন করে",
    "পাঠ্যে {concept} নিয়ে কোনো আলোচনা নেই",
    "{concept} শুধু সংক্ষেপে উল্লেখ করা হয়েছে",
    "এই প্রসঙ্গে {concept}-এর কোনো তাৎপর্য নেই",
  ],
  relation_phrases: [
    "{a} থেকে {b} সৃষ্টি হয়",
    "{a} {b}-এর সাথে সাদৃশ্যপূর্ণ",
    "{a} {b} থেকে ভিন্ন",
    "{a} {b}-এর উপর নির্ভরশীল",
  ],
  relation_unrelated: "{a}-এর সাথে {b}-এর কোনো সম্পর্ক নেই",
  pair_joiner: " ও ",
  generic_prompt: "প্রদত্ত পাঠ্যের মূল বক্তব্য কী?",
  generic_distractors: ["পাঠ্যে উল্লেখ নেই এমন তথ্য", "পাঠ্যের একটি ভিন্ন ব্যাখ্যা", "একটি সম্পর্কহীন বিষয়"],
  filler_distractors: ["পাঠ্যে বলা হয়নি", "পাঠ্যের সাথে সাংঘর্ষিক", "পাঠ্যের সাথে সম্পর্কহীন"],
  default_explanation: "সঠিক উত্তরটি পাঠ্য দ্বারা সমর্থিত।",
  static_prompt: "প্রদত্ত পাঠ্যে মূলত কোন বিষয় আলোচনা করা হয়েছে?",
  static_options: [
    "পাঠ্যের প্রধান বিষয়বস্তু",
    "সংক্ষেপে উল্লিখিত একটি গৌণ বিষয়",
    "আলোচনা করা হয়নি এমন একটি সম্পর্কহীন বিষয়",
    "মূল বক্তব্যের বিরোধী একটি বিষয়",
  ],
  static_explanation: "পাঠ্যটি মূলত তার প্রধান বিষয়বস্তু নিয়েই বিস্তারিত আলোচনা করে।",
  explain_fact: "এই তথ্যটি পাঠ্যে সরাসরি বলা হয়েছে: \"{source}\"",
  explain_definition: "এই সংজ্ঞাটি পাঠ্যে দেওয়া হয়েছে: \"{source}\"",
  explain_concept: "পাঠ্যে {concept} {count} বার আলোচিত হয়েছে, যেমন: \"{source}\"",
  explain_value: "পাঠ্যে বলা হয়েছে: \"{source}\"",
  explain_value_no_context: "{value} পাঠ্যে স্পষ্টভাবে উল্লেখ করা হয়েছে।",
  explain_relation: "পাঠ্য অনুযায়ী {relation}।",
  explain_generic: "এই তথ্যটি পাঠ্যে সরাসরি বলা হয়েছে: \"{source}\"",
};
