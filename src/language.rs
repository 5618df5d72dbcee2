//! Script detection: Latin-script text vs the Bengali target script.

use serde::Serialize;

use crate::util::is_bengali;

const RATIO_THRESHOLD: f32 = 0.15;
const ABSOLUTE_THRESHOLD: usize = 5;

/// Which wording pack downstream components use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptProfile {
  Latin,
  Bangla,
}

impl ScriptProfile {
  pub fn language_name(self) -> &'static str {
    match self {
      ScriptProfile::Latin => "English",
      ScriptProfile::Bangla => "Bangla",
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScriptDetection {
  pub is_target_script: bool,
  pub ratio: f32,
  pub target_count: usize,
}

impl ScriptDetection {
  pub fn profile(&self) -> ScriptProfile {
    if self.is_target_script { ScriptProfile::Bangla } else { ScriptProfile::Latin }
  }
}

/// Count Bengali-block chars against all alphabetic chars.
///
/// Flags the text when the ratio exceeds 15% OR more than five Bengali chars are
/// present at all. The absolute clause catches short snippets and mixed text.
pub fn detect_script(text: &str) -> ScriptDetection {
  let mut target = 0usize;
  let mut alpha = 0usize;
  for ch in text.chars() {
    let in_block = is_bengali(ch);
    if in_block {
      target += 1;
    }
    if in_block || ch.is_alphabetic() {
      alpha += 1;
    }
  }
  let ratio = if alpha == 0 { 0.0 } else { target as f32 / alpha as f32 };
  ScriptDetection {
    is_target_script: ratio > RATIO_THRESHOLD || target > ABSOLUTE_THRESHOLD,
    ratio,
    target_count: target,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn short_bengali_snippet_is_target() {
    let d = detect_script("আমার নাম");
    assert!(d.is_target_script);
    assert!(d.target_count > 5);
    assert_eq!(d.profile(), ScriptProfile::Bangla);
  }

  #[test]
  fn english_is_not_target() {
    let d = detect_script("Hello world");
    assert!(!d.is_target_script);
    assert_eq!(d.ratio, 0.0);
    assert_eq!(d.profile(), ScriptProfile::Latin);
  }

  #[test]
  fn mixed_text_is_target() {
    assert!(detect_script("আমার name is X").is_target_script);
  }

  #[test]
  fn a_few_bengali_chars_in_long_english_text_stay_latin() {
    let text = format!("{} নাম", "Plenty of English words here. ".repeat(10));
    let d = detect_script(&text);
    assert_eq!(d.target_count, 3);
    assert!(!d.is_target_script);
  }

  #[test]
  fn no_letters_gives_zero_ratio() {
    let d = detect_script("1234 ...");
    assert_eq!(d.ratio, 0.0);
    assert!(!d.is_target_script);
  }
}
