//! Text normalization: turns raw extracted text into one clean, single-line body.
//!
//! Script-agnostic: every Unicode word character survives (Bengali letters, vowel
//! signs and the virama included), only symbols outside a small punctuation
//! allow-list are dropped. The result is a fixpoint, so normalizing twice is a no-op.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::util::is_bengali;

/// Sentence terminators recognized across the crate (Latin + Bengali dari/double dari).
pub const TERMINATORS: [char; 5] = ['.', '!', '?', '।', '॥'];

static DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s.,;:!?()\-।॥]").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static LIST_MARKERS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:(?:\d{1,3}[.)]|[-*])\s+)+").unwrap());
static SPACE_BEFORE_PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+([.,;:!?।॥])").unwrap());
static REPEATED_TERMINATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"([.!?।॥])[.!?।॥]+").unwrap());
static REPEATED_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"([,;])[,;]+").unwrap());

/// Normalize raw text. Never fails; empty or all-noise input yields "".
pub fn normalize(raw: &str) -> String {
  let mut current = single_pass(raw);
  // Each extra pass only removes characters, so this settles quickly.
  for _ in 0..8 {
    let next = single_pass(&current);
    if next == current {
      break;
    }
    current = next;
  }
  current
}

fn single_pass(raw: &str) -> String {
  let filtered = DISALLOWED.replace_all(raw, " ");

  let lines: Vec<String> = filtered
    .lines()
    .map(|line| {
      let collapsed = WHITESPACE.replace_all(line, " ");
      LIST_MARKERS.replace(collapsed.trim(), "").trim().to_string()
    })
    .filter(|line| !line.is_empty())
    .collect();
  let joined = lines.join(" ");

  let tightened = SPACE_BEFORE_PUNCT.replace_all(&joined, "$1");
  let collapsed = REPEATED_TERMINATORS.replace_all(&tightened, "$1");
  let collapsed = REPEATED_SEPARATORS.replace_all(&collapsed, "$1");

  let mut out = collapsed.trim().to_string();
  if let Some(last) = out.chars().last() {
    if !TERMINATORS.contains(&last) {
      out.push(if is_bengali(last) { '।' } else { '.' });
    }
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn strips_list_markers_and_collapses_punctuation() {
    let raw = "1. The BCS was established in 1972!!!\n  - It has   several cadres...\n\n* Third point";
    assert_eq!(
      normalize(raw),
      "The BCS was established in 1972! It has several cadres. Third point."
    );
  }

  #[test]
  fn keeps_bengali_script_and_uses_dari() {
    let raw = "বাংলাদেশ সিভিল সার্ভিস ১৯৭২ সালে প্রতিষ্ঠিত হয়";
    let out = normalize(raw);
    assert!(out.starts_with("বাংলাদেশ সিভিল সার্ভিস"));
    assert!(out.ends_with('।'));
    assert!(out.contains("প্রতিষ্ঠিত"));
  }

  #[test]
  fn drops_symbols_outside_allow_list() {
    assert_eq!(normalize("Price: $100 #tag (approx) @home"), "Price: 100 tag (approx) home.");
  }

  #[test]
  fn decimals_and_years_survive() {
    assert_eq!(normalize("Growth was 3.5 percent in 1984"), "Growth was 3.5 percent in 1984.");
  }

  #[test]
  fn empty_and_noise_only_input() {
    assert_eq!(normalize(""), "");
    assert_eq!(normalize("   \n\t "), "");
    assert_eq!(normalize("### $$$"), "");
  }

  #[test]
  fn normalization_is_idempotent() {
    let samples = [
      "1 . foo",
      "a\n. b",
      "- - 1. x",
      "#1. hidden marker",
      "3.5 is a number ... !!",
      "(a) test ,, ; more",
      "আমার নাম\n২. দ্বিতীয় লাইন",
      "Line one\r\nLine two?!?",
      "?",
      "",
    ];
    for s in samples {
      let once = normalize(s);
      assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
    }
  }
}
