//! Small utility helpers used across modules.

use sha2::{Digest, Sha256};

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
/// This is intentionally simple (no nested/conditional logic).
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// True if the char belongs to the Bengali Unicode block (U+0980–U+09FF).
pub fn is_bengali(ch: char) -> bool {
  ('\u{0980}'..='\u{09FF}').contains(&ch)
}

/// First `max` chars of `s`, cut on a char boundary.
pub fn take_chars(s: &str, max: usize) -> &str {
  match s.char_indices().nth(max) {
    Some((idx, _)) => &s[..idx],
    None => s,
  }
}

/// Shorten a quoted source sentence for use inside an option, preferring a word
/// boundary and marking the cut with `…`.
pub fn clip_sentence(s: &str, max: usize) -> String {
  let s = s.trim();
  if s.chars().count() <= max {
    return s.to_string();
  }
  let head = take_chars(s, max);
  let cut = head.rfind(' ').filter(|&i| i > head.len() / 2).unwrap_or(head.len());
  format!("{}…", head[..cut].trim_end())
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    s.to_string()
  } else {
    format!("{}… ({} bytes total)", take_chars(s, max), s.len())
  }
}

/// Deterministic short hash of the given parts (hex, 16 chars).
pub fn fingerprint(parts: &[&str]) -> String {
  let mut hasher = Sha256::new();
  for p in parts {
    hasher.update(p.as_bytes());
    hasher.update([0x1f]);
  }
  let hex = format!("{:x}", hasher.finalize());
  hex[..16].to_string()
}
