//! Small utility helpers used across modules.

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

/// Truncate a string to at most `max` Unicode scalar values.
/// Study material is Chinese text, so the cut must never land inside a
/// multi-byte character. Returns a borrowed slice when nothing is cut.
pub fn truncate_chars(s: &str, max: usize) -> &str {
  match s.char_indices().nth(max) {
    Some((idx, _)) => &s[..idx],
    None => s,
  }
}

/// Log-safe excerpt for large payloads (model replies, error bodies).
/// Avoids spamming logs with huge envelopes while keeping enough to debug.
pub fn excerpt_for_log(s: &str, max_chars: usize) -> String {
  if s.chars().count() <= max_chars {
    s.to_string()
  } else {
    format!("{}… ({} bytes total)", truncate_chars(s, max_chars), s.len())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fill_template_replaces_all_pairs() {
    let out = fill_template("出{count}道题：{material}", &[("count", "3"), ("material", "存货")]);
    assert_eq!(out, "出3道题：存货");
  }

  #[test]
  fn truncate_chars_respects_char_boundaries() {
    let s = "折旧方法包括直线法";
    assert_eq!(truncate_chars(s, 4), "折旧方法");
    assert_eq!(truncate_chars(s, 100), s);
  }

  #[test]
  fn excerpt_keeps_short_strings_whole() {
    assert_eq!(excerpt_for_log("short", 10), "short");
    let long = "长".repeat(50);
    assert!(excerpt_for_log(&long, 10).starts_with("长长长长长长长长长长…"));
  }
}
