//! Key byte indices from X's on-demand script.

use crate::error::EngineError;

const ONDEMAND_BASE_URL: &str = "https://abs.twimg.com/responsive-web/client-web";

/// Positions into the decoded verification key, as read from the on-demand
/// script's `(x[N], 16)` expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyIndices {
   /// Selects the animation row.
   pub row:       usize,
   /// Combined into the animation time.
   pub key_bytes: Vec<usize>,
}

impl KeyIndices {
   /// Scans script text for `x[N], 16)` expressions. The first index found is
   /// the row index, the rest are key byte indices.
   pub fn scan(script: &str) -> Result<Self, EngineError> {
      let mut found = script
         .match_indices('(')
         .filter_map(|(pos, _)| script.get(pos + 1..).and_then(index_expression));

      let row = found
         .next()
         .ok_or_else(|| EngineError::MissingKey("key byte indices".into()))?;

      Ok(Self {
         row,
         key_bytes: found.collect(),
      })
   }
}

/// Parses `e[12], 16)` (any one-character identifier, optional whitespace
/// after the comma) at the start of `rest`.
fn index_expression(rest: &str) -> Option<usize> {
   let mut chars = rest.chars();
   let ident = chars.next()?;
   if !(ident.is_ascii_alphanumeric() || ident == '_' || ident == '$') {
      return None;
   }

   let inner = chars.as_str().strip_prefix('[')?;
   let digits_end = inner.find(|chr: char| !chr.is_ascii_digit())?;
   let (digits, tail) = inner.split_at(digits_end);

   tail
      .strip_prefix("],")?
      .trim_start()
      .starts_with("16)")
      .then(|| digits.parse().ok())
      .flatten()
}

/// URL of the `ondemand.s.*.js` chunk named in page script text
/// (`"ondemand.s": "<hash>"`), if any.
pub fn ondemand_url(script: &str) -> Option<String> {
   ["\"ondemand.s\"", "'ondemand.s'"]
      .into_iter()
      .flat_map(|marker| {
         script
            .match_indices(marker)
            .map(move |(pos, _)| pos + marker.len())
      })
      .filter_map(|start| script.get(start..).and_then(quoted_value))
      .find(|hash| !hash.is_empty() && hash.chars().all(char::is_alphanumeric))
      .map(|hash| format!("{ONDEMAND_BASE_URL}/ondemand.s.{hash}a.js"))
}

/// Parses `: "value"` or `: 'value'`.
fn quoted_value(rest: &str) -> Option<&str> {
   let rest = rest.trim_start().strip_prefix(':')?.trim_start();
   let quote = rest.chars().next().filter(|chr| matches!(chr, '"' | '\''))?;
   let body = &rest[1..];
   body.find(quote).map(|end| &body[..end])
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn scan_indices() {
      let indices = KeyIndices::scan("foo(e[5], 16)bar(e[10], 16)baz(t[41],16)").unwrap();
      assert_eq!(indices.row, 5);
      assert_eq!(indices.key_bytes, vec![10, 41]);
   }

   #[test]
   fn scan_ignores_other_radixes() {
      let indices = KeyIndices::scan("parseInt(e[3], 10);parseInt(e[7], 16);").unwrap();
      assert_eq!(indices.row, 7);
      assert!(indices.key_bytes.is_empty());
   }

   #[test]
   fn scan_missing() {
      let err = KeyIndices::scan("no indices here").unwrap_err();
      assert!(matches!(err, EngineError::MissingKey(_)));
   }

   #[test]
   fn ondemand_url_double_quotes() {
      let url = ondemand_url(r#"something "ondemand.s": "abc123def" something"#);
      assert_eq!(
         url.as_deref(),
         Some("https://abs.twimg.com/responsive-web/client-web/ondemand.s.abc123defa.js")
      );
   }

   #[test]
   fn ondemand_url_single_quotes() {
      let url = ondemand_url("something 'ondemand.s':'xyz789' something");
      assert_eq!(
         url.as_deref(),
         Some("https://abs.twimg.com/responsive-web/client-web/ondemand.s.xyz789a.js")
      );
   }

   #[test]
   fn ondemand_url_skips_bad_hashes() {
      let script = r#""ondemand.s": "../evil", "ondemand.s": "c0ffee""#;
      assert_eq!(
         ondemand_url(script).as_deref(),
         Some("https://abs.twimg.com/responsive-web/client-web/ondemand.s.c0ffeea.js")
      );
   }

   #[test]
   fn ondemand_url_missing() {
      assert_eq!(ondemand_url("please login"), None);
   }
}
