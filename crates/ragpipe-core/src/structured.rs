//! Tolerant recovery of JSON objects from completion output.
//!
//! Models asked for "valid JSON" routinely wrap it in prose or code
//! fences. Parsing is isolated here: try strict, then the first
//! balanced brace-delimited object, then give up. Callers decide what
//! degraded result to substitute on failure.

use crate::{Error, Result};
use serde::de::DeserializeOwned;

/// The first balanced `{...}` span in `s`, if any.
///
/// String-literal aware: braces inside JSON strings (and escaped
/// quotes) do not affect nesting depth.
pub fn first_json_object(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let mut depth: usize = 0;
    let mut in_str = false;
    let mut escaped = false;
    for (i, ch) in s[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_str => escaped = true,
            '"' => in_str = !in_str,
            '{' if !in_str => depth += 1,
            '}' if !in_str => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse `s` as `T`, falling back to the first embedded JSON object.
pub fn from_str_lenient<T: DeserializeOwned>(s: &str) -> Result<T> {
    match serde_json::from_str(s) {
        Ok(v) => Ok(v),
        Err(strict_err) => {
            if let Some(obj) = first_json_object(s) {
                if let Ok(v) = serde_json::from_str(obj) {
                    return Ok(v);
                }
            }
            Err(Error::Llm(format!(
                "completion response was not the expected JSON: {strict_err}"
            )))
        }
    }
}
