//! JSON recovery for untrusted model output.
//!
//! The generation API is not contractually guaranteed to emit pure JSON: it
//! may wrap the payload in markdown fences or surround it with prose. This
//! module runs an ordered chain of parse attempts; the first stage that
//! yields valid JSON wins.
//!
//! Stages:
//! 1. Trim whitespace.
//! 2. Strip a ```json / ``` fence pair if present.
//! 3. Direct parse of the stripped text.
//! 4. Extract the first balanced top-level `[...]` or `{...}` span from the
//!    original raw text and parse that substring.
//! 5. Fail, retaining the raw text for diagnostics.

use serde_json::Value;
use thiserror::Error;

/// No stage of the recovery chain produced valid JSON.
#[derive(Debug, Error)]
#[error("no valid JSON found in model output")]
pub struct RecoverError {
    /// The unmodified model output, kept for diagnostics.
    pub raw: String,
}

/// Recovers a JSON value from raw model output, tolerating fences and
/// surrounding prose. Fails only if no stage yields valid JSON.
pub fn recover_json(raw: &str) -> Result<Value, RecoverError> {
    let stripped = strip_json_fences(raw);

    if let Ok(value) = serde_json::from_str::<Value>(stripped) {
        return Ok(value);
    }

    // Fallback: the model wrapped the JSON in prose. Pull out the first
    // balanced bracket span from the original text and parse that.
    if let Some(span) = extract_balanced_span(raw) {
        if let Ok(value) = serde_json::from_str::<Value>(span) {
            return Ok(value);
        }
    }

    Err(RecoverError {
        raw: raw.to_string(),
    })
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

/// Finds the first balanced top-level `[...]` or `{...}` span in `text`.
///
/// The scan is string-aware: brackets inside JSON string literals (including
/// escaped quotes) do not affect nesting depth. Returns `None` if no opening
/// bracket exists or the text ends before the span closes.
fn extract_balanced_span(text: &str) -> Option<&str> {
    let start = text.find(['[', '{'])?;
    let bytes = text.as_bytes();

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match b {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'[' | b'{' if !in_string => depth += 1,
            b']' | b'}' if !in_string => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_recover_clean_json_is_identity() {
        let input = r#"[{"type": "text", "question": "Q1", "answer": "A1"}]"#;
        let value = recover_json(input).unwrap();
        assert_eq!(value, serde_json::from_str::<Value>(input).unwrap());
    }

    #[test]
    fn test_recover_fenced_json_matches_unfenced() {
        let payload = r#"[{"type": "text", "question": "Q1", "answer": "A1"}]"#;
        let fenced = format!("```json\n{payload}\n```");
        assert_eq!(
            recover_json(&fenced).unwrap(),
            recover_json(payload).unwrap()
        );
    }

    #[test]
    fn test_recover_json_embedded_in_prose() {
        let input = r#"Here is the result: [{"type": "text", "question": "Q"}] Hope that helps!"#;
        let value = recover_json(input).unwrap();
        assert_eq!(value, json!([{"type": "text", "question": "Q"}]));
    }

    #[test]
    fn test_recover_object_embedded_in_prose() {
        let input = "Sure! {\"feedback\": \"Good answer\", \"rating\": 8} Let me know.";
        let value = recover_json(input).unwrap();
        assert_eq!(value["rating"], json!(8));
    }

    #[test]
    fn test_recover_fails_on_plain_prose() {
        let input = "I am unable to generate questions for this role.";
        let err = recover_json(input).unwrap_err();
        assert_eq!(err.raw, input);
    }

    #[test]
    fn test_recover_fails_on_unbalanced_brackets() {
        let input = "Here you go: [{\"question\": \"truncated";
        assert!(recover_json(input).is_err());
    }

    #[test]
    fn test_fence_strip_wins_over_bracket_extraction() {
        // A fenced payload whose prose also contains brackets: stage 3 must
        // consume the fenced text before stage 4 ever runs.
        let input = "```json\n[1, 2, 3]\n```";
        assert_eq!(recover_json(input).unwrap(), json!([1, 2, 3]));
    }

    #[test]
    fn test_brackets_inside_strings_do_not_close_span() {
        let input = r#"Note: [{"question": "What does arr[0] mean?", "answer": "First [element]"}] done"#;
        let value = recover_json(input).unwrap();
        assert_eq!(value[0]["question"], json!("What does arr[0] mean?"));
    }

    #[test]
    fn test_escaped_quotes_inside_strings() {
        let input = r#"Result: {"feedback": "Said \"yes\" [twice]", "rating": 5} end"#;
        let value = recover_json(input).unwrap();
        assert_eq!(value["rating"], json!(5));
    }
}
