//! Recover a JSON object from raw model text

use crate::error::PipelineError;
use serde_json::{Map, Value};

/// Parse the first JSON object found in `text`
///
/// The whole text is tried first. If it is not a JSON object, the first
/// balanced `{...}` block is cut out and parsed instead, which tolerates
/// prose or markdown fences around the object.
///
/// # Examples
///
/// ```
/// use explainer_pipeline::extract_json_object;
///
/// let obj = extract_json_object("Sure! {\"answer\": \"x\"} done").unwrap();
/// assert_eq!(obj["answer"], "x");
/// ```
pub fn extract_json_object(text: &str) -> Result<Map<String, Value>, PipelineError> {
    if let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(text) {
        return Ok(obj);
    }

    let candidate = balanced_object(text).ok_or_else(|| {
        PipelineError::MalformedOutput("no balanced JSON object found".to_string())
    })?;

    match serde_json::from_str::<Value>(candidate)? {
        Value::Object(obj) => Ok(obj),
        _ => Err(PipelineError::MalformedOutput(
            "extracted block is not an object".to_string(),
        )),
    }
}

/// Slice from the first `{` to its matching `}`, ignoring braces inside strings
fn balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let end = start + offset + ch.len_utf8();
                    return Some(&text[start..end]);
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

    #[test]
    fn test_direct_object() {
        let obj = extract_json_object("  {\"answer\": \"x\", \"n\": 1}\n").unwrap();
        assert_eq!(obj["n"], 1);
    }

    #[test]
    fn test_object_wrapped_in_prose() {
        let obj = extract_json_object("Sure! {\"answer\": \"x\"} done").unwrap();
        assert_eq!(obj.len(), 1);
        assert_eq!(obj["answer"], "x");
    }

    #[test]
    fn test_markdown_fence() {
        let text = "```json\n{\"answer\": \"fenced\"}\n```";
        assert_eq!(extract_json_object(text).unwrap()["answer"], "fenced");
    }

    #[test]
    fn test_braces_inside_strings() {
        let text = r#"Result: {"answer": "use {braces} and \"quotes\" }", "k": {"a": 1}} trailing }"#;
        let obj = extract_json_object(text).unwrap();
        assert_eq!(obj["answer"], "use {braces} and \"quotes\" }");
        assert_eq!(obj["k"]["a"], 1);
    }

    #[test]
    fn test_no_brace_fails() {
        assert!(matches!(
            extract_json_object("no json here"),
            Err(PipelineError::MalformedOutput(_))
        ));
    }

    #[test]
    fn test_top_level_array_is_rejected() {
        assert!(extract_json_object("[1, 2, 3]").is_err());
    }

    #[test]
    fn test_unbalanced_fails() {
        assert!(matches!(
            extract_json_object("{\"answer\": \"x\""),
            Err(PipelineError::MalformedOutput(_))
        ));
    }

    #[test]
    fn test_balanced_but_invalid_fails() {
        assert!(matches!(
            extract_json_object("text {answer: x} text"),
            Err(PipelineError::MalformedOutput(_))
        ));
    }

    #[test]
    fn test_first_object_wins() {
        let obj = extract_json_object("a {\"n\": 1} b {\"n\": 2}").unwrap();
        assert_eq!(obj["n"], 1);
    }
}
