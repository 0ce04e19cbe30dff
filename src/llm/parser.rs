use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::{excerpt, TriageError};

/// Locate the JSON object embedded in a model completion.
///
/// Rules, in order:
/// 1. the first fenced code block (optionally tagged, e.g. ```` ```json ````)
///    whose body is an object;
/// 2. otherwise the first balanced `{...}` span in the text.
pub fn extract_json_object(text: &str) -> Option<&str> {
    fenced_object(text).or_else(|| balanced_object(text))
}

/// Parse a completion into `T` using [`extract_json_object`].
///
/// Failures are logged with the head of the raw text and returned as
/// `MalformedResponse`; callers substitute their fallback record.
pub fn parse_structured<T: DeserializeOwned>(text: &str) -> Result<T, TriageError> {
    let result = match extract_json_object(text) {
        Some(json) => serde_json::from_str::<T>(json)
            .map_err(|e| TriageError::malformed(format!("invalid JSON: {}", e), text)),
        None => Err(TriageError::malformed("no JSON object found", text)),
    };

    if let Err(e) = &result {
        warn!("Unparseable completion ({}): {:?}", e, excerpt(text));
    }
    result
}

fn fenced_object(text: &str) -> Option<&str> {
    let mut rest = text;

    while let Some(open) = rest.find("```") {
        let after_open = &rest[open + 3..];
        // Skip an info string such as "json" up to the end of the line
        let body_start = after_open
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(after_open.len());
        let body = &after_open[body_start..];

        let close = body.find("```")?;
        let candidate = body[..close].trim();
        if candidate.starts_with('{') && candidate.ends_with('}') {
            return Some(candidate);
        }

        rest = &body[close + 3..];
    }

    None
}

/// First `{` through its matching `}`, ignoring braces inside strings
fn balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}
