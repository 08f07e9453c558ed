//! Pulling structured payloads out of language-model responses.
//!
//! Models asked for JSON still wrap it in markdown fences or surround it
//! with prose now and then. Extraction tries a fenced block first, then the
//! first balanced `{ ... }` object.

use serde::de::DeserializeOwned;
use storyreel_error::{ContentError, ContentErrorKind, StoryreelResult};

/// Extract the JSON object from `response`.
///
/// `what` names the payload ("script", "scene plan") for error messages.
///
/// # Errors
///
/// Returns a content error when no JSON object is present.
///
/// # Examples
///
/// ```
/// use storyreel_pipeline::extract_json;
///
/// let response = "Here you go:\n```json\n{\"title\": \"Tides\"}\n```\n";
/// assert_eq!(extract_json(response, "script").unwrap(), "{\"title\": \"Tides\"}");
/// ```
pub fn extract_json(response: &str, what: &str) -> StoryreelResult<String> {
    if let Some(json) = extract_from_code_block(response) {
        return Ok(json);
    }

    if let Some(json) = extract_balanced(response, '{', '}') {
        return Ok(json);
    }

    tracing::error!(what, response_length = response.len(), "No JSON object in response");
    Err(ContentError::new(ContentErrorKind::Parse {
        what: what.to_string(),
        reason: format!("no JSON object found in response of length {}", response.len()),
    })
    .into())
}

/// Deserialize `json` into `T`.
///
/// # Errors
///
/// Returns a content error carrying the parser's message.
pub fn parse_json<T>(json: &str, what: &str) -> StoryreelResult<T>
where
    T: DeserializeOwned,
{
    serde_json::from_str(json).map_err(|e| {
        let preview: String = json.chars().take(100).collect();
        tracing::error!(what, error = %e, json_preview = %preview, "JSON parsing failed");
        ContentError::new(ContentErrorKind::Parse {
            what: what.to_string(),
            reason: e.to_string(),
        })
        .into()
    })
}

/// Contents of the first fenced block, with or without a language tag.
fn extract_from_code_block(response: &str) -> Option<String> {
    let start = response.find("```")?;
    let after_fence = start + 3;
    let body_start = response[after_fence..]
        .find('\n')
        .map(|n| after_fence + n + 1)
        .unwrap_or(after_fence);

    let body = match response[body_start..].find("```") {
        Some(end) => &response[body_start..body_start + end],
        // Unterminated fence, likely a truncated response
        None => &response[body_start..],
    };

    let body = body.trim();
    body.starts_with('{').then(|| body.to_string())
}

/// First `open ... close` span with nesting, ignoring delimiters in strings.
fn extract_balanced(response: &str, open: char, close: char) -> Option<String> {
    let start = response.find(open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in response[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            c if c == open && !in_string => depth += 1,
            c if c == close && !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(response[start..start + i + ch.len_utf8()].to_string());
                }
            }
            _ => {}
        }
    }

    None
}
