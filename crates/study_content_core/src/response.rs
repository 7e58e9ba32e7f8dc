//! crates/study_content_core/src/response.rs
//!
//! Extracts and parses the JSON object embedded in free-form completion text.
//!
//! Models frequently wrap their JSON in prose or markdown fences. The scanner finds the
//! first `{` and walks forward tracking brace depth, ignoring braces inside string
//! literals, until the matching `}` closes the object. Anything after it is ignored.

use crate::ports::PortError;
use serde::de::DeserializeOwned;

#[derive(Debug, thiserror::Error)]
pub enum ResponseError {
    #[error("completion contained no JSON object")]
    NoJsonObject,
    #[error("completion JSON could not be parsed: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl From<ResponseError> for PortError {
    fn from(err: ResponseError) -> Self {
        PortError::MalformedResponse(err.to_string())
    }
}

/// Returns the first balanced `{...}` span in `raw`, or `None` if there is none.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in raw[start..].char_indices() {
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
                    return Some(&raw[start..end]);
                }
            }
            _ => {}
        }
    }

    // Unterminated object.
    None
}

/// Parses the first JSON object in `raw` into `T`.
///
/// Only that one span is considered; no repair of truncated or invalid JSON is attempted.
pub fn parse_json_object<T: DeserializeOwned>(raw: &str) -> Result<T, ResponseError> {
    let span = extract_json_object(raw).ok_or(ResponseError::NoJsonObject)?;
    Ok(serde_json::from_str(span)?)
}
