use serde_json::Value;

use crate::error::ImportError;

/// Recover a JSON value from free-form model output.
///
/// Generative models are not guaranteed to answer with well-formed JSON:
/// answers routinely arrive wrapped in Markdown code fences or preceded by
/// prose. This strips fence markers, then decodes the substring between the
/// first `{` and the last `}` (or the first `[` and the last `]` for
/// list-shaped answers). When no brace is present the whole text is decoded
/// as-is.
///
/// Delimiting by first/last brace is a lossy recovery heuristic, not a
/// parser: prose containing stray braces outside the JSON block will
/// mis-extract. Decode failures return [`ImportError::ModelOutput`] carrying
/// the raw text so the caller can log or display it.
pub fn parse_model_output(text: &str) -> Result<Value, ImportError> {
    let cleaned = text.replace("```json", "").replace("```", "");
    let cleaned = cleaned.trim();

    let candidate = if cleaned.starts_with('[') {
        match cleaned.rfind(']') {
            Some(end) => &cleaned[..=end],
            None => cleaned,
        }
    } else {
        match (cleaned.find('{'), cleaned.rfind('}')) {
            (Some(start), Some(end)) if start < end => &cleaned[start..=end],
            _ => cleaned,
        }
    };

    serde_json::from_str(candidate).map_err(|e| ImportError::ModelOutput {
        message: e.to_string(),
        raw: text.to_string(),
    })
}
