use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static FENCED_ARRAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(\[.*?\])\s*```").expect("fenced array pattern is valid")
});

/// Strip whitespace and markdown code fences from a completion.
pub fn clean_response(text: &str) -> String {
    let cleaned = text.trim();

    if !cleaned.contains("```") {
        return cleaned.to_string();
    }

    if let Some(array) = FENCED_ARRAY.captures(cleaned).and_then(|c| c.get(1)) {
        return array.as_str().to_string();
    }

    cleaned.replace("```json", "").replace("```", "").trim().to_string()
}

/// Parse a completion into the JSON values it describes.
///
/// An array yields its elements, a single object is wrapped in a list,
/// and `null` or an empty object yields nothing.
pub fn parse_response(text: &str) -> Result<Vec<Value>, serde_json::Error> {
    let parsed: Value = serde_json::from_str(&clean_response(text))?;

    Ok(match parsed {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        Value::Object(map) if map.is_empty() => Vec::new(),
        other => vec![other],
    })
}
