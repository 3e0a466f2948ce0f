//! Candidate extraction from raw producer text.
//!
//! Producers are asked for bare JSON, but engines occasionally wrap the
//! body in a ```json fence or lead with prose. Extraction is lenient about
//! the wrapping and strict about the payload: the result must parse as a
//! JSON object or the candidate is rejected.

use serde_json::Value;

use super::ReportError;

/// Parse raw producer output into an untyped report candidate.
pub fn parse_report_candidate(text: &str) -> Result<Value, ReportError> {
    let payload = match extract_fenced_json(text) {
        Some(fenced) => fenced,
        None => text.trim(),
    };

    let value: Value =
        serde_json::from_str(payload).map_err(|e| ReportError::JsonParsing(e.to_string()))?;

    if !value.is_object() {
        return Err(ReportError::NotAnObject);
    }
    Ok(value)
}

/// Pull the body out of a ```json ... ``` fence, if the text carries one.
fn extract_fenced_json(text: &str) -> Option<&str> {
    let fence_start = text.find("```json")?;
    let body_start = fence_start + 7;
    let body_end = text[body_start..].find("```")?;
    Some(text[body_start..body_start + body_end].trim())
}
