//! Response wrapper mirroring the richer client library's response object.

use serde::Deserialize;
use serde_json::Value;

/// Parsed result of a `generateContent` call.
///
/// Holds the full response body alongside the first generated text
/// fragment, extracted once at construction. Absent or unexpectedly shaped
/// fields degrade to an empty string rather than an error, so callers can
/// always read [`GenerateResponse::text`] without a fallible step.
#[derive(Clone, Debug)]
pub struct GenerateResponse {
    raw: Value,
    text: String,
}

impl GenerateResponse {
    /// Wraps a parsed response body and extracts its text.
    #[must_use]
    pub fn new(raw: Value) -> Self {
        let text = extract_text(&raw);
        Self { raw, text }
    }

    /// Returns the first generated text fragment, or `""` when the response
    /// carried none.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the full parsed response body.
    #[must_use]
    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

/// Walks first candidate, its content, first part, its text. Every missing
/// segment short-circuits to `""`.
fn extract_text(raw: &Value) -> String {
    let Ok(parsed) = GenerateContentResponse::deserialize(raw) else {
        tracing::warn!("response body did not match the generateContent shape");
        return String::new();
    };

    parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content.parts.into_iter().next())
        .map(|part| part.text)
        .unwrap_or_default()
}
