//! Engine-facing request/response abstraction plus the generateContent
//! wire types it serializes to.
//!
//! Producers build a [`CompletionRequest`]; only the wire layer knows the
//! camelCase JSON shape of the upstream API.

use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════
// Abstraction used by producers
// ═══════════════════════════════════════════════════════════

/// Auxiliary tools a producer may hand to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineTool {
    /// Web search grounding (used by the fraud lookup).
    GoogleSearch,
}

/// Binary document handed to the first pipeline stage and the
/// single-shot producer.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// One completion call: an instruction, an optional attachment, and
/// generation knobs.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub instruction: String,
    pub attachment: Option<Attachment>,
    pub temperature: f32,
    /// Ask the engine for a JSON response body.
    pub json_output: bool,
    pub tools: Vec<EngineTool>,
}

impl CompletionRequest {
    pub fn new(model: &str, instruction: String) -> Self {
        Self {
            model: model.to_string(),
            instruction,
            attachment: None,
            temperature: 0.2,
            json_output: false,
            tools: Vec::new(),
        }
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn json(mut self) -> Self {
        self.json_output = true;
        self
    }

    pub fn with_tools(mut self, tools: &[EngineTool]) -> Self {
        self.tools = tools.to_vec();
        self
    }
}

/// Web source surfaced by search grounding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WebSource {
    pub title: String,
    pub url: String,
}

/// What came back from the engine. `text` is `None` when the engine
/// produced no usable text; that is a valid outcome, not an error.
#[derive(Debug, Clone, Default)]
pub struct CompletionResponse {
    pub text: Option<String>,
    pub sources: Vec<WebSource>,
}

impl CompletionResponse {
    pub fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            sources: Vec::new(),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// generateContent wire types
// ═══════════════════════════════════════════════════════════

/// Request body for `models/{model}:generateContent`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    pub contents: Vec<WireContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<WireTool>,
    pub generation_config: WireGenerationConfig,
}

#[derive(Serialize)]
pub(crate) struct WireContent {
    pub role: &'static str,
    pub parts: Vec<WirePart>,
}

/// A content part: exactly one of `text` / `inline_data` is set.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WirePart {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<WireBlob>,
}

impl WirePart {
    pub fn text(text: String) -> Self {
        Self {
            text: Some(text),
            inline_data: None,
        }
    }

    pub fn blob(mime_type: &str, base64_data: String) -> Self {
        Self {
            text: None,
            inline_data: Some(WireBlob {
                mime_type: mime_type.to_string(),
                data: base64_data,
            }),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireBlob {
    pub mime_type: String,
    pub data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireTool {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_search: Option<WireGoogleSearch>,
}

#[derive(Serialize)]
pub(crate) struct WireGoogleSearch {}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireGenerationConfig {
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<&'static str>,
}

/// Response body from `generateContent`.
#[derive(Deserialize)]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<WireCandidate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireCandidate {
    pub content: Option<WireCandidateContent>,
    pub grounding_metadata: Option<WireGroundingMetadata>,
}

#[derive(Deserialize)]
pub(crate) struct WireCandidateContent {
    #[serde(default)]
    pub parts: Vec<WireResponsePart>,
}

#[derive(Deserialize)]
pub(crate) struct WireResponsePart {
    pub text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireGroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<WireGroundingChunk>,
}

#[derive(Deserialize)]
pub(crate) struct WireGroundingChunk {
    pub web: Option<WireWebSource>,
}

#[derive(Deserialize)]
pub(crate) struct WireWebSource {
    pub title: Option<String>,
    pub uri: Option<String>,
}
