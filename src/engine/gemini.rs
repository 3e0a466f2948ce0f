//! HTTP client for the Gemini generateContent API, behind the
//! [`CompletionEngine`] trait so producers can be tested against a mock.

use async_trait::async_trait;
use base64::Engine as _;

use super::types::{
    CompletionRequest, CompletionResponse, EngineTool, GenerateContentRequest,
    GenerateContentResponse, WebSource, WireContent, WireGenerationConfig, WireGoogleSearch,
    WirePart, WireTool,
};
use super::EngineError;

/// One completion call against an opaque text-completion service.
///
/// The engine may return text, nothing, or malformed output; callers own
/// parsing and validation. Transport failures surface as [`EngineError`].
#[async_trait]
pub trait CompletionEngine: Send + Sync {
    async fn complete(&self, request: CompletionRequest)
        -> Result<CompletionResponse, EngineError>;
}

/// Gemini API client. Built once at startup and shared read-only across
/// requests (the pre-warmed handle).
pub struct GeminiClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiClient {
    /// Create a client against a specific base URL.
    pub fn new(base_url: &str, api_key: &str, request_timeout: std::time::Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        }
    }

    fn build_wire_request(request: &CompletionRequest) -> GenerateContentRequest {
        let mut parts = Vec::with_capacity(2);
        if let Some(attachment) = &request.attachment {
            let encoded = base64::engine::general_purpose::STANDARD.encode(&attachment.data);
            parts.push(WirePart::blob(&attachment.mime_type, encoded));
        }
        parts.push(WirePart::text(request.instruction.clone()));

        let tools = request
            .tools
            .iter()
            .map(|tool| match tool {
                EngineTool::GoogleSearch => WireTool {
                    google_search: Some(WireGoogleSearch {}),
                },
            })
            .collect();

        GenerateContentRequest {
            contents: vec![WireContent {
                role: "user",
                parts,
            }],
            tools,
            generation_config: WireGenerationConfig {
                temperature: request.temperature,
                // Search grounding and forced-JSON output are mutually
                // exclusive upstream; tools win.
                response_mime_type: (request.json_output && request.tools.is_empty())
                    .then_some("application/json"),
            },
        }
    }

    fn extract_response(parsed: GenerateContentResponse) -> CompletionResponse {
        let mut text = String::new();
        let mut sources = Vec::new();

        for candidate in parsed.candidates {
            if let Some(content) = candidate.content {
                for part in content.parts {
                    if let Some(t) = part.text {
                        text.push_str(&t);
                    }
                }
            }
            if let Some(grounding) = candidate.grounding_metadata {
                for chunk in grounding.grounding_chunks {
                    if let Some(web) = chunk.web {
                        sources.push(WebSource {
                            title: web.title.unwrap_or_default(),
                            url: web.uri.unwrap_or_default(),
                        });
                    }
                }
            }
        }

        CompletionResponse {
            text: (!text.trim().is_empty()).then_some(text),
            sources,
        }
    }
}

#[async_trait]
impl CompletionEngine for GeminiClient {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, EngineError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, request.model
        );
        let body = Self::build_wire_request(&request);

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    EngineError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    EngineError::HttpClient("request timed out".into())
                } else {
                    EngineError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| EngineError::ResponseDecoding(e.to_string()))?;

        Ok(Self::extract_response(parsed))
    }
}

// ═══════════════════════════════════════════════════════════
// Mock engine for tests
// ═══════════════════════════════════════════════════════════

/// Mock completion engine — replays a scripted sequence of outcomes and
/// records every request it receives.
pub struct MockEngine {
    script: std::sync::Mutex<std::collections::VecDeque<Result<CompletionResponse, EngineError>>>,
    requests: std::sync::Mutex<Vec<CompletionRequest>>,
    /// Simulated latency applied before each reply.
    delay: std::time::Duration,
}

impl MockEngine {
    pub fn new() -> Self {
        Self {
            script: std::sync::Mutex::new(std::collections::VecDeque::new()),
            requests: std::sync::Mutex::new(Vec::new()),
            delay: std::time::Duration::ZERO,
        }
    }

    /// Queue a text reply.
    pub fn reply_text(self, text: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Ok(CompletionResponse::text(text)));
        self
    }

    /// Queue an empty reply (engine produced no text).
    pub fn reply_empty(self) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Ok(CompletionResponse::default()));
        self
    }

    /// Queue a full response (e.g. with grounding sources).
    pub fn reply(self, response: CompletionResponse) -> Self {
        self.script.lock().unwrap().push_back(Ok(response));
        self
    }

    /// Queue a transport failure.
    pub fn reply_error(self, error: EngineError) -> Self {
        self.script.lock().unwrap().push_back(Err(error));
        self
    }

    /// Delay every reply, for timeout tests.
    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Requests received so far, in order.
    pub fn recorded(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of completion calls made.
    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionEngine for MockEngine {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, EngineError> {
        self.requests.lock().unwrap().push(request);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(CompletionResponse::default()))
    }
}
