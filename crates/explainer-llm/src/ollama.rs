//! Ollama Backend Implementation
//!
//! Talks to a local Ollama server through its native chat API
//! (`POST /api/chat`). Requests that ask for JSON output are sent with
//! Ollama's JSON mode enabled.
//!
//! # Examples
//!
//! ```no_run
//! use explainer_llm::OllamaBackend;
//! use explainer_domain::{ChatBackend, ChatMessage};
//!
//! let backend = OllamaBackend::default_endpoint("llama3.1:8b").unwrap();
//! let reply = backend.chat(&[ChatMessage::user("Say hello")], 0.2, 64).unwrap();
//! println!("{}", reply);
//! ```

use crate::{http_client, normalize_base_url, probe_timeout, LlmError, ProbeStatus, DEFAULT_TIMEOUT_SECS};
use explainer_domain::{BackendMetadata, ChatBackend, ChatMessage};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default Ollama API endpoint
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Default Ollama model
pub const DEFAULT_MODEL: &str = "llama3.1:8b";

/// Message fragments that mark a request as expecting a JSON reply
pub const JSON_MODE_MARKERS: [&str; 3] = [
    "OUTPUT JSON SCHEMA",
    "STRICT JSON",
    "Return this exact JSON object shape",
];

/// Ollama chat backend
pub struct OllamaBackend {
    base_url: String,
    model: String,
    timeout_secs: u64,
    client: reqwest::blocking::Client,
}

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: OllamaOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'static str>,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaReplyMessage,
}

#[derive(Deserialize)]
struct OllamaReplyMessage {
    content: String,
}

#[derive(Deserialize)]
struct OllamaTagsResponse {
    #[serde(default)]
    models: Vec<OllamaModelTag>,
}

#[derive(Deserialize)]
struct OllamaModelTag {
    #[serde(default)]
    name: String,
}

/// True if any message asks the model for JSON output
pub fn wants_json(messages: &[ChatMessage]) -> bool {
    messages
        .iter()
        .any(|m| JSON_MODE_MARKERS.iter().any(|marker| m.content.contains(marker)))
}

impl OllamaBackend {
    /// Create a new Ollama backend
    ///
    /// # Parameters
    ///
    /// - `base_url`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `model`: Model to use (e.g., "llama3.1:8b")
    /// - `timeout_secs`: Per-request timeout
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Result<Self, LlmError> {
        Ok(Self {
            base_url: normalize_base_url(base_url),
            model: model.to_string(),
            timeout_secs,
            client: http_client(Duration::from_secs(timeout_secs))?,
        })
    }

    /// Create a backend on the default local endpoint
    pub fn default_endpoint(model: &str) -> Result<Self, LlmError> {
        Self::new(DEFAULT_BASE_URL, model, DEFAULT_TIMEOUT_SECS)
    }

    /// List installed models and report whether the configured one is among them
    pub fn probe(&self) -> Result<ProbeStatus, LlmError> {
        let url = format!("{}/api/tags", self.base_url);
        let timeout = probe_timeout(self.timeout_secs);
        let client = http_client(timeout)?;

        let response = client
            .get(&url)
            .send()
            .map_err(|e| LlmError::from_reqwest(e, timeout.as_secs()))?;
        if !response.status().is_success() {
            return Err(LlmError::Communication(format!("HTTP {}", response.status())));
        }
        let tags: OllamaTagsResponse = response
            .json()
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse model list: {}", e)))?;

        if tags.models.iter().any(|m| m.name == self.model) {
            Ok(ProbeStatus::ready(format!("Connected to Ollama. Model ready: {}", self.model)))
        } else {
            Ok(ProbeStatus::not_ready(format!(
                "Ollama is running, but model '{}' is not found. Run: ollama pull {}",
                self.model, self.model
            )))
        }
    }

    fn parse_reply(body: &str) -> Result<String, LlmError> {
        serde_json::from_str::<OllamaChatResponse>(body)
            .map(|r| r.message.content)
            .map_err(|e| {
                LlmError::InvalidResponse(format!("Unexpected Ollama response format: {}", e))
            })
    }
}

impl ChatBackend for OllamaBackend {
    type Error = LlmError;

    fn chat(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, Self::Error> {
        let url = format!("{}/api/chat", self.base_url);
        let request_body = OllamaChatRequest {
            model: &self.model,
            messages,
            stream: false,
            options: OllamaOptions {
                temperature,
                num_predict: max_tokens,
            },
            format: wants_json(messages).then_some("json"),
        };

        debug!(model = %self.model, json_mode = request_body.format.is_some(), "Sending Ollama chat request");

        let response = self
            .client
            .post(&url)
            .json(&request_body)
            .send()
            .map_err(|e| LlmError::from_reqwest(e, self.timeout_secs))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LlmError::ModelNotAvailable(self.model.clone()));
        }
        let body = response
            .text()
            .map_err(|e| LlmError::from_reqwest(e, self.timeout_secs))?;
        if !status.is_success() {
            return Err(LlmError::Communication(format!("HTTP {}: {}", status, body)));
        }

        Self::parse_reply(&body)
    }

    fn metadata(&self) -> BackendMetadata {
        BackendMetadata {
            model: self.model.clone(),
            backend: "ollama".to_string(),
            base_url: self.base_url.clone(),
            timeout_secs: self.timeout_secs,
        }
    }
}
