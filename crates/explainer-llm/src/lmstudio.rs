//! LM Studio Backend Implementation
//!
//! LM Studio serves an OpenAI-compatible API, so requests go to
//! `{base_url}/chat/completions` and the reply is read from the first choice.
//! The base URL is expected to include the `/v1` prefix.

use crate::{http_client, normalize_base_url, probe_timeout, LlmError, ProbeStatus, DEFAULT_TIMEOUT_SECS};
use explainer_domain::{BackendMetadata, ChatBackend, ChatMessage};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default LM Studio API endpoint
pub const DEFAULT_BASE_URL: &str = "http://localhost:1234/v1";

/// Default LM Studio model
pub const DEFAULT_MODEL: &str = "qwen2.5-7b-instruct";

/// LM Studio chat backend
pub struct LmStudioBackend {
    base_url: String,
    model: String,
    timeout_secs: u64,
    client: reqwest::blocking::Client,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ModelList {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct ModelEntry {
    #[serde(default)]
    id: String,
}

impl LmStudioBackend {
    /// Create a new LM Studio backend
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

    /// List loaded models and report whether the configured one is among them
    pub fn probe(&self) -> Result<ProbeStatus, LlmError> {
        let url = format!("{}/models", self.base_url);
        let timeout = probe_timeout(self.timeout_secs);
        let client = http_client(timeout)?;

        let response = client
            .get(&url)
            .send()
            .map_err(|e| LlmError::from_reqwest(e, timeout.as_secs()))?;
        if !response.status().is_success() {
            return Err(LlmError::Communication(format!("HTTP {}", response.status())));
        }
        let models: ModelList = response
            .json()
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse model list: {}", e)))?;

        if models.data.iter().any(|m| m.id == self.model) {
            Ok(ProbeStatus::ready(format!(
                "Connected to LM Studio. Model ready: {}",
                self.model
            )))
        } else {
            Ok(ProbeStatus::not_ready(format!(
                "LM Studio is running, but model '{}' is not loaded. Load it in LM Studio first.",
                self.model
            )))
        }
    }

    fn parse_reply(body: &str) -> Result<String, LlmError> {
        let response: CompletionResponse = serde_json::from_str(body).map_err(|e| {
            LlmError::InvalidResponse(format!("Unexpected LM Studio response format: {}", e))
        })?;
        response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default())
            .ok_or_else(|| LlmError::InvalidResponse("Response has no choices".to_string()))
    }
}

impl ChatBackend for LmStudioBackend {
    type Error = LlmError;

    fn chat(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, Self::Error> {
        let url = format!("{}/chat/completions", self.base_url);
        let request_body = CompletionRequest {
            model: &self.model,
            messages,
            temperature,
            max_tokens,
            stream: false,
        };

        debug!(model = %self.model, "Sending LM Studio chat request");

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
            backend: "lmstudio".to_string(),
            base_url: self.base_url.clone(),
            timeout_secs: self.timeout_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lmstudio_backend_creation() {
        let backend = LmStudioBackend::new("http://localhost:1234/v1/", "qwen", 45).unwrap();
        assert_eq!(backend.base_url, "http://localhost:1234/v1");
        assert_eq!(backend.model, "qwen");
        assert_eq!(backend.metadata().backend, "lmstudio");
    }

    #[test]
    fn test_request_body_shape() {
        let messages = [ChatMessage::system("s"), ChatMessage::user("u")];
        let body = CompletionRequest {
            model: "qwen",
            messages: &messages,
            temperature: 0.2,
            max_tokens: 700,
            stream: false,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["max_tokens"], 700);
        assert_eq!(json["messages"][1]["role"], "user");
        assert!(json.get("format").is_none());
    }

    #[test]
    fn test_parse_reply() {
        let body = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"hi"}}]}"#;
        assert_eq!(LmStudioBackend::parse_reply(body).unwrap(), "hi");

        let null_content = r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#;
        assert_eq!(LmStudioBackend::parse_reply(null_content).unwrap(), "");

        let empty = r#"{"choices":[]}"#;
        assert!(matches!(
            LmStudioBackend::parse_reply(empty),
            Err(LlmError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_lmstudio_error_handling() {
        let backend = LmStudioBackend::new("http://127.0.0.1:9/v1", "qwen", 2).unwrap();
        let result = backend.chat(&[ChatMessage::user("test")], 0.2, 10);
        assert!(matches!(
            result,
            Err(LlmError::Communication(_)) | Err(LlmError::Timeout(_))
        ));
    }

    #[test]
    #[ignore] // Only run when LM Studio is available
    fn test_lmstudio_probe_integration() {
        let backend = LmStudioBackend::default_endpoint(DEFAULT_MODEL).unwrap();
        let status = backend.probe().unwrap();
        assert!(!status.message.is_empty());
    }
}
