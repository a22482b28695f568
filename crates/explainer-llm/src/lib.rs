//! Explainer Chat Backends
//!
//! Implementations of the `ChatBackend` trait from `explainer-domain`.
//!
//! # Backends
//!
//! - `MockBackend`: Scripted replies for deterministic testing
//! - `OllamaBackend`: Local Ollama chat API
//! - `LmStudioBackend`: LM Studio's OpenAI-compatible API
//!
//! `Backend` wraps the HTTP backends behind one type so callers can pick a
//! backend by name at runtime.
//!
//! # Examples
//!
//! ```
//! use explainer_llm::MockBackend;
//! use explainer_domain::{ChatBackend, ChatMessage};
//!
//! let backend = MockBackend::new("Hello from the model!");
//! let reply = backend.chat(&[ChatMessage::user("hi")], 0.2, 64).unwrap();
//! assert_eq!(reply, "Hello from the model!");
//! ```

#![warn(missing_docs)]

pub mod lmstudio;
pub mod ollama;

use explainer_domain::{BackendMetadata, ChatBackend, ChatMessage};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;

pub use lmstudio::LmStudioBackend;
pub use ollama::OllamaBackend;

/// Default request timeout for chat calls (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Bounds applied to the readiness probe timeout (seconds)
pub const PROBE_TIMEOUT_BOUNDS: (u64, u64) = (5, 30);

/// Errors that can occur during backend operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or HTTP status failure
    #[error("Communication error: {0}")]
    Communication(String),

    /// The backend did not answer within its timeout
    #[error("Request timed out after {0}s")]
    Timeout(u64),

    /// Reply did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Model not available on the backend
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Unknown backend name
    #[error("Unsupported backend: {0}")]
    UnsupportedBackend(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

impl LlmError {
    /// Classify a reqwest failure, separating timeouts from other transport errors
    pub(crate) fn from_reqwest(e: reqwest::Error, timeout_secs: u64) -> Self {
        if e.is_timeout() {
            LlmError::Timeout(timeout_secs)
        } else {
            LlmError::Communication(format!("Request failed: {}", e))
        }
    }
}

/// Build a blocking HTTP client with the given timeout
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::blocking::Client, LlmError> {
    reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| LlmError::Other(format!("Failed to build HTTP client: {}", e)))
}

/// Strip trailing slashes so paths can be appended with `format!("{}/...")`
pub(crate) fn normalize_base_url(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}

/// Clamp a chat timeout into the probe bounds
pub fn probe_timeout(timeout_secs: u64) -> Duration {
    let (lo, hi) = PROBE_TIMEOUT_BOUNDS;
    Duration::from_secs(timeout_secs.clamp(lo, hi))
}

/// Outcome of a readiness probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeStatus {
    /// Backend reachable and model installed
    pub ready: bool,
    /// Human-readable status line
    pub message: String,
}

impl ProbeStatus {
    fn ready(message: impl Into<String>) -> Self {
        Self { ready: true, message: message.into() }
    }

    fn not_ready(message: impl Into<String>) -> Self {
        Self { ready: false, message: message.into() }
    }
}

/// Supported backend kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Ollama native API
    Ollama,
    /// LM Studio OpenAI-compatible API
    LmStudio,
}

impl BackendKind {
    /// Parse a backend name (case-insensitive)
    pub fn parse(name: &str) -> Result<Self, LlmError> {
        match name.trim().to_lowercase().as_str() {
            "ollama" => Ok(BackendKind::Ollama),
            "lmstudio" | "lm-studio" | "lm_studio" => Ok(BackendKind::LmStudio),
            other => Err(LlmError::UnsupportedBackend(other.to_string())),
        }
    }

    /// Get the backend name
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Ollama => "ollama",
            BackendKind::LmStudio => "lmstudio",
        }
    }

    /// Default base URL for this backend
    pub fn default_base_url(&self) -> &'static str {
        match self {
            BackendKind::Ollama => ollama::DEFAULT_BASE_URL,
            BackendKind::LmStudio => lmstudio::DEFAULT_BASE_URL,
        }
    }

    /// Default model for this backend
    pub fn default_model(&self) -> &'static str {
        match self {
            BackendKind::Ollama => ollama::DEFAULT_MODEL,
            BackendKind::LmStudio => lmstudio::DEFAULT_MODEL,
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A concrete HTTP backend selected at runtime
pub enum Backend {
    /// Ollama backend
    Ollama(OllamaBackend),
    /// LM Studio backend
    LmStudio(LmStudioBackend),
}

impl Backend {
    /// Check that the backend answers and has the configured model
    pub fn probe(&self) -> Result<ProbeStatus, LlmError> {
        let meta = self.metadata();
        if meta.base_url.is_empty() || meta.model.trim().is_empty() {
            return Ok(ProbeStatus::not_ready("Base URL and Model are required."));
        }
        match self {
            Backend::Ollama(b) => b.probe(),
            Backend::LmStudio(b) => b.probe(),
        }
    }
}

impl ChatBackend for Backend {
    type Error = LlmError;

    fn chat(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, Self::Error> {
        match self {
            Backend::Ollama(b) => b.chat(messages, temperature, max_tokens),
            Backend::LmStudio(b) => b.chat(messages, temperature, max_tokens),
        }
    }

    fn metadata(&self) -> BackendMetadata {
        match self {
            Backend::Ollama(b) => b.metadata(),
            Backend::LmStudio(b) => b.metadata(),
        }
    }
}

/// Create a backend of the given kind
///
/// # Examples
///
/// ```
/// use explainer_llm::{create_backend, BackendKind};
/// use explainer_domain::ChatBackend;
///
/// let backend = create_backend(BackendKind::Ollama, "http://localhost:11434/", "llama3.1:8b", 60).unwrap();
/// assert_eq!(backend.metadata().base_url, "http://localhost:11434");
/// ```
pub fn create_backend(
    kind: BackendKind,
    base_url: &str,
    model: &str,
    timeout_secs: u64,
) -> Result<Backend, LlmError> {
    Ok(match kind {
        BackendKind::Ollama => Backend::Ollama(OllamaBackend::new(base_url, model, timeout_secs)?),
        BackendKind::LmStudio => {
            Backend::LmStudio(LmStudioBackend::new(base_url, model, timeout_secs)?)
        }
    })
}

/// A chat call captured by `MockBackend`
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Messages sent
    pub messages: Vec<ChatMessage>,
    /// Temperature requested
    pub temperature: f32,
    /// Token budget requested
    pub max_tokens: u32,
}

/// Mock backend for deterministic testing
///
/// Replies are taken from a script in FIFO order; once the script runs out
/// every call returns the default reply. No network calls are made.
///
/// # Examples
///
/// ```
/// use explainer_llm::MockBackend;
/// use explainer_domain::{ChatBackend, ChatMessage};
///
/// let backend = MockBackend::new("fallback")
///     .with_response("first")
///     .with_error("backend down");
///
/// let msgs = [ChatMessage::user("q")];
/// assert_eq!(backend.chat(&msgs, 0.0, 10).unwrap(), "first");
/// assert!(backend.chat(&msgs, 0.0, 10).is_err());
/// assert_eq!(backend.chat(&msgs, 0.0, 10).unwrap(), "fallback");
/// assert_eq!(backend.call_count(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct MockBackend {
    default_response: String,
    script: Arc<Mutex<VecDeque<Result<String, String>>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockBackend {
    /// Create a mock that answers every call with `response`
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            script: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a reply
    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.push_response(response);
        self
    }

    /// Queue a failure
    pub fn with_error(self, message: impl Into<String>) -> Self {
        self.push_error(message);
        self
    }

    /// Queue a reply on a shared mock
    pub fn push_response(&self, response: impl Into<String>) {
        lock(&self.script).push_back(Ok(response.into()));
    }

    /// Queue a failure on a shared mock
    pub fn push_error(&self, message: impl Into<String>) {
        lock(&self.script).push_back(Err(message.into()));
    }

    /// Number of chat calls made so far
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// All calls made so far, oldest first
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    /// Forget recorded calls
    pub fn reset_call_count(&self) {
        lock(&self.calls).clear();
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl ChatBackend for MockBackend {
    type Error = LlmError;

    fn chat(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, Self::Error> {
        lock(&self.calls).push(RecordedCall {
            messages: messages.to_vec(),
            temperature,
            max_tokens,
        });

        match lock(&self.script).pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(LlmError::Communication(message)),
            None => Ok(self.default_response.clone()),
        }
    }

    fn metadata(&self) -> BackendMetadata {
        BackendMetadata {
            model: "mock-model".to_string(),
            backend: "mock".to_string(),
            base_url: "mock://local".to_string(),
            timeout_secs: 0,
        }
    }
}
