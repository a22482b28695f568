//! Trait definitions for external interactions
//!
//! The core consumes exactly one capability from the outside world: sending
//! chat messages to a model backend. Implementations live in `explainer-llm`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// System instructions
    System,
    /// User turn
    User,
    /// Model turn
    Assistant,
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        };
        f.write_str(s)
    }
}

/// A single chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who is speaking
    pub role: ChatRole,
    /// Message text
    pub content: String,
}

impl ChatMessage {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: ChatRole::System, content: content.into() }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: ChatRole::Assistant, content: content.into() }
    }
}

/// Identity of a chat backend, recorded in every trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendMetadata {
    /// Model name
    pub model: String,
    /// Backend kind (e.g. "ollama", "lmstudio", "mock")
    pub backend: String,
    /// Base URL of the backend API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Trait for chat model backends
///
/// Implemented by the infrastructure layer (explainer-llm). A call blocks
/// until the backend answers or its own timeout expires.
pub trait ChatBackend {
    /// Error type for backend operations
    type Error: fmt::Display;

    /// Send messages and return the raw reply text
    fn chat(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, Self::Error>;

    /// Describe the backend
    fn metadata(&self) -> BackendMetadata;
}

impl<T: ChatBackend + ?Sized> ChatBackend for &T {
    type Error = T::Error;

    fn chat(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, Self::Error> {
        (**self).chat(messages, temperature, max_tokens)
    }

    fn metadata(&self) -> BackendMetadata {
        (**self).metadata()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors() {
        assert_eq!(ChatMessage::system("s").role, ChatRole::System);
        assert_eq!(ChatMessage::user("u").role, ChatRole::User);
        assert_eq!(ChatMessage::assistant("a").content, "a");
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&ChatMessage::user("hi")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hi"}"#);
    }
}
