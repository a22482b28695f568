//! Request type for the pipeline

use crate::PipelineConfig;
use serde::{Deserialize, Serialize};

/// One question about one source text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplainRequest {
    /// The user's question
    pub question: String,

    /// Source text the answer must be grounded in
    pub context: String,

    /// Sampling temperature of the primary and critique calls
    pub temperature: f32,

    /// Token budget per model call
    pub max_tokens: u32,

    /// Run the optional critique call
    pub critique_pass: bool,
}

impl ExplainRequest {
    /// Create a request with default sampling settings
    pub fn new(question: impl Into<String>, context: impl Into<String>) -> Self {
        Self::from_config(question, context, &PipelineConfig::default())
    }

    /// Create a request using the sampling settings of `config`
    pub fn from_config(
        question: impl Into<String>,
        context: impl Into<String>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            question: question.into(),
            context: context.into(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            critique_pass: config.critique_pass,
        }
    }

    /// Enable or disable the critique call
    pub fn with_critique(mut self, enabled: bool) -> Self {
        self.critique_pass = enabled;
        self
    }

    /// Override the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Override the token budget
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}
