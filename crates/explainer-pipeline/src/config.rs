//! Configuration for the pipeline

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};

/// Configuration for the explain pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Sampling temperature of the primary and critique calls
    pub temperature: f32,

    /// Token budget per model call
    pub max_tokens: u32,

    /// Run the optional critique call
    pub critique_pass: bool,

    /// Characters of the primary raw output kept in the trace
    pub raw_preview_chars: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            max_tokens: 700,
            critique_pass: false,
            raw_preview_chars: 500,
        }
    }
}

impl PipelineConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(PipelineError::Config(format!(
                "temperature must be within 0.0-2.0, got {}",
                self.temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(PipelineError::Config(
                "max_tokens must be greater than 0".to_string(),
            ));
        }
        if self.raw_preview_chars == 0 {
            return Err(PipelineError::Config(
                "raw_preview_chars must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
