//! Error types for the pipeline

use thiserror::Error;

/// Errors raised inside a pipeline run
///
/// None of these reach the caller of `ExplainerPipeline::run`; they decide
/// which state the run moves to next.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// No JSON object could be recovered from model text
    #[error("Could not parse JSON object from model output: {0}")]
    MalformedOutput(String),

    /// The chat backend failed or answered with an unexpected shape
    #[error("{0}")]
    Transport(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for PipelineError {
    fn from(e: serde_json::Error) -> Self {
        PipelineError::MalformedOutput(e.to_string())
    }
}
