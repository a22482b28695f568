//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Backend error
    #[error("Backend error: {0}")]
    Llm(#[from] explainer_llm::LlmError),

    /// Pipeline error
    #[error("{0}")]
    Pipeline(#[from] explainer_pipeline::PipelineError),

    /// Verifier configuration error
    #[error("Verifier error: {0}")]
    Verifier(#[from] explainer_verifier::VerifierError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Line editor error
    #[error("Line editor error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Operation not permitted
    #[error("Operation not permitted: {0}")]
    NotPermitted(String),

    /// Backend is not ready to serve requests
    #[error("Backend not ready: {0}")]
    NotReady(String),
}
