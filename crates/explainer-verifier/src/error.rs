//! Verifier error types

use thiserror::Error;

/// Errors that can occur while configuring the verifier
#[derive(Error, Debug)]
pub enum VerifierError {
    /// Configuration value out of range
    #[error("Configuration error: {0}")]
    Config(String),
}
