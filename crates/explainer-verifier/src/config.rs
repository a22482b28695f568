//! Verifier configuration

use crate::VerifierError;
use serde::{Deserialize, Serialize};

/// Score a fuzzy alignment must reach to count as a match (0-100)
pub const DEFAULT_FUZZY_MIN_SCORE: f64 = 88.0;

/// Shortest token kept by the relevance scorer
pub const DEFAULT_MIN_TOKEN_LEN: usize = 3;

/// Configuration for quote localization and relevance scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Enable the fuzzy alignment tier
    pub fuzzy_enabled: bool,

    /// Minimum fuzzy alignment score (0-100)
    pub fuzzy_min_score: f64,

    /// Minimum token length for keyword overlap
    pub min_token_len: usize,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            fuzzy_enabled: true,
            fuzzy_min_score: DEFAULT_FUZZY_MIN_SCORE,
            min_token_len: DEFAULT_MIN_TOKEN_LEN,
        }
    }
}

impl VerifierConfig {
    /// Only exact, case-insensitive and normalized matches count
    pub fn strict() -> Self {
        Self {
            fuzzy_enabled: false,
            ..Self::default()
        }
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), VerifierError> {
        if !(0.0..=100.0).contains(&self.fuzzy_min_score) {
            return Err(VerifierError::Config(format!(
                "fuzzy_min_score must be within 0-100, got {}",
                self.fuzzy_min_score
            )));
        }
        if self.min_token_len == 0 {
            return Err(VerifierError::Config(
                "min_token_len must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
