//! Confidence label module

use serde::{Deserialize, Serialize};
use std::fmt;

/// How well the evidence supports an answer.
///
/// Ordered `Low < Medium < High`. Verification rules may lower a label but
/// never raise it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Weak or missing support
    #[default]
    Low,

    /// Partial support
    Medium,

    /// Strong support
    High,
}

impl Confidence {
    /// Get the label as a lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }

    /// Parse a label, accepting surrounding whitespace and any letter case.
    ///
    /// Returns `None` for anything outside the three valid labels.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Confidence::Low),
            "medium" => Some(Confidence::Medium),
            "high" => Some(Confidence::High),
            _ => None,
        }
    }

    /// Coerce arbitrary text into a label; unrecognized input becomes `Low`.
    ///
    /// # Examples
    ///
    /// ```
    /// use explainer_domain::Confidence;
    ///
    /// assert_eq!(Confidence::coerce(" HIGH "), Confidence::High);
    /// assert_eq!(Confidence::coerce("very sure"), Confidence::Low);
    /// ```
    pub fn coerce(s: &str) -> Self {
        Self::parse(s).unwrap_or(Confidence::Low)
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Confidence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid confidence label: {}", s))
    }
}
