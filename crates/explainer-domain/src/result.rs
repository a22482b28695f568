//! The canonical result record produced for one question/context pair

use crate::{Confidence, EvidenceClaim, TraceRecord};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Answer shown when the run could not produce a usable result
pub const FALLBACK_ANSWER: &str = "Unable to produce a reliable answer from the local model.";

/// Confidence reason attached to the fallback record
pub const FALLBACK_REASON: &str = "Local model call or JSON parsing failed.";

/// Confidence reason of a freshly defaulted record
pub const DEFAULT_REASON: &str = "No valid model output parsed.";

/// Result of one explain run.
///
/// Created fresh per run, handed stage to stage by value, and discarded
/// once rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Direct answer to the question
    pub answer: String,

    /// How the model likely moved from the context to the answer
    pub black_box_explanation: String,

    /// Assumptions the answer relies on
    pub assumptions: Vec<String>,

    /// Evidence quoted from the context
    pub evidence_claims: Vec<EvidenceClaim>,

    /// What could be wrong
    pub uncertainty: Vec<String>,

    /// Confidence label
    pub confidence: Confidence,

    /// Accumulated explanation of the confidence label
    pub confidence_reason: String,

    /// Optional what-if questions
    pub followups: Vec<String>,

    /// Context rendered as HTML with verified evidence marked
    #[serde(default)]
    pub highlighted_context: String,

    /// Audit trail of the run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_log: Option<TraceRecord>,
}

impl ResultRecord {
    /// Safe record returned when a run fails
    ///
    /// # Examples
    ///
    /// ```
    /// use explainer_domain::{Confidence, ResultRecord};
    ///
    /// let record = ResultRecord::failed("connection refused");
    /// assert_eq!(record.confidence, Confidence::Low);
    /// assert!(record.evidence_claims.is_empty());
    /// assert_eq!(record.uncertainty, vec!["Pipeline error: connection refused".to_string()]);
    /// ```
    pub fn failed(cause: impl fmt::Display) -> Self {
        Self {
            answer: FALLBACK_ANSWER.to_string(),
            uncertainty: vec![format!("Pipeline error: {}", cause)],
            confidence: Confidence::Low,
            confidence_reason: FALLBACK_REASON.to_string(),
            evidence_claims: Vec::new(),
            ..Self::default()
        }
    }

    /// Number of evidence claims located in the context
    pub fn verified_count(&self) -> usize {
        self.evidence_claims.iter().filter(|c| c.verified).count()
    }

    /// Append a note to the confidence reason without discarding earlier text
    pub fn append_reason(&mut self, note: &str) {
        let joined = format!("{} {}", self.confidence_reason, note);
        self.confidence_reason = joined.trim().to_string();
    }

    /// Serialize the model-facing fields (no highlight or trace) as JSON
    pub fn to_model_json(&self) -> Result<String, serde_json::Error> {
        let mut bare = self.clone();
        bare.highlighted_context = String::new();
        bare.trace_log = None;
        let mut value = serde_json::to_value(&bare)?;
        if let Some(obj) = value.as_object_mut() {
            obj.remove("highlighted_context");
        }
        serde_json::to_string(&value)
    }
}

impl Default for ResultRecord {
    fn default() -> Self {
        Self {
            answer: String::new(),
            black_box_explanation: String::new(),
            assumptions: Vec::new(),
            evidence_claims: Vec::new(),
            uncertainty: Vec::new(),
            confidence: Confidence::Low,
            confidence_reason: DEFAULT_REASON.to_string(),
            followups: Vec::new(),
            highlighted_context: String::new(),
            trace_log: None,
        }
    }
}
