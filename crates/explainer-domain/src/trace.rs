//! Run trace: which steps executed and with which backend settings

use crate::BackendMetadata;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for one explain run, based on UUIDv7
///
/// UUIDv7 sorts chronologically, so traces order by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(uuid::Uuid);

impl RunId {
    /// Generate a new UUIDv7-based RunId
    ///
    /// # Examples
    ///
    /// ```
    /// use explainer_domain::RunId;
    ///
    /// let a = RunId::new();
    /// let b = RunId::new();
    /// assert_ne!(a, b);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A step of the explain pipeline, recorded in the order it ran
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStep {
    /// Primary model call with the question and context
    #[serde(rename = "llm_primary_call")]
    PrimaryCall,
    /// JSON extraction and schema normalization of the primary output
    ParseJson,
    /// One-shot request to convert malformed output into strict JSON
    #[serde(rename = "llm_json_repair_call")]
    RepairCall,
    /// Optional second model call reviewing the first result
    #[serde(rename = "llm_critique_call")]
    CritiqueCall,
    /// Quote localization against the context
    VerifyEvidence,
    /// Keyword overlap between evidence and question
    ScoreRelevance,
    /// Rule-based confidence downgrade
    AdjustConfidence,
    /// Safe default record after a failure
    Fallback,
}

impl PipelineStep {
    /// Get the step name as recorded in the trace
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStep::PrimaryCall => "llm_primary_call",
            PipelineStep::ParseJson => "parse_json",
            PipelineStep::RepairCall => "llm_json_repair_call",
            PipelineStep::CritiqueCall => "llm_critique_call",
            PipelineStep::VerifyEvidence => "verify_evidence",
            PipelineStep::ScoreRelevance => "score_relevance",
            PipelineStep::AdjustConfidence => "adjust_confidence",
            PipelineStep::Fallback => "fallback",
        }
    }
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audit record of one run. Built once at the end of the run and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceRecord {
    /// Run identifier
    pub run_id: RunId,

    /// When the trace was built
    pub timestamp_utc: DateTime<Utc>,

    /// Model name reported by the backend
    pub model_name: String,

    /// Backend kind reported by the backend
    pub backend: String,

    /// Backend base URL
    pub base_url: String,

    /// Sampling temperature of the primary and critique calls
    pub temperature: f32,

    /// Token budget per call
    pub max_tokens: u32,

    /// Steps in the order they ran
    pub steps_run: Vec<PipelineStep>,

    /// Bounded preview of the primary call's raw output
    pub raw_output_preview: String,
}

impl TraceRecord {
    /// Build a trace, truncating the raw output to `preview_chars` characters
    pub fn new(
        meta: &BackendMetadata,
        temperature: f32,
        max_tokens: u32,
        steps_run: Vec<PipelineStep>,
        raw_output: &str,
        preview_chars: usize,
    ) -> Self {
        Self {
            run_id: RunId::new(),
            timestamp_utc: Utc::now(),
            model_name: meta.model.clone(),
            backend: meta.backend.clone(),
            base_url: meta.base_url.clone(),
            temperature,
            max_tokens,
            steps_run,
            raw_output_preview: raw_output.chars().take(preview_chars).collect(),
        }
    }

    /// True if the given step ran at least once
    pub fn ran(&self, step: PipelineStep) -> bool {
        self.steps_run.contains(&step)
    }

    /// Number of times the given step ran
    pub fn count(&self, step: PipelineStep) -> usize {
        self.steps_run.iter().filter(|s| **s == step).count()
    }
}
