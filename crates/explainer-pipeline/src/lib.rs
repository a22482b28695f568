//! Explainer Pipeline
//!
//! Turns a question and a source text into a grounded, verified answer.
//!
//! # Overview
//!
//! The pipeline asks a chat model for a structured JSON answer, recovers and
//! normalizes that JSON, optionally asks the model to critique its own
//! answer, and then checks every quoted piece of evidence against the source
//! text before settling on a confidence label.
//!
//! # Architecture
//!
//! ```text
//! Question + Context → Prompt → ChatBackend → JSON Extractor → Normalizer
//!                                                   ↓ (malformed, once)
//!                                              Repair call
//!     → [Critique call] → Verifier (locate → relevance → confidence) → Highlight + Trace
//! ```
//!
//! # Key Features
//!
//! - **Failure containment**: `run` always returns a renderable record
//! - **Bounded calls**: at most one repair and one critique call per run
//! - **Deterministic verification**: the model's own `verified` flags are never trusted
//! - **Trace**: every run records the steps it took and a raw output preview
//!
//! # Example Usage
//!
//! ```
//! use explainer_llm::MockBackend;
//! use explainer_pipeline::{ExplainRequest, ExplainerPipeline};
//!
//! let backend = MockBackend::new("no json at all").with_error("backend went away");
//! let pipeline = ExplainerPipeline::new(backend);
//!
//! let record = pipeline.run(&ExplainRequest::new("Why?", "Because."));
//! assert_eq!(record.answer, "Unable to produce a reliable answer from the local model.");
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod json;
mod pipeline;
mod prompt;
mod schema;
mod types;

#[cfg(test)]
mod tests;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use json::extract_json_object;
pub use pipeline::{ExplainerPipeline, REPAIR_TEMPERATURE};
pub use prompt::{
    PromptBuilder, FOLLOWUP_SYSTEM_PROMPT, REPAIR_SYSTEM_PROMPT, SCHEMA_INSTRUCTIONS, SYSTEM_PROMPT,
};
pub use schema::{merge_unique, normalize_result, to_string_list, valid_confidence};
pub use types::ExplainRequest;
