//! Explainer Domain Layer
//!
//! Core data model for grounding model answers against a user-supplied
//! source text. Every other crate in the workspace depends on these types.
//!
//! ## Key Concepts
//!
//! - **ResultRecord**: The canonical output of one question/context run
//! - **EvidenceClaim**: A model-asserted fact paired with a literal quotation
//! - **Confidence**: A three-level label that deterministic rules only ever lower
//! - **TraceRecord**: Audit trail of the steps a run went through
//! - **ChatBackend**: The single capability the core consumes from a model backend
//!
//! ## Architecture
//!
//! - Pure data and trait definitions only
//! - Records are plain owned values handed from stage to stage
//! - Infrastructure (HTTP backends, verification, orchestration) lives in other crates

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod confidence;
pub mod evidence;
pub mod result;
pub mod trace;
pub mod traits;

// Re-exports for convenience
pub use confidence::Confidence;
pub use evidence::{EvidenceClaim, Relevance, Span, EVIDENCE_NOT_FOUND};
pub use result::ResultRecord;
pub use trace::{PipelineStep, RunId, TraceRecord};
pub use traits::{BackendMetadata, ChatBackend, ChatMessage, ChatRole};
