//! Explain pipeline orchestrator
//!
//! One run moves through an explicit set of states:
//!
//! ```text
//! PrimaryCall -> ParsePrimary -> [RepairCall] -> [CritiquePass] -> Verify -> Done
//!       \              \               \                \
//!        +--------------+---------------+----------------+--> Failed -> Done
//! ```
//!
//! At most one repair call and one critique call are made, so a run issues
//! no more than three chat calls. Every path ends in `Done`, which attaches
//! the highlighted context and the trace.

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::json::extract_json_object;
use crate::prompt::PromptBuilder;
use crate::schema::{merge_unique, normalize_result, valid_confidence};
use crate::types::ExplainRequest;
use explainer_domain::{ChatBackend, ChatMessage, PipelineStep, ResultRecord, TraceRecord};
use explainer_verifier::Verifier;
use tracing::{debug, info, warn};

/// Temperature of the JSON repair call, regardless of request or config
pub const REPAIR_TEMPERATURE: f32 = 0.0;

/// States of a single run
enum State {
    PrimaryCall,
    ParsePrimary,
    RepairCall,
    CritiquePass(ResultRecord),
    Verify(ResultRecord),
    Failed(PipelineError),
    Done(ResultRecord),
}

impl State {
    fn name(&self) -> &'static str {
        match self {
            State::PrimaryCall => "primary_call",
            State::ParsePrimary => "parse_primary",
            State::RepairCall => "repair_call",
            State::CritiquePass(_) => "critique_pass",
            State::Verify(_) => "verify",
            State::Failed(_) => "failed",
            State::Done(_) => "done",
        }
    }
}

/// Grounds model answers in a source text
///
/// # Examples
///
/// ```
/// use explainer_llm::MockBackend;
/// use explainer_pipeline::ExplainerPipeline;
///
/// let backend = MockBackend::new(r#"{"answer": "Blue.", "confidence": "high",
///     "evidence_claims": [{"claim": "The sky is blue", "quote": "sky is blue"}]}"#);
/// let pipeline = ExplainerPipeline::new(backend);
///
/// let record = pipeline.explain("What colour is the sky?", "The sky is blue.");
/// assert_eq!(record.answer, "Blue.");
/// assert!(record.evidence_claims[0].verified);
/// ```
pub struct ExplainerPipeline<B: ChatBackend> {
    backend: B,
    verifier: Verifier,
    config: PipelineConfig,
}

impl<B: ChatBackend> ExplainerPipeline<B> {
    /// Create a pipeline with default configuration
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, PipelineConfig::default())
    }

    /// Create a pipeline with the given configuration
    pub fn with_config(backend: B, config: PipelineConfig) -> Self {
        Self {
            backend,
            verifier: Verifier::default(),
            config,
        }
    }

    /// Replace the verifier
    pub fn with_verifier(mut self, verifier: Verifier) -> Self {
        self.verifier = verifier;
        self
    }

    /// The chat backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Active configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run with the configured sampling settings
    pub fn explain(&self, question: &str, context: &str) -> ResultRecord {
        self.run(&ExplainRequest::from_config(question, context, &self.config))
    }

    /// Run one question/context pair to completion
    ///
    /// Never fails: any error produces the fallback record.
    pub fn run(&self, request: &ExplainRequest) -> ResultRecord {
        info!(
            "Starting explain run: question {} chars, context {} chars, critique {}",
            request.question.chars().count(),
            request.context.chars().count(),
            request.critique_pass
        );

        let prompts = PromptBuilder::new(&request.question, &request.context);
        let mut steps: Vec<PipelineStep> = Vec::new();
        let mut raw_primary = String::new();
        let mut state = State::PrimaryCall;

        let mut record = loop {
            debug!("Pipeline state: {}", state.name());
            state = match state {
                State::PrimaryCall => {
                    steps.push(PipelineStep::PrimaryCall);
                    match self.call(&prompts.primary_messages(), request.temperature, request.max_tokens) {
                        Ok(raw) => {
                            raw_primary = raw;
                            State::ParsePrimary
                        }
                        Err(e) => State::Failed(e),
                    }
                }
                State::ParsePrimary => {
                    steps.push(PipelineStep::ParseJson);
                    match parse_record(&raw_primary) {
                        Ok(parsed) => self.after_parse(parsed, request),
                        Err(e) => {
                            warn!("Primary output was not valid JSON, requesting repair: {}", e);
                            State::RepairCall
                        }
                    }
                }
                State::RepairCall => {
                    steps.push(PipelineStep::RepairCall);
                    let repaired = self
                        .call(
                            &prompts.repair_messages(&raw_primary),
                            REPAIR_TEMPERATURE,
                            request.max_tokens,
                        )
                        .and_then(|raw| parse_record(&raw));
                    match repaired {
                        Ok(parsed) => self.after_parse(parsed, request),
                        Err(e) => State::Failed(e),
                    }
                }
                State::CritiquePass(current) => {
                    steps.push(PipelineStep::CritiqueCall);
                    match self.critique(current, &prompts, request) {
                        Ok(merged) => State::Verify(merged),
                        Err(e) => State::Failed(e),
                    }
                }
                State::Verify(current) => {
                    steps.push(PipelineStep::VerifyEvidence);
                    let current = self.verifier.locate_evidence(current, &request.context);
                    steps.push(PipelineStep::ScoreRelevance);
                    let current = self.verifier.score_relevance(current, &request.question);
                    steps.push(PipelineStep::AdjustConfidence);
                    State::Done(self.verifier.adjust_confidence(current))
                }
                State::Failed(cause) => {
                    warn!("Explain run failed, returning fallback record: {}", cause);
                    steps.push(PipelineStep::Fallback);
                    State::Done(ResultRecord::failed(&cause))
                }
                State::Done(finished) => break finished,
            };
        };

        record.highlighted_context = self.verifier.highlight(&record, &request.context);
        record.trace_log = Some(TraceRecord::new(
            &self.backend.metadata(),
            request.temperature,
            request.max_tokens,
            steps,
            &raw_primary,
            self.config.raw_preview_chars,
        ));

        info!(
            "Explain run finished: confidence {}, {}/{} evidence verified",
            record.confidence,
            record.verified_count(),
            record.evidence_claims.len()
        );
        record
    }

    /// Answer a follow-up question about an earlier question and context
    pub fn followup(
        &self,
        question: &str,
        context: &str,
        followup: &str,
    ) -> Result<String, PipelineError> {
        let messages = PromptBuilder::new(question, context).followup_messages(followup);
        self.call(&messages, self.config.temperature, self.config.max_tokens)
    }

    fn after_parse(&self, record: ResultRecord, request: &ExplainRequest) -> State {
        if request.critique_pass {
            State::CritiquePass(record)
        } else {
            State::Verify(record)
        }
    }

    fn call(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, PipelineError> {
        self.backend
            .chat(messages, temperature, max_tokens)
            .map_err(|e| PipelineError::Transport(e.to_string()))
    }

    /// Ask the model to review `record` and merge its answer in
    fn critique(
        &self,
        mut record: ResultRecord,
        prompts: &PromptBuilder<'_>,
        request: &ExplainRequest,
    ) -> Result<ResultRecord, PipelineError> {
        let prior = record.to_model_json()?;
        let raw = self.call(
            &prompts.critique_messages(&prior),
            request.temperature,
            request.max_tokens,
        )?;
        let obj = extract_json_object(&raw)?;
        let critique = normalize_result(&obj);

        record.assumptions = merge_unique(&record.assumptions, &critique.assumptions);
        record.uncertainty = merge_unique(&record.uncertainty, &critique.uncertainty);
        record.followups = merge_unique(&record.followups, &critique.followups);

        if !critique.evidence_claims.is_empty() {
            record.evidence_claims = critique.evidence_claims;
        }
        if !critique.answer.is_empty() {
            record.answer = critique.answer;
        }
        if !critique.black_box_explanation.is_empty() {
            record.black_box_explanation = critique.black_box_explanation;
        }
        if let Some(confidence) = valid_confidence(&obj) {
            record.confidence = confidence;
        }
        if !critique.confidence_reason.is_empty() {
            record.confidence_reason = critique.confidence_reason;
        }

        debug!("Critique merged");
        Ok(record)
    }
}

fn parse_record(raw: &str) -> Result<ResultRecord, PipelineError> {
    extract_json_object(raw).map(|obj| normalize_result(&obj))
}
