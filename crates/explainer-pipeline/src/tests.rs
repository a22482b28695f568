//! Scenario tests for the pipeline

#[cfg(test)]
mod tests {
    use crate::{
        ExplainRequest, ExplainerPipeline, PipelineConfig, REPAIR_SYSTEM_PROMPT, REPAIR_TEMPERATURE,
    };
    use explainer_domain::result::{FALLBACK_ANSWER, FALLBACK_REASON};
    use explainer_domain::{Confidence, PipelineStep, Relevance, Span, EVIDENCE_NOT_FOUND};
    use explainer_llm::MockBackend;

    const CONTEXT: &str = "The sky is blue.";
    const QUESTION: &str = "What colour is the sky?";

    const SKY_ANSWER: &str = r#"{
        "answer": "Blue.",
        "black_box_explanation": "The context states the colour directly.",
        "assumptions": ["Daytime"],
        "evidence_claims": [
            {"claim": "The sky is blue", "support_reason": "Stated outright", "quote": "sky is blue", "verified": true}
        ],
        "uncertainty": [],
        "confidence": "high",
        "confidence_reason": "Directly stated.",
        "followups": ["What about at sunset?"]
    }"#;

    const SKY_ANSWER_WITH_MADE_UP_QUOTE: &str = r#"{
        "answer": "Blue.",
        "evidence_claims": [
            {"claim": "The sky is blue", "support_reason": "Stated", "quote": "sky is blue"},
            {"claim": "The sky is green at night", "support_reason": "Guess", "quote": "green at night"}
        ],
        "confidence": "high",
        "confidence_reason": "Directly stated."
    }"#;

    fn pipeline_with(backend: MockBackend) -> ExplainerPipeline<MockBackend> {
        ExplainerPipeline::new(backend)
    }

    fn request() -> ExplainRequest {
        ExplainRequest::new(QUESTION, CONTEXT)
    }

    fn steps(record: &explainer_domain::ResultRecord) -> Vec<PipelineStep> {
        record.trace_log.as_ref().map(|t| t.steps_run.clone()).unwrap_or_default()
    }

    #[test]
    fn test_end_to_end_verified_answer() {
        let pipeline = pipeline_with(MockBackend::new(SKY_ANSWER));
        let record = pipeline.run(&request());

        assert_eq!(record.answer, "Blue.");
        assert_eq!(record.confidence, Confidence::High);
        assert_eq!(record.confidence_reason, "Directly stated.");

        let claim = &record.evidence_claims[0];
        assert!(claim.verified);
        assert_eq!(claim.span(), Some(Span::new(4, 15)));
        assert_eq!(claim.quote, "sky is blue");
        assert_eq!(claim.question_relevance, Some(Relevance::Relevant));

        assert_eq!(record.highlighted_context, "The <mark>sky is blue</mark>.");
        assert_eq!(
            steps(&record),
            vec![
                PipelineStep::PrimaryCall,
                PipelineStep::ParseJson,
                PipelineStep::VerifyEvidence,
                PipelineStep::ScoreRelevance,
                PipelineStep::AdjustConfidence,
            ]
        );
        assert_eq!(pipeline.backend().call_count(), 1);
    }

    #[test]
    fn test_unverifiable_claim_downgrades_high_to_medium() {
        let pipeline = pipeline_with(MockBackend::new(SKY_ANSWER_WITH_MADE_UP_QUOTE));
        let record = pipeline.run(&request());

        assert_eq!(record.verified_count(), 1);
        assert_eq!(record.evidence_claims[1].quote, EVIDENCE_NOT_FOUND);
        assert_eq!(record.evidence_claims[1].start, None);
        assert_eq!(record.confidence, Confidence::Medium);
        assert_eq!(
            record.confidence_reason,
            "Directly stated. Some evidence quotes could not be verified."
        );
    }

    #[test]
    fn test_answer_without_evidence_is_low() {
        let pipeline = pipeline_with(MockBackend::new(r#"{"answer": "Blue.", "confidence": "high"}"#));
        let record = pipeline.run(&request());

        assert_eq!(record.confidence, Confidence::Low);
        assert_eq!(record.confidence_reason, "No evidence claims were provided.");
        assert_eq!(record.highlighted_context, "The sky is blue.");
    }

    #[test]
    fn test_prose_wrapped_json_needs_no_repair() {
        let reply = format!("Here is my analysis:\n```json\n{}\n```\nHope it helps!", SKY_ANSWER);
        let pipeline = pipeline_with(MockBackend::new(reply));
        let record = pipeline.run(&request());

        assert_eq!(record.answer, "Blue.");
        assert!(!record.trace_log.as_ref().unwrap().ran(PipelineStep::RepairCall));
    }

    #[test]
    fn test_repair_call_ignores_configured_temperature() {
        let backend = MockBackend::default()
            .with_response("not json")
            .with_response(SKY_ANSWER);
        let config = PipelineConfig { temperature: 0.9, ..Default::default() };
        let pipeline = ExplainerPipeline::with_config(backend, config);
        let record = pipeline.run(&ExplainRequest::new(QUESTION, CONTEXT).with_temperature(1.7));

        assert_eq!(record.answer, "Blue.");
        let calls = pipeline.backend().calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].temperature, 1.7);
        assert_eq!(calls[1].temperature, REPAIR_TEMPERATURE);
        assert_eq!(calls[1].temperature, 0.0);
    }

    #[test]
    fn test_repair_path() {
        let backend = MockBackend::default()
            .with_response("The sky is blue, I am quite sure.")
            .with_response(SKY_ANSWER);
        let pipeline = pipeline_with(backend);
        let record = pipeline.run(&request());

        assert_eq!(record.answer, "Blue.");
        assert!(record.evidence_claims[0].verified);
        assert_eq!(
            steps(&record),
            vec![
                PipelineStep::PrimaryCall,
                PipelineStep::ParseJson,
                PipelineStep::RepairCall,
                PipelineStep::VerifyEvidence,
                PipelineStep::ScoreRelevance,
                PipelineStep::AdjustConfidence,
            ]
        );

        let calls = pipeline.backend().calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].temperature, 0.0);
        assert_eq!(calls[1].messages[0].content, REPAIR_SYSTEM_PROMPT);
        assert!(calls[1].messages[1].content.ends_with("The sky is blue, I am quite sure."));

        let trace = record.trace_log.unwrap();
        assert_eq!(trace.raw_output_preview, "The sky is blue, I am quite sure.");
    }

    #[test]
    fn test_failed_repair_falls_back_without_second_repair() {
        let backend = MockBackend::new("still not json");
        let pipeline = pipeline_with(backend);
        let record = pipeline.run(&request());

        assert_eq!(pipeline.backend().call_count(), 2);
        assert_eq!(record.answer, FALLBACK_ANSWER);
        assert_eq!(record.confidence, Confidence::Low);
        assert_eq!(record.confidence_reason, FALLBACK_REASON);
        assert!(record.evidence_claims.is_empty());
        assert_eq!(record.uncertainty.len(), 1);
        assert!(record.uncertainty[0].starts_with("Pipeline error: "));
        assert_eq!(record.highlighted_context, "The sky is blue.");

        let trace = record.trace_log.unwrap();
        assert_eq!(trace.count(PipelineStep::RepairCall), 1);
        assert_eq!(trace.steps_run.last(), Some(&PipelineStep::Fallback));
    }

    #[test]
    fn test_transport_failure_falls_back() {
        let backend = MockBackend::new(SKY_ANSWER).with_error("connection refused");
        let pipeline = pipeline_with(backend);
        let record = pipeline.run(&request());

        assert_eq!(pipeline.backend().call_count(), 1);
        assert_eq!(record.answer, FALLBACK_ANSWER);
        assert!(record.uncertainty[0].contains("connection refused"));

        let trace = record.trace_log.unwrap();
        assert_eq!(trace.steps_run, vec![PipelineStep::PrimaryCall, PipelineStep::Fallback]);
        assert_eq!(trace.raw_output_preview, "");
        assert_eq!(trace.backend, "mock");
        assert_eq!(trace.model_name, "mock-model");
    }

    #[test]
    fn test_failed_repair_call_falls_back() {
        let backend = MockBackend::new(SKY_ANSWER)
            .with_response("not json")
            .with_error("timeout");
        let pipeline = pipeline_with(backend);
        let record = pipeline.run(&request());

        assert_eq!(pipeline.backend().call_count(), 2);
        assert_eq!(record.answer, FALLBACK_ANSWER);
        assert!(record.uncertainty[0].contains("timeout"));
    }

    #[test]
    fn test_critique_merges_lists_and_keeps_prior_fields() {
        let critique = r#"{
            "answer": "",
            "assumptions": ["daytime", "Clear weather"],
            "evidence_claims": [],
            "uncertainty": ["Could be a painted ceiling"],
            "confidence": "certain",
            "confidence_reason": "Reviewed.",
            "followups": ["What about at sunset?", "What about on Mars?"]
        }"#;
        let backend = MockBackend::default()
            .with_response(SKY_ANSWER)
            .with_response(critique);
        let pipeline = pipeline_with(backend);
        let record = pipeline.run(&request().with_critique(true));

        assert_eq!(record.answer, "Blue.");
        assert_eq!(record.assumptions, vec!["Daytime", "Clear weather"]);
        assert_eq!(record.uncertainty, vec!["Could be a painted ceiling"]);
        assert_eq!(record.followups, vec!["What about at sunset?", "What about on Mars?"]);
        assert_eq!(record.confidence, Confidence::High);
        assert_eq!(record.confidence_reason, "Reviewed.");
        assert!(record.evidence_claims[0].verified);

        let trace = record.trace_log.unwrap();
        assert_eq!(trace.count(PipelineStep::CritiqueCall), 1);
        assert_eq!(pipeline.backend().call_count(), 2);

        let calls = pipeline.backend().calls();
        assert!(calls[1].messages[1].content.contains("PRIOR_JSON:\n{"));
        assert!(calls[1].messages[1].content.contains("\"answer\":\"Blue.\""));
    }

    #[test]
    fn test_critique_overwrites_when_supplied() {
        let critique = r#"{
            "answer": "Blue, during the day.",
            "black_box_explanation": "Revised.",
            "evidence_claims": [{"claim": "Sky colour", "support_reason": "Stated", "quote": "The sky"}],
            "confidence": "Medium"
        }"#;
        let backend = MockBackend::default()
            .with_response(SKY_ANSWER)
            .with_response(critique);
        let pipeline = pipeline_with(backend);
        let record = pipeline.run(&request().with_critique(true));

        assert_eq!(record.answer, "Blue, during the day.");
        assert_eq!(record.black_box_explanation, "Revised.");
        assert_eq!(record.evidence_claims.len(), 1);
        assert_eq!(record.evidence_claims[0].span(), Some(Span::new(0, 7)));
        assert_eq!(record.confidence, Confidence::Medium);
        assert_eq!(record.confidence_reason, "Directly stated.");
    }

    #[test]
    fn test_malformed_critique_falls_back_without_repair() {
        let backend = MockBackend::default()
            .with_response(SKY_ANSWER)
            .with_response("I have no further comments.");
        let pipeline = pipeline_with(backend);
        let record = pipeline.run(&request().with_critique(true));

        assert_eq!(pipeline.backend().call_count(), 2);
        assert_eq!(record.answer, FALLBACK_ANSWER);
        let trace = record.trace_log.unwrap();
        assert_eq!(trace.count(PipelineStep::RepairCall), 0);
        assert_eq!(trace.steps_run.last(), Some(&PipelineStep::Fallback));
    }

    #[test]
    fn test_call_bound_holds_for_every_reply_sequence() {
        enum Reply {
            Valid,
            Garbage,
            Down,
        }

        let kinds = || [Reply::Valid, Reply::Garbage, Reply::Down];
        for first in kinds() {
            for second in kinds() {
                for third in kinds() {
                    for critique in [false, true] {
                        let backend = MockBackend::new("never reached in bounds");
                        for reply in [&first, &second, &third] {
                            match reply {
                                Reply::Valid => backend.push_response(SKY_ANSWER),
                                Reply::Garbage => backend.push_response("garbage"),
                                Reply::Down => backend.push_error("down"),
                            }
                        }

                        let pipeline = pipeline_with(backend);
                        let record = pipeline.run(&request().with_critique(critique));
                        let trace = record.trace_log.unwrap();

                        assert!(pipeline.backend().call_count() <= 3);
                        assert!(trace.count(PipelineStep::RepairCall) <= 1);
                        assert!(trace.count(PipelineStep::CritiqueCall) <= 1);
                        if !critique {
                            assert_eq!(trace.count(PipelineStep::CritiqueCall), 0);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_trace_records_request_settings() {
        let config = PipelineConfig {
            raw_preview_chars: 10,
            ..PipelineConfig::default()
        };
        let pipeline = ExplainerPipeline::with_config(MockBackend::new(SKY_ANSWER), config);
        let record = pipeline.run(&request().with_temperature(0.7).with_max_tokens(256));

        let trace = record.trace_log.unwrap();
        assert_eq!(trace.temperature, 0.7);
        assert_eq!(trace.max_tokens, 256);
        assert_eq!(trace.raw_output_preview.chars().count(), 10);

        let calls = pipeline.backend().calls();
        assert_eq!(calls[0].temperature, 0.7);
        assert_eq!(calls[0].max_tokens, 256);
    }

    #[test]
    fn test_explain_uses_config_defaults() {
        let config = PipelineConfig {
            critique_pass: true,
            ..PipelineConfig::default()
        };
        let pipeline = ExplainerPipeline::with_config(MockBackend::new(SKY_ANSWER), config);
        let record = pipeline.explain(QUESTION, CONTEXT);

        assert!(record.trace_log.unwrap().ran(PipelineStep::CritiqueCall));
        assert_eq!(pipeline.backend().call_count(), 2);
    }

    #[test]
    fn test_followup_sends_single_turn() {
        let pipeline = pipeline_with(MockBackend::new("Clang works too."));
        let reply = pipeline.followup(QUESTION, CONTEXT, "And at night?").unwrap();

        assert_eq!(reply, "Clang works too.");
        let calls = pipeline.backend().calls();
        assert_eq!(calls[0].messages.len(), 2);
        assert!(calls[0].messages[1].content.contains("Follow-up question:\nAnd at night?"));
    }
}
