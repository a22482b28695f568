//! Explain command implementation.

use crate::cli::ExplainArgs;
use crate::commands::check::probe_message;
use crate::commands::{build_backend, build_pipeline, read_context, require_question};
use crate::config::Resolved;
use crate::error::{CliError, Result};
use crate::output::{html_document, Formatter};
use explainer_domain::{ChatBackend, ResultRecord};
use explainer_pipeline::{ExplainRequest, ExplainerPipeline};
use std::fs;
use std::path::Path;

/// Execute the explain command.
pub fn execute_explain(args: ExplainArgs, settings: &Resolved, formatter: &Formatter) -> Result<()> {
    let question = require_question(&args.question)?;
    let context = read_context(&args.source, std::io::stdin())?;

    let backend = build_backend(settings)?;
    if !args.skip_check {
        let status = probe_message(settings, backend.probe());
        if !status.ready {
            return Err(CliError::NotReady(status.message));
        }
    }

    let pipeline = build_pipeline(backend, settings)?;
    let request = build_request(&args, question, context, pipeline.config());
    let record = run_explain(&pipeline, &request, args.html_out.as_deref())?;

    println!("{}", formatter.format_result(&record)?);
    if let Some(path) = &args.html_out {
        eprintln!(
            "{}",
            formatter.success(&format!("Highlighted context written to {}", path.display()))
        );
    }
    Ok(())
}

/// Request from the command line, falling back to the pipeline config for unset flags.
fn build_request(
    args: &ExplainArgs,
    question: String,
    context: String,
    config: &explainer_pipeline::PipelineConfig,
) -> ExplainRequest {
    let mut request = ExplainRequest::from_config(question, context, config);
    if let Some(t) = args.temperature {
        request = request.with_temperature(t);
    }
    if let Some(n) = args.max_tokens {
        request = request.with_max_tokens(n);
    }
    if args.critique {
        request = request.with_critique(true);
    }
    request
}

/// Run the pipeline and write the HTML page if asked to.
pub fn run_explain<B: ChatBackend>(
    pipeline: &ExplainerPipeline<B>,
    request: &ExplainRequest,
    html_out: Option<&Path>,
) -> Result<ResultRecord> {
    if !(0.0..=2.0).contains(&request.temperature) {
        return Err(CliError::InvalidInput(format!(
            "Temperature must be between 0.0 and 2.0, got {}",
            request.temperature
        )));
    }
    if request.max_tokens == 0 {
        return Err(CliError::InvalidInput("Max tokens must be greater than 0".to_string()));
    }

    let record = pipeline.run(request);

    if let Some(path) = html_out {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, html_document(&request.question, &record))?;
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ContextSource;
    use explainer_domain::Confidence;
    use explainer_llm::MockBackend;
    use explainer_pipeline::PipelineConfig;

    const REPLY: &str = r#"{"answer": "It is blue.", "confidence": "high",
        "confidence_reason": "Stated directly.",
        "evidence_claims": [{"claim": "Sky is blue", "quote": "sky is blue"}]}"#;

    fn args() -> ExplainArgs {
        ExplainArgs {
            question: "What colour is the sky?".to_string(),
            source: ContextSource { context: Some("The sky is blue.".into()), ..Default::default() },
            temperature: None,
            max_tokens: None,
            critique: false,
            html_out: None,
            skip_check: true,
        }
    }

    #[test]
    fn test_request_uses_config_then_flags() {
        let config = PipelineConfig { critique_pass: false, max_tokens: 300, ..Default::default() };
        let request = build_request(&args(), "q".into(), "c".into(), &config);
        assert_eq!(request.max_tokens, 300);
        assert!(!request.critique_pass);

        let mut with_flags = args();
        with_flags.temperature = Some(0.9);
        with_flags.max_tokens = Some(50);
        with_flags.critique = true;
        let request = build_request(&with_flags, "q".into(), "c".into(), &config);
        assert_eq!(request.temperature, 0.9);
        assert_eq!(request.max_tokens, 50);
        assert!(request.critique_pass);
    }

    #[test]
    fn test_run_explain_writes_html() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("result.html");
        let pipeline = ExplainerPipeline::new(MockBackend::new(REPLY));
        let request = ExplainRequest::new("What colour is the sky?", "The sky is blue.");

        let record = run_explain(&pipeline, &request, Some(&path)).unwrap();
        assert_eq!(record.confidence, Confidence::High);

        let html = fs::read_to_string(&path).unwrap();
        assert!(html.contains("The <mark>sky is blue</mark>."));
        assert!(html.contains("What colour is the sky?"));
    }

    #[test]
    fn test_run_explain_rejects_out_of_range_settings() {
        let pipeline = ExplainerPipeline::new(MockBackend::new(REPLY));
        let hot = ExplainRequest::new("q", "c").with_temperature(3.5);
        assert!(matches!(run_explain(&pipeline, &hot, None), Err(CliError::InvalidInput(_))));

        let empty = ExplainRequest::new("q", "c").with_max_tokens(0);
        assert!(matches!(run_explain(&pipeline, &empty, None), Err(CliError::InvalidInput(_))));
        assert_eq!(pipeline.backend().call_count(), 0);
    }

    #[test]
    fn test_backend_failure_still_renders() {
        let pipeline = ExplainerPipeline::new(MockBackend::default().with_error("connection refused"));
        let request = ExplainRequest::new("q", "some context");
        let record = run_explain(&pipeline, &request, None).unwrap();
        assert_eq!(record.confidence, Confidence::Low);
        assert!(record.uncertainty[0].contains("connection refused"));
    }
}
