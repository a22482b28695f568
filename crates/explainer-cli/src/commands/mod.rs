//! Command implementations.

pub mod chat;
pub mod check;
pub mod explain;
pub mod profile;

pub use self::chat::execute_chat;
pub use self::check::execute_check;
pub use self::explain::execute_explain;
pub use self::profile::execute_profile;

use crate::cli::ContextSource;
use crate::config::Resolved;
use crate::error::{CliError, Result};
use explainer_domain::ChatBackend;
use explainer_llm::{create_backend, Backend};
use explainer_pipeline::ExplainerPipeline;
use explainer_verifier::Verifier;
use std::fs;
use std::io::Read;
use tracing::debug;

/// Build the HTTP backend described by the resolved settings.
pub fn build_backend(settings: &Resolved) -> Result<Backend> {
    debug!(
        backend = settings.backend.as_str(),
        base_url = %settings.base_url,
        model = %settings.model,
        "Creating chat backend"
    );
    Ok(create_backend(
        settings.backend,
        &settings.base_url,
        &settings.model,
        settings.timeout_secs,
    )?)
}

/// Wrap a backend in a pipeline configured from the resolved settings.
pub fn build_pipeline<B: ChatBackend>(backend: B, settings: &Resolved) -> Result<ExplainerPipeline<B>> {
    settings.pipeline.validate()?;
    let verifier = Verifier::new(settings.verifier.clone())?;
    Ok(ExplainerPipeline::with_config(backend, settings.pipeline.clone()).with_verifier(verifier))
}

/// Read the source text from whichever input the user selected.
pub fn read_context(source: &ContextSource, stdin: impl Read) -> Result<String> {
    let context = if let Some(text) = &source.context {
        text.clone()
    } else if let Some(path) = &source.context_file {
        fs::read_to_string(path)?
    } else if source.stdin {
        let mut buf = String::new();
        let mut stdin = stdin;
        stdin.read_to_string(&mut buf)?;
        buf
    } else {
        return Err(CliError::InvalidInput(
            "Provide --context, --context-file or --stdin".to_string(),
        ));
    };

    if context.trim().is_empty() {
        return Err(CliError::InvalidInput("Context is required.".to_string()));
    }
    Ok(context)
}

/// Trim the question, rejecting an empty one.
pub fn require_question(question: &str) -> Result<String> {
    let question = question.trim();
    if question.is_empty() {
        return Err(CliError::InvalidInput("Question is required.".to_string()));
    }
    Ok(question.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::io::Cursor;

    #[test]
    fn test_read_inline_context() {
        let source = ContextSource { context: Some("The sky is blue.".into()), ..Default::default() };
        assert_eq!(read_context(&source, std::io::empty()).unwrap(), "The sky is blue.");
    }

    #[test]
    fn test_read_context_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ctx.txt");
        fs::write(&path, "line one\nline two\n").unwrap();

        let source = ContextSource { context_file: Some(path), ..Default::default() };
        assert_eq!(read_context(&source, std::io::empty()).unwrap(), "line one\nline two\n");
    }

    #[test]
    fn test_read_context_from_stdin() {
        let source = ContextSource { stdin: true, ..Default::default() };
        let context = read_context(&source, Cursor::new("piped text")).unwrap();
        assert_eq!(context, "piped text");
    }

    #[test]
    fn test_blank_context_rejected() {
        let source = ContextSource { context: Some("  \n ".into()), ..Default::default() };
        assert!(matches!(
            read_context(&source, std::io::empty()),
            Err(CliError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_missing_context_file() {
        let source = ContextSource {
            context_file: Some("/nonexistent/ctx.txt".into()),
            ..Default::default()
        };
        assert!(matches!(read_context(&source, std::io::empty()), Err(CliError::Io(_))));
    }

    #[test]
    fn test_require_question() {
        assert_eq!(require_question("  Why?  ").unwrap(), "Why?");
        assert!(require_question("   ").is_err());
    }

    #[test]
    fn test_build_pipeline_rejects_bad_settings() {
        let mut settings = Config::default().resolve(|_| None).unwrap();
        settings.pipeline.max_tokens = 0;
        let result = build_pipeline(explainer_llm::MockBackend::default(), &settings);
        assert!(matches!(result, Err(CliError::Pipeline(_))));
    }

    #[test]
    fn test_build_backend_uses_profile() {
        let settings = Config::default().resolve(|_| None).unwrap();
        let backend = build_backend(&settings).unwrap();
        let meta = backend.metadata();
        assert_eq!(meta.backend, "ollama");
        assert_eq!(meta.model, "llama3.1:8b");
    }
}
