//! Check command implementation.

use crate::commands::build_backend;
use crate::config::Resolved;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use explainer_llm::{BackendKind, LlmError, ProbeStatus};

/// Execute the check command.
pub fn execute_check(settings: &Resolved, formatter: &Formatter) -> Result<()> {
    let backend = build_backend(settings)?;
    let status = probe_message(settings, backend.probe());

    if status.ready {
        println!("{}", formatter.success(&status.message));
        Ok(())
    } else {
        Err(CliError::NotReady(status.message))
    }
}

/// Turn a probe outcome into a status, reporting connection failures as not ready.
pub(crate) fn probe_message(
    settings: &Resolved,
    outcome: std::result::Result<ProbeStatus, LlmError>,
) -> ProbeStatus {
    match outcome {
        Ok(status) => status,
        Err(e) => {
            let name = match settings.backend {
                BackendKind::Ollama => "Ollama",
                BackendKind::LmStudio => "LM Studio",
            };
            ProbeStatus {
                ready: false,
                message: format!("Cannot connect to {} at {}. {}", name, settings.base_url, e),
            }
        }
    }
}
