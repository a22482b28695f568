//! CLI command definitions and argument parsing.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Black Box Explainer - Ask a local model about a text and see how well the answer is grounded.
#[derive(Debug, Parser)]
#[command(name = "explainer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Profile to use
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (answer only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Answer a question about a text and verify the quoted evidence
    Explain(ExplainArgs),

    /// Check that the backend of the active profile is reachable
    Check,

    /// Ask follow-up questions about a question and its context
    Chat(ChatArgs),

    /// Manage backend profiles
    Profile(ProfileArgs),
}

/// Where the source text comes from.
#[derive(Debug, Clone, Default, clap::Args)]
#[group(required = true, multiple = false)]
pub struct ContextSource {
    /// Source text given inline
    #[arg(long)]
    pub context: Option<String>,

    /// Read the source text from a file
    #[arg(long)]
    pub context_file: Option<PathBuf>,

    /// Read the source text from stdin
    #[arg(long)]
    pub stdin: bool,
}

/// Arguments for the explain command.
#[derive(Debug, Parser)]
pub struct ExplainArgs {
    /// The question to answer
    pub question: String,

    #[command(flatten)]
    pub source: ContextSource,

    /// Sampling temperature (0.0-2.0)
    #[arg(short, long)]
    pub temperature: Option<f32>,

    /// Token budget per model call
    #[arg(short, long)]
    pub max_tokens: Option<u32>,

    /// Run the critique pass after the primary answer
    #[arg(long)]
    pub critique: bool,

    /// Write the context with verified evidence highlighted to an HTML file
    #[arg(long)]
    pub html_out: Option<PathBuf>,

    /// Skip the backend readiness check
    #[arg(long)]
    pub skip_check: bool,
}

/// Arguments for the chat command.
#[derive(Debug, Parser)]
pub struct ChatArgs {
    /// The original question
    pub question: String,

    #[command(flatten)]
    pub source: ContextSource,
}

/// Arguments for profile management.
#[derive(Debug, Parser)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub action: ProfileAction,
}

/// Profile management actions.
#[derive(Debug, Subcommand)]
pub enum ProfileAction {
    /// List all profiles
    List,

    /// Show active profile
    Show,

    /// Switch to a different profile
    Switch {
        /// Profile name
        name: String,
    },

    /// Create or update a profile
    Set {
        /// Profile name
        name: String,
        /// Backend kind (ollama or lmstudio)
        #[arg(short, long)]
        backend: String,
        /// Base URL of the backend API (defaults per backend)
        #[arg(short = 'u', long)]
        base_url: Option<String>,
        /// Model name (defaults per backend)
        #[arg(short, long)]
        model: Option<String>,
        /// Request timeout in seconds
        #[arg(short, long)]
        timeout_secs: Option<u64>,
    },

    /// Delete a profile
    Delete {
        /// Profile name
        name: String,
    },
}

impl Cli {
    /// Log filter used when `RUST_LOG` is not set.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explain_command() {
        let cli = Cli::parse_from([
            "explainer",
            "explain",
            "Why is the sky blue?",
            "--context",
            "The sky is blue.",
            "--critique",
        ]);
        match cli.command {
            Command::Explain(args) => {
                assert_eq!(args.question, "Why is the sky blue?");
                assert_eq!(args.source.context.as_deref(), Some("The sky is blue."));
                assert!(args.critique);
                assert!(args.temperature.is_none());
            }
            _ => panic!("Expected Explain command"),
        }
    }

    #[test]
    fn test_explain_requires_one_context_source() {
        assert!(Cli::try_parse_from(["explainer", "explain", "q"]).is_err());
        assert!(Cli::try_parse_from([
            "explainer",
            "explain",
            "q",
            "--context",
            "a",
            "--stdin"
        ])
        .is_err());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["explainer", "-vv", "--format", "json", "--no-color", "check"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.log_filter(), "debug");
        assert!(cli.no_color);
        assert!(matches!(cli.format, Some(CliFormat::Json)));
        assert!(matches!(cli.command, Command::Check));
    }

    #[test]
    fn test_default_log_filter() {
        let cli = Cli::parse_from(["explainer", "check"]);
        assert_eq!(cli.log_filter(), "warn");
        let cli = Cli::parse_from(["explainer", "check", "-v"]);
        assert_eq!(cli.log_filter(), "info");
    }

    #[test]
    fn test_profile_set_command() {
        let cli = Cli::parse_from([
            "explainer", "profile", "set", "local", "--backend", "ollama", "--model", "mistral",
        ]);
        match cli.command {
            Command::Profile(ProfileArgs {
                action: ProfileAction::Set { name, backend, model, base_url, .. },
            }) => {
                assert_eq!(name, "local");
                assert_eq!(backend, "ollama");
                assert_eq!(model.as_deref(), Some("mistral"));
                assert!(base_url.is_none());
            }
            _ => panic!("Expected Profile Set command"),
        }
    }
}
