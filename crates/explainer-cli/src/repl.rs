//! Interactive follow-up chat (Read-Eval-Print Loop).
//!
//! Every turn is sent as a single follow-up about the original question and
//! context; earlier turns are kept for display only.

use crate::error::{CliError, Result};
use crate::output::Formatter;
use explainer_domain::{ChatBackend, ChatMessage};
use explainer_pipeline::ExplainerPipeline;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::Path;
use tracing::debug;

/// Follow-up conversation about one question and its context.
pub struct Conversation {
    question: String,
    context: String,
    turns: Vec<ChatMessage>,
}

impl Conversation {
    /// Start an empty conversation.
    pub fn new(question: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            context: context.into(),
            turns: Vec::new(),
        }
    }

    /// Ask a follow-up and record both sides of the exchange.
    ///
    /// A failed call leaves the transcript unchanged.
    pub fn ask<B: ChatBackend>(
        &mut self,
        pipeline: &ExplainerPipeline<B>,
        text: &str,
    ) -> Result<String> {
        let text = text.trim();
        if text.is_empty() {
            return Err(CliError::InvalidInput("Follow-up question is empty".to_string()));
        }

        let reply = pipeline.followup(&self.question, &self.context, text)?;
        self.turns.push(ChatMessage::user(text));
        self.turns.push(ChatMessage::assistant(reply.clone()));
        Ok(reply)
    }

    /// Forget all turns.
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Turns so far, oldest first.
    pub fn turns(&self) -> &[ChatMessage] {
        &self.turns
    }
}

/// REPL command type.
#[derive(Debug, PartialEq)]
enum ReplCommand {
    Exit,
    Help,
    Clear,
    History,
    Ask(String),
}

/// Parse a REPL input line.
fn parse_repl_command(line: &str) -> ReplCommand {
    match line.trim() {
        "exit" | "quit" | "q" => ReplCommand::Exit,
        "help" | "?" => ReplCommand::Help,
        "clear" => ReplCommand::Clear,
        "history" => ReplCommand::History,
        other => ReplCommand::Ask(other.to_string()),
    }
}

/// Run the interactive follow-up chat.
pub fn run_chat_repl<B: ChatBackend>(
    pipeline: &ExplainerPipeline<B>,
    conversation: &mut Conversation,
    formatter: &Formatter,
    history_path: &Path,
    history_size: usize,
) -> Result<()> {
    println!(
        "{}",
        formatter.info("Follow-up chat - Type 'help' for commands, 'exit' to quit")
    );
    println!();

    let editor_config = rustyline::Config::builder()
        .max_history_size(history_size.max(1))?
        .auto_add_history(false)
        .build();
    let mut editor = DefaultEditor::with_config(editor_config)?;

    if let Some(parent) = history_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let _ = editor.load_history(history_path);

    loop {
        match editor.readline("follow-up> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                editor.add_history_entry(line).ok();

                match parse_repl_command(line) {
                    ReplCommand::Exit => {
                        println!("{}", formatter.info("Goodbye!"));
                        break;
                    }
                    ReplCommand::Help => print_help(formatter),
                    ReplCommand::Clear => {
                        conversation.clear();
                        editor.clear_history().ok();
                        println!("{}", formatter.success("Chat cleared"));
                    }
                    ReplCommand::History => print_transcript(conversation, formatter),
                    ReplCommand::Ask(text) => match conversation.ask(pipeline, &text) {
                        Ok(reply) => {
                            println!("{}", reply);
                            println!();
                        }
                        Err(e) => eprintln!("{}", formatter.error(&e.to_string())),
                    },
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", formatter.info("Use 'exit' to quit"));
            }
            Err(ReadlineError::Eof) => {
                break;
            }
            Err(err) => {
                eprintln!("{}", formatter.error(&format!("Error: {}", err)));
                break;
            }
        }
    }

    if let Err(e) = editor.save_history(history_path) {
        debug!("Could not save chat history: {}", e);
    }

    Ok(())
}

fn print_transcript(conversation: &Conversation, formatter: &Formatter) {
    if conversation.turns().is_empty() {
        println!("{}", formatter.info("No messages yet"));
        return;
    }
    for turn in conversation.turns() {
        println!("{}", formatter.heading(&turn.role.to_string()));
        println!("{}", turn.content);
        println!();
    }
}

fn print_help(formatter: &Formatter) {
    println!("{}", formatter.info("Available commands:"));
    println!();
    println!("  <text>                - Ask a follow-up about the question and context");
    println!("  history               - Show this conversation");
    println!("  clear                 - Clear the conversation");
    println!("  help, ?               - Show this help");
    println!("  exit, quit, q         - Exit chat");
    println!();
}
