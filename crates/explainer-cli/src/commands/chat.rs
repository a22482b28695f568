//! Chat command implementation.

use crate::cli::ChatArgs;
use crate::commands::{build_backend, build_pipeline, read_context, require_question};
use crate::config::{Config, Resolved};
use crate::error::Result;
use crate::output::Formatter;
use crate::repl::{run_chat_repl, Conversation};

/// File under the data directory holding follow-up chat input history
pub const HISTORY_FILE: &str = "chat_history.txt";

/// Execute the chat command.
pub fn execute_chat(
    args: ChatArgs,
    settings: &Resolved,
    formatter: &Formatter,
    history_size: usize,
) -> Result<()> {
    let question = require_question(&args.question)?;
    let context = read_context(&args.source, std::io::stdin())?;

    let pipeline = build_pipeline(build_backend(settings)?, settings)?;
    let mut conversation = Conversation::new(question, context);
    let history_path = Config::data_dir()?.join(HISTORY_FILE);

    run_chat_repl(&pipeline, &mut conversation, formatter, &history_path, history_size)
}
