//! Slash command parsing for the chat loop.

use std::io::Write;

use console::style;

/// Available slash commands in the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    /// Show available commands.
    Help,
    /// Reprint the whole conversation.
    History,
    /// Show the connection state.
    Status,
    /// Leave the chat.
    Exit,
    /// Unknown command.
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let cmd = trimmed.split_whitespace().next().unwrap_or(trimmed).to_lowercase();
    match cmd.as_str() {
        "/help" | "/h" | "/?" => Some(ChatCommand::Help),
        "/history" => Some(ChatCommand::History),
        "/status" => Some(ChatCommand::Status),
        "/exit" | "/quit" | "/q" => Some(ChatCommand::Exit),
        other => Some(ChatCommand::Unknown(other.to_string())),
    }
}

/// Print the help text listing all available commands.
pub fn print_help(out: &mut impl Write) {
    let _ = writeln!(out);
    let _ = writeln!(out, "  {}", style("Available commands:").bold());
    let _ = writeln!(out);
    let _ = writeln!(out, "  {}     Show this help message", style("/help").cyan());
    let _ = writeln!(out, "  {}  Show the whole conversation", style("/history").cyan());
    let _ = writeln!(out, "  {}   Show the connection state", style("/status").cyan());
    let _ = writeln!(out, "  {}     Leave the chat", style("/exit").cyan());
    let _ = writeln!(out);
}
