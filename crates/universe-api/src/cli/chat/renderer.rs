//! Chat message and state rendering.

use std::io::Write;

use console::style;

use universe_core::chat::ChannelState;
use universe_types::chat::ChatMessage;

/// Print one message. The user's own messages are highlighted.
pub fn print_message(out: &mut impl Write, message: &ChatMessage, me: &str) {
    let time = message.timestamp.with_timezone(&chrono::Local).format("%H:%M");
    let author = if message.author_username == me {
        style(message.author_username.as_str()).green().bold()
    } else {
        style(message.author_username.as_str()).cyan().bold()
    };
    let _ = writeln!(out, "  {} {} {}", style(time).dim(), author, message.content);
}

/// Print a connection state change.
pub fn print_state(out: &mut impl Write, state: ChannelState) {
    let marker = match state {
        ChannelState::Open => style("●").green(),
        ChannelState::Connecting { .. } => style("●").yellow(),
        ChannelState::Closed { .. } => style("●").red(),
    };
    let _ = writeln!(out, "  {} {}", marker, style(state).dim());
}

/// Print the header shown when a conversation opens.
pub fn print_banner(peers: &str, conversation: impl std::fmt::Display) {
    println!();
    println!("  {} {}", style("💬").bold(), style(peers).cyan().bold());
    println!("  {}", style(format!("Conversation #{conversation}")).dim());
    println!();
    println!("  {}", style("Type /help for commands, Ctrl+D to exit").dim());
    println!("  {}", style("---").dim());
    println!();
}
