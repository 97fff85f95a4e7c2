//! Interactive realtime chat loop.
//!
//! Resolves the conversation, opens its channel, prints the history, then
//! multiplexes typed lines and channel events in one `select!` loop until the
//! user exits, the channel closes for good, or the session ends.

use std::io::Write;

use anyhow::Context;
use console::style;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use universe_core::chat::{ChannelEvent, ChannelState};
use universe_types::chat::ConversationId;
use universe_types::error::ChatError;
use universe_types::session::SessionEvent;

use crate::cli::spinner;
use crate::state::AppState;

use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};
use super::renderer::{print_banner, print_message, print_state};

/// Run the chat loop for `target`: a conversation id, or `@username` to
/// find or start the conversation with that user.
pub async fn run_chat_loop(state: &AppState, target: &str) -> anyhow::Result<()> {
    let me = state.require_login().await?;

    let (conversation, peers) = match target.parse::<i64>() {
        Ok(id) => (ConversationId(id), format!("#{id}")),
        Err(_) => {
            let username = target.trim_start_matches('@');
            let conversation = state
                .chat
                .start(username)
                .await
                .with_context(|| format!("could not start a conversation with {username}"))?;
            (conversation.id, conversation.peers(&me))
        }
    };

    let progress = spinner("Connecting...", false);
    let opened = state.chat.open(conversation).await;
    progress.finish_and_clear();
    let channel = opened?;

    print_banner(&peers, conversation);
    let mut stdout = std::io::stdout();
    for message in channel.messages().await {
        print_message(&mut stdout, &message, &me);
    }

    let (mut input, mut out) = ChatInput::new(format!("{} ", style(">").cyan().bold()))?;
    let mut events = channel.subscribe();
    let mut session_events = state.session.subscribe();
    info!(%conversation, "chat loop started");

    loop {
        tokio::select! {
            line = input.read_line() => match line {
                InputEvent::Message(text) => {
                    if let Some(cmd) = commands::parse(&text) {
                        match cmd {
                            ChatCommand::Help => commands::print_help(&mut out),
                            ChatCommand::History => {
                                for message in channel.messages().await {
                                    print_message(&mut out, &message, &me);
                                }
                            }
                            ChatCommand::Status => print_state(&mut out, channel.state()),
                            ChatCommand::Exit => break,
                            ChatCommand::Unknown(cmd) => {
                                let _ = writeln!(out, "  {} Unknown command {cmd}. Type /help", style("?").yellow());
                            }
                        }
                        continue;
                    }
                    if text.is_empty() {
                        continue;
                    }
                    match channel.send(&text) {
                        Ok(()) => {}
                        Err(ChatError::NotConnected) => {
                            let _ = writeln!(out, "  {} Not connected yet; message not sent", style("!").yellow().bold());
                        }
                        Err(e) => {
                            let _ = writeln!(out, "  {} {e}", style("✗").red().bold());
                        }
                    }
                }
                InputEvent::Eof | InputEvent::Interrupted => break,
            },

            event = events.recv() => match event {
                Ok(ChannelEvent::Message(message)) => print_message(&mut out, &message, &me),
                Ok(ChannelEvent::StateChanged(new_state)) => {
                    print_state(&mut out, new_state);
                    if let ChannelState::Closed { .. } = new_state {
                        break;
                    }
                }
                Err(RecvError::Lagged(n)) => warn!(skipped = n, "chat display lagged"),
                Err(RecvError::Closed) => break,
            },

            event = session_events.recv() => {
                if let Ok(SessionEvent::LoggedOut { reason }) = event {
                    let _ = writeln!(out, "  {} Session ended ({reason}). Log in again with uni login", style("!").yellow().bold());
                    break;
                }
            }
        }
    }

    input.finish();
    channel.close().await;
    println!();
    Ok(())
}
