//! Conversations: listing and the interactive realtime chat loop.

pub mod commands;
pub mod input;
pub mod loop_runner;
pub mod renderer;

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use crate::state::AppState;

use super::print_json;

/// List the user's conversations, most recent first as the backend orders them.
pub async fn list_conversations(state: &AppState, json: bool) -> Result<()> {
    let me = state.require_login().await?;
    let conversations = state.chat.conversations().await?;

    if json {
        return print_json(&conversations);
    }
    if conversations.is_empty() {
        println!();
        println!(
            "  {} No conversations yet. Start one with: {}",
            style("i").blue().bold(),
            style("uni chat @username").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("ID").fg(Color::White),
        Cell::new("With").fg(Color::White),
        Cell::new("Last message").fg(Color::White),
        Cell::new("When").fg(Color::White),
    ]);
    for c in &conversations {
        let (preview, when) = match &c.last_message {
            Some(m) => (
                format!("{}: {}", m.author_username, m.content.chars().take(60).collect::<String>()),
                m.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            ),
            None => (String::new(), String::new()),
        };
        table.add_row(vec![
            Cell::new(c.id).fg(Color::DarkGrey),
            Cell::new(c.peers(&me)).fg(Color::Cyan),
            Cell::new(preview),
            Cell::new(when).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    Ok(())
}
