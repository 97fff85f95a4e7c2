//! Theme preference commands.

use anyhow::Result;
use clap::Subcommand;
use console::style;

use universe_core::service::theme::AVAILABLE_THEMES;

use crate::state::AppState;

use super::print_json;

#[derive(Subcommand)]
pub enum ThemeCommand {
    /// Store a new theme.
    Set { name: String },
    /// List available themes.
    List,
}

pub async fn run(state: &AppState, action: Option<ThemeCommand>, json: bool) -> Result<()> {
    let themes = state.themes();
    match action {
        None => {
            let current = themes.current().await?;
            if json {
                return print_json(&serde_json::json!({ "theme": current }));
            }
            println!("  Theme: {}", style(current).cyan().bold());
        }
        Some(ThemeCommand::Set { name }) => {
            themes.set(&name).await?;
            if json {
                return print_json(&serde_json::json!({ "theme": name }));
            }
            println!("  {} Theme set to {}", style("✓").green().bold(), style(&name).cyan().bold());
        }
        Some(ThemeCommand::List) => {
            let current = themes.current().await?;
            if json {
                return print_json(&&AVAILABLE_THEMES[..]);
            }
            for name in AVAILABLE_THEMES {
                if name == current {
                    println!("  {} {}", style("●").cyan(), style(name).cyan().bold());
                } else {
                    println!("    {name}");
                }
            }
        }
    }
    Ok(())
}
