//! Session and configuration overview.

use anyhow::Result;
use console::style;

use crate::state::AppState;

use super::spinner;

/// Display session state, unread counters, backend reachability and where
/// the client points.
///
/// Refreshes the unread counters when logged in; a failed refresh falls back
/// to the last known values.
pub async fn status(state: &AppState, json: bool) -> Result<()> {
    let progress = spinner("Checking backend...", json);
    let server = state.server.check().await;
    progress.finish_and_clear();

    if state.session.is_authenticated().await {
        if let Err(e) = state.notifications.refresh_counters().await {
            tracing::warn!(error = %e, "could not refresh unread counters");
        }
    }
    let view = state.session.view().await;
    let theme = state.themes().current().await?;

    if json {
        let status = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "authenticated": view.authenticated,
            "username": view.user.as_ref().map(|u| u.username.clone()),
            "unread": {
                "announcements": view.counters.announcements,
                "social": view.counters.social,
            },
            "server": server,
            "api_base_url": state.config.api_base_url.as_str(),
            "ws_base_url": state.config.websocket_base().as_str(),
            "storage": state.config.storage.backend.to_string(),
            "data_dir": state.data_dir.display().to_string(),
            "theme": theme,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!();
    println!("  {} UniVerse v{}", style("◆").cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!();

    println!("  {}", style("── Session ──").dim());
    match &view.user {
        Some(user) => println!("  User:     {}", style(&user.username).cyan().bold()),
        None => println!("  User:     {}", style("not logged in").yellow()),
    }
    if view.authenticated {
        println!(
            "  Unread:   {} announcements, {} notifications",
            style(view.counters.announcements).bold(),
            style(view.counters.social).bold()
        );
    }
    println!();

    println!("  {}", style("── Backend ──").dim());
    if server.online {
        println!(
            "  Server:   {} {}",
            style("online").green(),
            style(format!("({} ms)", server.latency.as_millis())).dim()
        );
    } else {
        println!(
            "  Server:   {} {}",
            style("offline").red(),
            style(server.error.as_deref().unwrap_or_default()).dim()
        );
    }
    println!("  API:      {}", style(&state.config.api_base_url).dim());
    println!("  Realtime: {}", style(state.config.websocket_base()).dim());
    println!();

    println!("  {}", style("── System ──").dim());
    println!("  Data dir: {}", style(state.data_dir.display()).dim());
    println!("  Storage:  {}", style(state.config.storage.backend).dim());
    println!("  Theme:    {}", style(theme).dim());
    println!();

    Ok(())
}
