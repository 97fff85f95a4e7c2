//! Notifications and announcements.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use universe_core::capability::has_capability;
use universe_types::notification::NewAnnouncement;
use universe_types::user::Capability;

use crate::state::AppState;

use super::{print_json, spinner};

pub async fn notifications(state: &AppState, mark_read: bool, json: bool) -> Result<()> {
    state.require_login().await?;
    let progress = spinner("Loading notifications...", json);
    let result = state.notifications.notifications().await;
    progress.finish_and_clear();
    let items = result?;

    if mark_read && items.iter().any(|n| !n.read) {
        state.notifications.mark_notifications_read().await?;
    }

    if json {
        return print_json(&items);
    }
    if items.is_empty() {
        println!("  {} No notifications", style("i").blue().bold());
        return Ok(());
    }

    println!();
    for n in &items {
        let marker = if n.read { style("·").dim() } else { style("●").cyan() };
        let target = n
            .post_title
            .as_deref()
            .or(n.community_name.as_deref())
            .map(|t| format!(" {}", style(t).italic()))
            .unwrap_or_default();
        println!(
            "  {} {} {}{}  {}",
            marker,
            style(&n.sender_username).bold(),
            n.verb,
            target,
            style(n.timestamp.format("%Y-%m-%d %H:%M")).dim()
        );
    }
    println!();
    if mark_read {
        println!("  {} Marked as read", style("✓").green().bold());
    }
    Ok(())
}

pub async fn announcements(state: &AppState, mark_read: bool, json: bool) -> Result<()> {
    state.require_login().await?;
    let me = state.session.user().await.and_then(|u| u.id);
    let items = state.notifications.announcements().await?;

    let unread: Vec<i64> = items
        .iter()
        .filter(|a| me.is_none_or(|id| !a.is_read_by(id)))
        .map(|a| a.id)
        .collect();
    if mark_read {
        state.notifications.mark_announcements_read(&unread).await?;
    }

    if json {
        return print_json(&items);
    }
    if items.is_empty() {
        println!("  {} No announcements", style("i").blue().bold());
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("").fg(Color::White),
        Cell::new("From").fg(Color::White),
        Cell::new("Announcement").fg(Color::White),
        Cell::new("Audience").fg(Color::White),
        Cell::new("Date").fg(Color::White),
    ]);
    for a in &items {
        let audience = match (a.target_university.as_str(), a.target_course.as_str()) {
            ("", "") => "everyone".to_string(),
            (u, "") => u.to_string(),
            ("", c) => c.to_string(),
            (u, c) => format!("{u} / {c}"),
        };
        let marker = if unread.contains(&a.id) { "●" } else { "" };
        table.add_row(vec![
            Cell::new(marker).fg(Color::Cyan),
            Cell::new(&a.author).fg(Color::Cyan),
            Cell::new(&a.content),
            Cell::new(audience),
            Cell::new(a.timestamp.format("%Y-%m-%d").to_string()).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    if mark_read && !unread.is_empty() {
        println!("  {} {} marked as read", style("✓").green().bold(), unread.len());
    }
    Ok(())
}

/// Publish an announcement. Checked locally first so users without the
/// badge get a clear message instead of a 403.
pub async fn announce(
    state: &AppState,
    content: String,
    university: String,
    course: String,
    json: bool,
) -> Result<()> {
    let Some(user) = state.session.user().await else {
        anyhow::bail!("Not logged in. Run `uni login` first.");
    };
    if !has_capability(&user, Capability::SendAnnouncement) {
        anyhow::bail!("You do not have permission to send announcements.");
    }

    let created = state
        .notifications
        .create_announcement(&NewAnnouncement {
            content,
            target_university: university,
            target_course: course,
        })
        .await?;

    if json {
        return print_json(&created);
    }
    println!("  {} Announcement #{} published", style("✓").green().bold(), created.id);
    Ok(())
}
