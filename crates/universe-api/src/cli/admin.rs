//! Admin panel: users, badges and post moderation.

use anyhow::Result;
use clap::{Args, Subcommand};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::Confirm;

use universe_types::admin::{AdminUserUpdate, BADGE_COLORS, BadgeDraft};
use universe_types::user::Badge;

use crate::state::AppState;

use super::post::print_post_summary;
use super::{print_json, spinner};

#[derive(Subcommand)]
pub enum AdminCommand {
    /// List every user with their staff flag and badges.
    Users,

    /// Set a user's staff flag or badges.
    EditUser {
        id: i64,

        #[arg(long)]
        staff: Option<bool>,

        /// Full badge set, comma separated ids (empty to remove all).
        #[arg(long, value_delimiter = ',', num_args = 0..)]
        badges: Option<Vec<i64>>,
    },

    /// List badges and the permissions they grant.
    Badges,

    /// Create a badge.
    BadgeCreate(BadgeFields),

    /// Replace a badge's name, icon, color and permissions.
    BadgeEdit {
        id: i64,

        #[command(flatten)]
        fields: BadgeFields,
    },

    /// Delete a badge.
    BadgeDelete {
        id: i64,

        #[arg(long)]
        yes: bool,
    },

    /// List every post on the platform.
    Posts,

    /// Remove any user's post.
    DeletePost {
        pk: i64,

        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args)]
pub struct BadgeFields {
    name: String,

    #[arg(long, default_value = "")]
    icon: String,

    #[arg(long, default_value = "default", value_parser = parse_color)]
    color: String,

    #[arg(long)]
    admin_panel: bool,

    #[arg(long)]
    announcements: bool,

    #[arg(long)]
    moderate_posts: bool,
}

fn parse_color(s: &str) -> Result<String, String> {
    if BADGE_COLORS.contains(&s) {
        Ok(s.to_string())
    } else {
        Err(format!("color must be one of {}", BADGE_COLORS.join(", ")))
    }
}

impl From<BadgeFields> for BadgeDraft {
    fn from(fields: BadgeFields) -> Self {
        BadgeDraft {
            name: fields.name,
            icon: fields.icon,
            color: fields.color,
            can_access_admin_panel: fields.admin_panel,
            can_send_announcement: fields.announcements,
            can_moderate_global_posts: fields.moderate_posts,
        }
    }
}

pub async fn run(state: &AppState, action: AdminCommand, json: bool) -> Result<()> {
    state.require_login().await?;
    match action {
        AdminCommand::Users => {
            let progress = spinner("Loading users...", json);
            let result = state.admin.users().await;
            progress.finish_and_clear();
            let users = result?;
            if json {
                return print_json(&users);
            }

            let mut table = Table::new();
            table.load_preset(presets::UTF8_FULL_CONDENSED);
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec![
                Cell::new("ID").fg(Color::White),
                Cell::new("Username").fg(Color::White),
                Cell::new("Email").fg(Color::White),
                Cell::new("Staff").fg(Color::White),
                Cell::new("Badges").fg(Color::White),
            ]);
            for user in &users {
                let badges: Vec<String> = user
                    .badges()
                    .iter()
                    .map(|b| format!("{} {}", b.icon, b.name).trim().to_string())
                    .collect();
                table.add_row(vec![
                    Cell::new(user.id.map(|id| id.to_string()).unwrap_or_default()).fg(Color::DarkGrey),
                    Cell::new(&user.username).fg(Color::Cyan),
                    Cell::new(user.email.as_deref().unwrap_or_default()),
                    Cell::new(if user.is_staff { "yes" } else { "" }).fg(Color::Yellow),
                    Cell::new(badges.join(", ")),
                ]);
            }
            println!();
            println!("{table}");
            println!();
        }
        AdminCommand::EditUser { id, staff, badges } => {
            if staff.is_none() && badges.is_none() {
                anyhow::bail!("Nothing to change. Pass --staff or --badges.");
            }
            let update = AdminUserUpdate {
                is_staff: staff,
                badge_ids: badges,
            };
            let user = state.admin.update_user(id, &update).await?;
            if json {
                return print_json(&user);
            }
            println!("  {} Updated {}", style("✓").green().bold(), style(&user.username).cyan());
        }
        AdminCommand::Badges => {
            let badges = state.admin.managed_badges().await?;
            if json {
                return print_json(&badges);
            }
            print_badges(&badges);
        }
        AdminCommand::BadgeCreate(fields) => {
            let badge = state.admin.create_badge(&fields.into()).await?;
            if json {
                return print_json(&badge);
            }
            println!("  {} Badge {} {} created", style("✓").green().bold(), badge.icon, style(&badge.name).magenta());
        }
        AdminCommand::BadgeEdit { id, fields } => {
            let badge = state.admin.update_badge(id, &fields.into()).await?;
            if json {
                return print_json(&badge);
            }
            println!("  {} Badge {} {} saved", style("✓").green().bold(), badge.icon, style(&badge.name).magenta());
        }
        AdminCommand::BadgeDelete { id, yes } => {
            if !yes && !confirm(&format!("Delete badge #{id}? Users holding it lose its permissions"))? {
                println!("  {} Cancelled", style("i").blue().bold());
                return Ok(());
            }
            state.admin.delete_badge(id).await?;
            if json {
                return print_json(&serde_json::json!({ "deleted_badge": id }));
            }
            println!("  {} Badge #{id} deleted", style("✓").green().bold());
        }
        AdminCommand::Posts => {
            let progress = spinner("Loading posts...", json);
            let result = state.admin.posts().await;
            progress.finish_and_clear();
            let posts = result?;
            if json {
                return print_json(&posts);
            }
            if posts.is_empty() {
                println!("  {} No posts on the platform", style("i").blue().bold());
                return Ok(());
            }
            println!();
            for post in &posts {
                print_post_summary(post);
            }
        }
        AdminCommand::DeletePost { pk, yes } => {
            if !yes && !confirm(&format!("Remove post #{pk}?"))? {
                println!("  {} Cancelled", style("i").blue().bold());
                return Ok(());
            }
            state.admin.delete_post(pk).await?;
            if json {
                return print_json(&serde_json::json!({ "deleted": pk }));
            }
            println!("  {} Post #{pk} removed", style("✓").green().bold());
        }
    }
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    Ok(Confirm::new().with_prompt(prompt).default(false).interact()?)
}

fn print_badges(badges: &[Badge]) {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("ID").fg(Color::White),
        Cell::new("Badge").fg(Color::White),
        Cell::new("Color").fg(Color::White),
        Cell::new("Permissions").fg(Color::White),
    ]);
    for badge in badges {
        let p = &badge.permissions;
        let granted: Vec<&str> = [
            (p.can_access_admin_panel, "admin panel"),
            (p.can_send_announcement, "announcements"),
            (p.can_moderate_global_posts, "moderation"),
        ]
        .into_iter()
        .filter_map(|(on, name)| on.then_some(name))
        .collect();
        table.add_row(vec![
            Cell::new(badge.id.map(|id| id.to_string()).unwrap_or_default()).fg(Color::DarkGrey),
            Cell::new(format!("{} {}", badge.icon, badge.name)).fg(Color::Magenta),
            Cell::new(&badge.color),
            Cell::new(granted.join(", ")),
        ]);
    }
    println!();
    println!("{table}");
    println!();
}
