//! Community commands.

use anyhow::Result;
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use universe_types::community::{Community, MembershipStatus, NewCommunity, Privacy};

use crate::state::AppState;

use super::print_json;

#[derive(Subcommand)]
pub enum CommunityCommand {
    /// List communities, optionally only those for a course.
    #[command(alias = "ls")]
    List {
        #[arg(long)]
        course: Option<String>,
    },

    /// Show one community.
    Show { id: i64 },

    /// Create a community. You become its admin.
    Create {
        name: String,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long)]
        private: bool,

        #[arg(long, default_value = "")]
        course: String,
    },

    /// Join a public community or request to join a private one.
    Join { id: i64 },

    /// Members and pending requests (community admins).
    Members { id: i64 },

    /// Approve a pending membership request.
    Approve { membership: i64 },

    /// Remove a member or reject a request.
    Remove { membership: i64 },
}

pub async fn run(state: &AppState, action: CommunityCommand, json: bool) -> Result<()> {
    state.require_login().await?;
    match action {
        CommunityCommand::List { course } => {
            let communities = match course {
                Some(course) => state.communities.find_by_course(&course).await?,
                None => state.communities.list().await?,
            };
            if json {
                return print_json(&communities);
            }
            print_table(&communities);
        }
        CommunityCommand::Show { id } => {
            let community = state.communities.get(id).await?;
            if json {
                return print_json(&community);
            }
            println!();
            println!("  {} {}", style(&community.name).cyan().bold(), style(format!("({})", community.privacy)).dim());
            if !community.description.is_empty() {
                println!("  {}", community.description);
            }
            println!("  Admin:      {}", style(&community.admin).bold());
            if !community.related_course.is_empty() {
                println!("  Course:     {}", community.related_course);
            }
            println!("  Membership: {}", style_status(community.membership_status));
            println!();
        }
        CommunityCommand::Create {
            name,
            description,
            private,
            course,
        } => {
            let privacy = if private { Privacy::Private } else { Privacy::Public };
            let community = state
                .communities
                .create(&NewCommunity {
                    name,
                    description,
                    privacy,
                    related_course: course,
                })
                .await?;
            if json {
                return print_json(&community);
            }
            println!(
                "  {} Community {} created (#{})",
                style("✓").green().bold(),
                style(&community.name).cyan().bold(),
                community.id
            );
        }
        CommunityCommand::Join { id } => {
            state.communities.join(id).await?;
            let community = state.communities.get(id).await?;
            if json {
                return print_json(&serde_json::json!({
                    "community": id,
                    "membership_status": community.membership_status,
                }));
            }
            match community.membership_status {
                MembershipStatus::Pending => println!(
                    "  {} Request to join {} sent; waiting for approval",
                    style("✓").green().bold(),
                    style(&community.name).cyan()
                ),
                _ => println!(
                    "  {} Joined {}",
                    style("✓").green().bold(),
                    style(&community.name).cyan()
                ),
            }
        }
        CommunityCommand::Members { id } => {
            let members = state.communities.members(id).await?;
            if json {
                return print_json(&members);
            }
            let mut table = Table::new();
            table.load_preset(presets::UTF8_FULL_CONDENSED);
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec![
                Cell::new("Membership").fg(Color::White),
                Cell::new("User").fg(Color::White),
                Cell::new("Status").fg(Color::White),
                Cell::new("Since").fg(Color::White),
            ]);
            for m in &members {
                let user = m
                    .user
                    .get("username")
                    .and_then(|u| u.as_str())
                    .or_else(|| m.user.as_str())
                    .unwrap_or("?")
                    .to_string();
                let status_color = if m.status == "pending" { Color::Yellow } else { Color::Green };
                table.add_row(vec![
                    Cell::new(m.id),
                    Cell::new(user).fg(Color::Cyan),
                    Cell::new(&m.status).fg(status_color),
                    Cell::new(
                        m.date_joined
                            .map(|d| d.format("%Y-%m-%d").to_string())
                            .unwrap_or_default(),
                    )
                    .fg(Color::DarkGrey),
                ]);
            }
            println!();
            println!("{table}");
            println!();
        }
        CommunityCommand::Approve { membership } => {
            state.communities.approve(membership).await?;
            if json {
                return print_json(&serde_json::json!({ "approved": membership }));
            }
            println!("  {} Membership #{membership} approved", style("✓").green().bold());
        }
        CommunityCommand::Remove { membership } => {
            state.communities.remove(membership).await?;
            if json {
                return print_json(&serde_json::json!({ "removed": membership }));
            }
            println!("  {} Membership #{membership} removed", style("✓").green().bold());
        }
    }
    Ok(())
}

fn style_status(status: MembershipStatus) -> console::StyledObject<String> {
    let text = status.to_string();
    match status {
        MembershipStatus::Admin => style(text).magenta().bold(),
        MembershipStatus::Member => style(text).green(),
        MembershipStatus::Pending => style(text).yellow(),
        MembershipStatus::None => style(text).dim(),
    }
}

fn print_table(communities: &[Community]) {
    if communities.is_empty() {
        println!();
        println!(
            "  {} No communities found. Create one with: {}",
            style("i").blue().bold(),
            style("uni community create <name>").yellow()
        );
        println!();
        return;
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("ID").fg(Color::White),
        Cell::new("Name").fg(Color::White),
        Cell::new("Privacy").fg(Color::White),
        Cell::new("Course").fg(Color::White),
        Cell::new("You").fg(Color::White),
    ]);
    for c in communities {
        let privacy_color = match c.privacy {
            Privacy::Public => Color::Green,
            Privacy::Private => Color::Yellow,
        };
        table.add_row(vec![
            Cell::new(c.id).fg(Color::DarkGrey),
            Cell::new(&c.name).fg(Color::Cyan),
            Cell::new(c.privacy.to_string()).fg(privacy_color),
            Cell::new(&c.related_course),
            Cell::new(c.membership_status.to_string()),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} communit{}",
        style(communities.len()).bold(),
        if communities.len() == 1 { "y" } else { "ies" }
    );
    println!();
}
