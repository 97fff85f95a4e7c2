//! Other users and your own profile.

use anyhow::Result;
use clap::{Args, Subcommand};
use console::style;
use dialoguer::{Confirm, Input};

use universe_types::user::{AccountUpdate, ProfileUpdate, UserSnapshot};

use crate::state::AppState;

use super::print_json;

#[derive(Subcommand)]
pub enum ProfileCommand {
    /// Show a user's profile.
    Show { username: String },

    /// Search users by name.
    Search { query: String },

    /// Follow a user, or unfollow if already following.
    Follow { username: String },

    /// Update your profile.
    Update(ProfileFields),

    /// Finish the first-login profile setup.
    Onboarding(ProfileFields),

    /// Change your name, username or email.
    Account(AccountFields),

    /// Permanently delete your account and log out.
    DeleteAccount {
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args)]
pub struct AccountFields {
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    username: Option<String>,
    #[arg(long)]
    email: Option<String>,
}

impl From<AccountFields> for AccountUpdate {
    fn from(fields: AccountFields) -> Self {
        AccountUpdate {
            first_name: fields.first_name,
            last_name: fields.last_name,
            username: fields.username,
            email: fields.email,
        }
    }
}

#[derive(Args)]
pub struct ProfileFields {
    #[arg(long)]
    bio: Option<String>,
    #[arg(long)]
    pronouns: Option<String>,
    #[arg(long)]
    universidade: Option<String>,
    #[arg(long)]
    curso: Option<String>,
    #[arg(long)]
    atletica: Option<String>,
    #[arg(long)]
    ano_inicio: Option<i32>,
}

impl From<ProfileFields> for ProfileUpdate {
    fn from(fields: ProfileFields) -> Self {
        ProfileUpdate {
            bio: fields.bio,
            pronouns: fields.pronouns,
            universidade: fields.universidade,
            curso: fields.curso,
            atletica: fields.atletica,
            ano_inicio: fields.ano_inicio,
            onboarding_complete: None,
        }
    }
}

pub async fn run(state: &AppState, action: ProfileCommand, json: bool) -> Result<()> {
    let me = state.require_login().await?;
    match action {
        ProfileCommand::Show { username } => {
            let user = state.users.get(&username).await?;
            if json {
                return print_json(&user);
            }
            print_profile(&user);
        }
        ProfileCommand::Search { query } => {
            let results = state.users.search(&query).await?;
            if json {
                return print_json(&results);
            }
            if results.is_empty() {
                println!("  {} No users match '{}'", style("i").blue().bold(), query);
            }
            for r in &results {
                println!("  {}", style(&r.username).cyan());
            }
        }
        ProfileCommand::Follow { username } => {
            if username == me {
                anyhow::bail!("You cannot follow yourself.");
            }
            state.users.toggle_follow(&username).await?;
            let user = state.users.get(&username).await?;
            let following = user.profile.as_ref().is_some_and(|p| p.is_following);
            if json {
                return print_json(&serde_json::json!({ "username": username, "following": following }));
            }
            if following {
                println!("  {} Following {}", style("✓").green().bold(), style(&username).cyan());
            } else {
                println!("  {} Unfollowed {}", style("✓").green().bold(), style(&username).cyan());
            }
        }
        ProfileCommand::Update(fields) => {
            let user = state.users.update_profile(&fields.into()).await?;
            if json {
                return print_json(&user);
            }
            println!("  {} Profile updated", style("✓").green().bold());
        }
        ProfileCommand::Onboarding(fields) => {
            let mut update = ProfileUpdate::from(fields);
            if update.universidade.is_none() {
                update.universidade = Some(Input::new().with_prompt("Universidade").interact_text()?);
            }
            if update.curso.is_none() {
                update.curso = Some(Input::new().with_prompt("Curso").interact_text()?);
            }
            let user = state.users.complete_onboarding(update).await?;
            if json {
                return print_json(&user);
            }
            println!(
                "  {} Welcome to UniVerse, {}!",
                style("✓").green().bold(),
                style(&user.username).cyan().bold()
            );
        }
        ProfileCommand::Account(fields) => {
            let update = AccountUpdate::from(fields);
            if update.is_empty() {
                anyhow::bail!("Nothing to change. Pass --first-name, --last-name, --username or --email.");
            }
            let user = state.users.update_account(&update).await?;
            if json {
                return print_json(&user);
            }
            println!(
                "  {} Account updated ({})",
                style("✓").green().bold(),
                style(&user.username).cyan()
            );
        }
        ProfileCommand::DeleteAccount { yes } => {
            let confirmed = yes
                || Confirm::new()
                    .with_prompt(format!("Delete the account '{me}'? This cannot be undone"))
                    .default(false)
                    .interact()?;
            if !confirmed {
                println!("  {} Cancelled", style("i").blue().bold());
                return Ok(());
            }
            state.users.delete_account().await?;
            if json {
                return print_json(&serde_json::json!({ "deleted": me }));
            }
            println!("  {} Account deleted", style("✓").green().bold());
        }
    }
    Ok(())
}

fn print_profile(user: &UserSnapshot) {
    println!();
    println!("  {}", style(&user.username).cyan().bold());
    let Some(profile) = &user.profile else {
        println!();
        return;
    };
    if !profile.pronouns.is_empty() {
        println!("  {}", style(&profile.pronouns).dim());
    }
    if !profile.bio.is_empty() {
        println!("  {}", profile.bio);
    }
    let school: Vec<&str> = [profile.universidade.as_str(), profile.curso.as_str(), profile.atletica.as_str()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect();
    if !school.is_empty() {
        println!("  {}", school.join(" · "));
    }
    println!(
        "  {} followers · {} following{}",
        style(profile.followers_count).bold(),
        style(profile.following_count).bold(),
        if profile.is_following {
            format!("  {}", style("(you follow)").green())
        } else {
            String::new()
        }
    );
    for badge in &profile.badges {
        println!("  {} {}", badge.icon, style(&badge.name).magenta());
    }
    println!();
}
