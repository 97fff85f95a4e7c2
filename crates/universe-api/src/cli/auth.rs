//! Login, registration, logout and whoami.

use anyhow::Result;
use console::style;
use dialoguer::{Input, Password};

use universe_core::capability::capabilities;
use universe_types::error::SessionError;

use crate::state::AppState;

use super::{print_json, spinner};

/// Log in, prompting for whatever was not given on the command line.
pub async fn login(
    state: &AppState,
    username: Option<String>,
    password: Option<String>,
    json: bool,
) -> Result<()> {
    let username = match username {
        Some(u) => u,
        None => Input::<String>::new().with_prompt("Username").interact_text()?,
    };
    let password = match password {
        Some(p) => p,
        None => Password::new()
            .with_prompt(format!("Password for {}", style(&username).bold()))
            .interact()?,
    };

    let progress = spinner("Logging in...", json);
    let result = state.session.login(&username, &password).await;
    progress.finish_and_clear();
    let outcome = match result {
        Ok(outcome) => outcome,
        Err(SessionError::InvalidCredentials) => {
            anyhow::bail!("Invalid username or password.")
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        return print_json(&serde_json::json!({
            "logged_in": true,
            "username": outcome.user.username,
            "onboarding_required": outcome.onboarding_required,
            "degraded": outcome.degraded,
        }));
    }

    println!(
        "  {} Logged in as {}",
        style("✓").green().bold(),
        style(&outcome.user.username).cyan().bold()
    );
    if outcome.degraded {
        println!(
            "  {} Profile could not be loaded; showing limited information.",
            style("!").yellow().bold()
        );
    }
    if outcome.onboarding_required {
        println!(
            "  {} Finish setting up your profile with {}",
            style("i").blue().bold(),
            style("uni profile onboarding").yellow()
        );
    }
    Ok(())
}

/// Create an account. Does not log in.
pub async fn register(
    state: &AppState,
    username: &str,
    email: &str,
    password: Option<String>,
    json: bool,
) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => Password::new()
            .with_prompt("Choose a password")
            .with_confirmation("Confirm password", "Passwords do not match")
            .interact()?,
    };

    match state.session.register(username, email, &password).await {
        Ok(_) => {}
        Err(SessionError::Validation(errors)) => {
            if json {
                return print_json(&serde_json::json!({ "registered": false, "errors": errors.0 }));
            }
            println!("  {} Registration rejected:", style("✗").red().bold());
            for (field, messages) in &errors.0 {
                for message in messages {
                    println!("    {} {}", style(format!("{field}:")).bold(), message);
                }
            }
            anyhow::bail!("registration rejected");
        }
        Err(e) => return Err(e.into()),
    }

    if json {
        return print_json(&serde_json::json!({ "registered": true, "username": username }));
    }
    println!(
        "  {} Account {} created. Log in with {}",
        style("✓").green().bold(),
        style(username).cyan().bold(),
        style(format!("uni login {username}")).yellow()
    );
    Ok(())
}

pub async fn logout(state: &AppState, json: bool) -> Result<()> {
    let was_logged_in = state.session.is_authenticated().await;
    state.session.logout().await;

    if json {
        return print_json(&serde_json::json!({ "logged_out": true }));
    }
    if was_logged_in {
        println!("  {} Logged out", style("✓").green().bold());
    } else {
        println!("  {} No active session", style("i").blue().bold());
    }
    Ok(())
}

pub async fn whoami(state: &AppState, json: bool) -> Result<()> {
    let Some(user) = state.session.user().await else {
        if json {
            return print_json(&serde_json::json!({ "authenticated": false }));
        }
        println!("  {} Not logged in", style("i").blue().bold());
        return Ok(());
    };

    if json {
        return print_json(&user);
    }

    println!();
    println!("  {}", style(&user.username).cyan().bold());
    if let Some(email) = &user.email {
        println!("  {}", style(email).dim());
    }
    if let Some(profile) = &user.profile {
        if !profile.universidade.is_empty() || !profile.curso.is_empty() {
            println!("  {} · {}", profile.universidade, profile.curso);
        }
        println!(
            "  {} followers · {} following",
            style(profile.followers_count).bold(),
            style(profile.following_count).bold()
        );
    } else {
        println!("  {}", style("(profile not loaded)").dim());
    }
    for badge in user.badges() {
        println!("  {} {}", badge.icon, style(&badge.name).magenta());
    }
    let caps = capabilities(&user);
    if !caps.is_empty() {
        let names: Vec<String> = caps.iter().map(ToString::to_string).collect();
        println!("  {} {}", style("Capabilities:").bold(), names.join(", "));
    }
    println!();
    Ok(())
}
