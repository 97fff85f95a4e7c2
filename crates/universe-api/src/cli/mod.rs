//! CLI command definitions and dispatch for the `uni` binary.
//!
//! Uses clap derive macros for argument parsing. Commands map onto the
//! screens of the UniVerse web client: feeds, posts, communities,
//! notifications, chat, the admin panel and the theme preference.

pub mod admin;
pub mod auth;
pub mod chat;
pub mod community;
pub mod notify;
pub mod post;
pub mod profile;
pub mod status;
pub mod theme;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use indicatif::{ProgressBar, ProgressStyle};

use crate::state::AppState;

/// UniVerse from the terminal: the campus social network client.
#[derive(Parser)]
#[command(name = "uni", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in with username and password.
    Login {
        /// Username (prompted when omitted).
        username: Option<String>,

        /// Password (prompted when omitted).
        #[arg(long, env = "UNIVERSE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Create an account. Log in afterwards with `uni login`.
    Register {
        username: String,

        #[arg(long)]
        email: String,

        /// Password (prompted with confirmation when omitted).
        #[arg(long, env = "UNIVERSE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// End the session and forget stored credentials.
    Logout,

    /// Show the logged-in user.
    Whoami,

    /// Session, unread counters and configuration overview.
    Status,

    /// Social notifications (follows, reactions, comments).
    Notifications {
        /// Mark all notifications as read.
        #[arg(long)]
        mark_read: bool,
    },

    /// Announcements targeted at you.
    Announcements {
        /// Mark the listed announcements as read.
        #[arg(long)]
        mark_read: bool,
    },

    /// Publish an announcement (requires the announcement badge).
    Announce {
        content: String,

        /// Restrict to one university.
        #[arg(long, default_value = "")]
        university: String,

        /// Restrict to one course.
        #[arg(long, default_value = "")]
        course: String,
    },

    /// Show a feed (global by default).
    Feed {
        /// Posts from people you follow.
        #[arg(long, conflicts_with_all = ["saved", "tag", "community"])]
        following: bool,

        /// Posts you saved.
        #[arg(long, conflicts_with_all = ["tag", "community"])]
        saved: bool,

        /// Posts with a hashtag.
        #[arg(long, conflicts_with = "community")]
        tag: Option<String>,

        /// Posts in a community.
        #[arg(long)]
        community: Option<i64>,
    },

    /// Work with a single post.
    Post {
        #[command(subcommand)]
        action: post::PostCommand,
    },

    /// Communities: browse, join, manage members.
    #[command(alias = "comm")]
    Community {
        #[command(subcommand)]
        action: community::CommunityCommand,
    },

    /// Users and your own profile.
    #[command(alias = "user")]
    Profile {
        #[command(subcommand)]
        action: profile::ProfileCommand,
    },

    /// List your conversations.
    Chats,

    /// Open a realtime conversation by id, or start one with @username.
    Chat {
        /// Conversation id, or `@username` to start a conversation.
        target: String,
    },

    /// Admin panel (requires a staff account or an admin badge).
    Admin {
        #[command(subcommand)]
        action: admin::AdminCommand,
    },

    /// Show or change the theme preference.
    Theme {
        #[command(subcommand)]
        action: Option<theme::ThemeCommand>,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Run one command against the initialized state.
pub async fn dispatch(state: &AppState, command: Commands, json: bool) -> anyhow::Result<()> {
    match command {
        Commands::Login { username, password } => auth::login(state, username, password, json).await,
        Commands::Register {
            username,
            email,
            password,
        } => auth::register(state, &username, &email, password, json).await,
        Commands::Logout => auth::logout(state, json).await,
        Commands::Whoami => auth::whoami(state, json).await,
        Commands::Status => status::status(state, json).await,
        Commands::Notifications { mark_read } => notify::notifications(state, mark_read, json).await,
        Commands::Announcements { mark_read } => notify::announcements(state, mark_read, json).await,
        Commands::Announce {
            content,
            university,
            course,
        } => notify::announce(state, content, university, course, json).await,
        Commands::Feed {
            following,
            saved,
            tag,
            community,
        } => {
            let source = match (following, saved, tag, community) {
                (true, ..) => post::FeedSource::Following,
                (_, true, ..) => post::FeedSource::Saved,
                (_, _, Some(tag), _) => post::FeedSource::Tag(tag),
                (_, _, _, Some(id)) => post::FeedSource::Community(id),
                _ => post::FeedSource::Global,
            };
            post::feed(state, source, json).await
        }
        Commands::Post { action } => post::run(state, action, json).await,
        Commands::Community { action } => community::run(state, action, json).await,
        Commands::Profile { action } => profile::run(state, action, json).await,
        Commands::Chats => chat::list_conversations(state, json).await,
        Commands::Chat { target } => chat::loop_runner::run_chat_loop(state, &target).await,
        Commands::Admin { action } => admin::run(state, action, json).await,
        Commands::Theme { action } => theme::run(state, action, json).await,
        Commands::Completions { .. } => unreachable!("handled in main"),
    }
}

/// A cyan spinner with `message`, hidden in JSON mode.
pub(crate) fn spinner(message: impl Into<String>, json: bool) -> ProgressBar {
    if json {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.into());
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
