//! Feeds and post commands.

use anyhow::Result;
use clap::Subcommand;
use console::style;

use universe_core::reaction::ReactionState;
use universe_types::post::{NewPost, Post, REACTION_EMOJIS, is_allowed_reaction};

use crate::state::AppState;

use super::{print_json, spinner};

#[derive(Subcommand)]
pub enum PostCommand {
    /// Show a post with its comments.
    Show { pk: i64 },

    /// Publish a post, optionally inside a community.
    New {
        title: String,
        content: String,

        #[arg(long)]
        community: Option<i64>,
    },

    /// Delete one of your posts.
    Delete { pk: i64 },

    /// Toggle your reaction (tap the same emoji again to remove it).
    React {
        pk: i64,

        #[arg(value_parser = parse_reaction)]
        emoji: String,
    },

    /// Comment on a post.
    Comment { pk: i64, content: String },

    /// Save or unsave a post.
    Save { pk: i64 },
}

fn parse_reaction(s: &str) -> Result<String, String> {
    if is_allowed_reaction(s) {
        Ok(s.to_string())
    } else {
        Err(format!("reaction must be one of {}", REACTION_EMOJIS.join(" ")))
    }
}

pub enum FeedSource {
    Global,
    Following,
    Saved,
    Tag(String),
    Community(i64),
}

pub async fn feed(state: &AppState, source: FeedSource, json: bool) -> Result<()> {
    state.require_login().await?;
    let progress = spinner("Loading feed...", json);
    let result = match &source {
        FeedSource::Global => state.posts.feed().await,
        FeedSource::Following => state.posts.following_feed().await,
        FeedSource::Saved => state.posts.saved_feed().await,
        FeedSource::Tag(tag) => state.posts.tagged(tag).await,
        FeedSource::Community(id) => state.communities.feed(*id).await,
    };
    progress.finish_and_clear();
    let posts = result?;

    if json {
        return print_json(&posts);
    }
    if posts.is_empty() {
        println!("  {} Nothing here yet", style("i").blue().bold());
        return Ok(());
    }
    println!();
    for post in &posts {
        print_post_summary(post);
    }
    Ok(())
}

pub async fn run(state: &AppState, action: PostCommand, json: bool) -> Result<()> {
    let me = state.require_login().await?;
    match action {
        PostCommand::Show { pk } => {
            let post = state.posts.get(pk).await?;
            if json {
                return print_json(&post);
            }
            print_post_detail(&post);
        }
        PostCommand::New {
            title,
            content,
            community,
        } => {
            let new_post = NewPost { title, content };
            let post = match community {
                Some(id) => state.communities.post(id, &new_post).await?,
                None => state.posts.create(&new_post).await?,
            };
            if json {
                return print_json(&post);
            }
            println!("  {} Post #{} published", style("✓").green().bold(), post.pk);
        }
        PostCommand::Delete { pk } => {
            state.posts.delete(pk).await?;
            if json {
                return print_json(&serde_json::json!({ "deleted": pk }));
            }
            println!("  {} Post #{pk} deleted", style("✓").green().bold());
        }
        PostCommand::React { pk, emoji } => {
            let post = state.posts.get(pk).await?;
            let mut reactions = ReactionState::from_post(&post);
            state.posts.react(pk, &mut reactions, &emoji).await?;
            if json {
                return print_json(&serde_json::json!({
                    "post": pk,
                    "reactions_summary": reactions.summary,
                    "current_user_reaction": reactions.mine,
                }));
            }
            match &reactions.mine {
                Some(r) => println!("  {} You reacted {} as {}", style("✓").green().bold(), r.emoji, me),
                None => println!("  {} Reaction removed", style("✓").green().bold()),
            }
            println!("  {}", format_reactions(&reactions));
        }
        PostCommand::Comment { pk, content } => {
            let comment = state.posts.comment(pk, &content).await?;
            if json {
                return print_json(&comment);
            }
            println!("  {} Comment added to post #{pk}", style("✓").green().bold());
        }
        PostCommand::Save { pk } => {
            state.posts.toggle_save(pk).await?;
            // The saved set lives on the profile; refresh it to report the result.
            let user = state.users.refresh_current().await?;
            let saved = user
                .profile
                .as_ref()
                .is_some_and(|p| p.saved_posts.contains(&pk));
            if json {
                return print_json(&serde_json::json!({ "post": pk, "saved": saved }));
            }
            if saved {
                println!("  {} Post #{pk} saved", style("✓").green().bold());
            } else {
                println!("  {} Post #{pk} removed from saved", style("✓").green().bold());
            }
        }
    }
    Ok(())
}

fn format_reactions(reactions: &ReactionState) -> String {
    if reactions.summary.is_empty() {
        return style("no reactions").dim().to_string();
    }
    reactions
        .summary
        .iter()
        .map(|(emoji, count)| {
            let mine = reactions.mine.as_ref().is_some_and(|r| &r.emoji == emoji);
            if mine {
                style(format!("{emoji} {count}")).bold().to_string()
            } else {
                format!("{emoji} {count}")
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

pub(crate) fn print_post_summary(post: &Post) {
    println!(
        "  {} {} {}",
        style(format!("#{}", post.pk)).dim(),
        style(&post.title).bold(),
        style(format!("by {}", post.owner)).cyan()
    );
    let preview: String = post.content.chars().take(120).collect();
    println!("     {preview}");
    println!(
        "     {}  ·  {} comments  ·  {}",
        format_reactions(&ReactionState::from_post(post)),
        post.comments.len(),
        style(post.created_at.format("%Y-%m-%d %H:%M")).dim()
    );
    println!();
}

fn print_post_detail(post: &Post) {
    println!();
    println!("  {}", style(&post.title).bold());
    let badges: Vec<String> = post.owner_badges.iter().map(|b| format!("{} {}", b.icon, b.name)).collect();
    println!(
        "  {} {}  {}",
        style(&post.owner).cyan().bold(),
        style(badges.join(" ")).magenta(),
        style(post.created_at.format("%Y-%m-%d %H:%M")).dim()
    );
    println!();
    for line in post.content.lines() {
        println!("  {line}");
    }
    if !post.tags.is_empty() {
        let tags: Vec<String> = post.tags.iter().map(|t| format!("#{}", t.name)).collect();
        println!();
        println!("  {}", style(tags.join(" ")).blue());
    }
    for attachment in [&post.image, &post.video, &post.attachment].into_iter().flatten() {
        println!("  {} {}", style("↳").dim(), style(attachment).underlined());
    }
    println!();
    println!("  {}", format_reactions(&ReactionState::from_post(post)));

    if !post.comments.is_empty() {
        println!();
        println!("  {}", style("── Comments ──").dim());
        for comment in &post.comments {
            println!(
                "  {} {}  {}",
                style(&comment.user).bold(),
                comment.content,
                style(comment.created_at.format("%Y-%m-%d %H:%M")).dim()
            );
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reaction_parser_accepts_only_known_emojis() {
        assert_eq!(parse_reaction("❤️").unwrap(), "❤️");
        assert!(parse_reaction("🍕").unwrap_err().contains("👍"));
    }
}
