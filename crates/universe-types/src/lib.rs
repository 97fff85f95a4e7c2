//! Shared domain types for the UniVerse client.
//!
//! This crate contains the types exchanged with the UniVerse backend and
//! shared between the session, gate, and chat layers: credentials, the user
//! snapshot, chat messages, posts, communities, notifications, admin payloads,
//! and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, chrono, secrecy, url, thiserror.

pub mod admin;
pub mod auth;
pub mod chat;
pub mod community;
pub mod config;
pub mod error;
pub mod notification;
pub mod post;
pub mod session;
pub mod user;
