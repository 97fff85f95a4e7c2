//! Event bus for session lifecycle and chat channel events.
//!
//! Provides an `EventBus` that distributes events to all subscribers via a
//! `tokio::sync::broadcast` channel.

pub mod bus;

pub use bus::EventBus;
