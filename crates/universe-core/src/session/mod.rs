//! Session lifecycle: credentials, the user snapshot and notification
//! counters, held in one place and persisted through a `KvStore`.

pub mod manager;
pub mod store;
pub mod token;

pub use manager::{LoginOutcome, RegisterOutcome, SessionManager, SessionView};
pub use store::SessionStore;
