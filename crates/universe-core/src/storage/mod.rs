//! Storage abstractions for the persisted session record.
//!
//! Defines the key-value store port. File and keychain implementations live
//! in universe-infra; an in-memory store lives here for tests and ephemeral
//! sessions.

pub mod kv_store;
pub mod memory;

pub use kv_store::KvStore;
pub use memory::MemoryKvStore;
