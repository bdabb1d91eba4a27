//! Key-value persistence adapters.
//!
//! Everything the engine persists lives under a handful of string keys, each
//! holding one text document. Adapters give at-least-once durability per call
//! and nothing more: no transactions and no atomicity across keys. The record
//! store builds its consistency guarantees on top of that.

use std::{future::Future, io};

pub use file::FileStore;
pub use memory::MemoryStore;

mod file;
mod memory;

/// Key holding the serialized transaction collection.
pub const TRANSACTIONS_KEY: &str = "transactions";
/// Key holding the registered credential records.
pub const USERS_KEY: &str = "users";
/// Key holding the email of the signed-in user.
pub const SESSION_KEY: &str = "session";

/// Durable string-keyed text storage.
///
/// Removing a key that does not exist is not an error.
pub trait KeyValueStore: Send + Sync + 'static {
    fn get(&self, key: &str) -> impl Future<Output = io::Result<Option<String>>> + Send;

    fn set(&self, key: &str, value: String) -> impl Future<Output = io::Result<()>> + Send;

    fn remove(&self, key: &str) -> impl Future<Output = io::Result<()>> + Send;
}
