//! Storage module
//!
//! Key-value persistence for every store collection. A [`KvBackend`] moves
//! raw JSON text in and out of a medium; [`KvStore`] layers typed
//! (de)serialization on top and degrades every failure to an absent value
//! or a `false` status.

pub mod backend;
pub mod keys;
pub mod kv_store;
pub mod memory;
pub mod sqlite;

pub use backend::KvBackend;
pub use keys::StorageKey;
pub use kv_store::{decode_records, KvStore};
pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;
