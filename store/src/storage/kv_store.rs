//! Typed JSON adapter over a [`KvBackend`]
//!
//! Reads and writes never fail from the caller's point of view. Corrupt
//! documents, serialization failures and backend errors are logged and
//! surface as `None` / `false`. A store without a medium
//! ([`KvStore::detached`]) turns every call into such a no-op, and
//! [`KvStore::is_available`] lets callers tell the two situations apart.
//!
//! Collections are read record by record through [`KvStore::get_records`],
//! so one malformed record costs only itself.

use super::backend::KvBackend;
use super::memory::MemoryBackend;
use super::sqlite::SqliteBackend;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct KvStore {
    backend: Option<Arc<dyn KvBackend>>,
}

impl KvStore {
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// Store backed by the SQLite `kv_store` table
    pub fn sqlite(pool: SqlitePool) -> Self {
        Self::new(Arc::new(SqliteBackend::new(pool)))
    }

    /// Store backed by a fresh in-process map
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    /// Store with no persistence medium at all
    pub fn detached() -> Self {
        Self { backend: None }
    }

    /// Whether writes can reach a persistence medium
    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    /// Read and deserialize the document under `key`.
    pub async fn get<T: DeserializeOwned>(&self, key: impl AsRef<str>) -> Option<T> {
        let key = key.as_ref();
        let backend = self.backend.as_ref()?;

        let raw = match backend.read(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::error!("Error reading from storage ({}): {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!("Corrupt document in storage ({}): {}", key, e);
                None
            }
        }
    }

    /// Serialize `value` and store it under `key`. Returns `false` on any failure.
    pub async fn set<T: Serialize + ?Sized>(&self, key: impl AsRef<str>, value: &T) -> bool {
        let key = key.as_ref();
        let Some(backend) = self.backend.as_ref() else {
            return false;
        };

        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Error serializing value for storage ({}): {}", key, e);
                return false;
            }
        };

        match backend.write(key, &json).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Error writing to storage ({}) via {}: {}", key, backend.name(), e);
                false
            }
        }
    }

    /// Read the JSON array under `key` and decode each element on its own.
    ///
    /// Elements that do not decode as `T` are logged and dropped; a missing
    /// or non-array document reads as empty.
    pub async fn get_records<T: DeserializeOwned>(&self, key: impl AsRef<str>) -> Vec<T> {
        let key = key.as_ref();
        match self.get::<Vec<Value>>(key).await {
            Some(values) => decode_records(key, values),
            None => Vec::new(),
        }
    }

    /// Remove the document under `key`. Returns `false` on any failure.
    pub async fn remove(&self, key: impl AsRef<str>) -> bool {
        let key = key.as_ref();
        let Some(backend) = self.backend.as_ref() else {
            return false;
        };

        match backend.delete(key).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Error removing from storage ({}): {}", key, e);
                false
            }
        }
    }
}

/// Decode each value as `T`, skipping the ones that do not fit
pub fn decode_records<T: DeserializeOwned>(context: &str, values: Vec<Value>) -> Vec<T> {
    let total = values.len();
    let records: Vec<T> = values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping malformed record {} in {}: {}", index, context, e);
                None
            }
        })
        .collect();

    if records.len() < total {
        tracing::warn!(
            "Decoded {} of {} records in {}",
            records.len(),
            total,
            context
        );
    }
    records
}
