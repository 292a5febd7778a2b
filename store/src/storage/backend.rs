//! Backend contract for the key-value store

use crate::error::Result;
use async_trait::async_trait;

/// A persistence medium holding one JSON document per key.
///
/// Implementations report failures through [`Result`]; turning those into
/// absent values is the job of [`super::KvStore`].
#[async_trait]
pub trait KvBackend: Send + Sync {
    /// Read the raw text stored under `key`, if any
    async fn read(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    async fn write(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Short name used in log lines
    fn name(&self) -> &'static str;
}
