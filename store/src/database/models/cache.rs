use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A cached payload with its absolute expiry, both in epoch milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T = Value> {
    pub key: String,
    pub data: T,
    pub expires_at: i64,
    pub created_at: i64,
}

impl<T> CacheEntry<T> {
    /// Entries are live strictly before `expires_at`
    pub fn is_expired(&self, now_millis: i64) -> bool {
        now_millis >= self.expires_at
    }
}
