//! Cache service
//!
//! TTL cache whose entries all live in one map persisted under
//! [`StorageKey::Cache`]. Expiry is lazy: an entry is only checked, and
//! evicted, when it is read. Expired entries that are never read again stay
//! in the persisted map until the next write rewrites it.

use crate::clock::Clock;
use crate::database::models::CacheEntry;
use crate::storage::{KvStore, StorageKey};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

type CacheMap = HashMap<String, CacheEntry<Value>>;

#[derive(Clone)]
pub struct CacheService {
    store: KvStore,
    clock: Arc<dyn Clock>,
    default_ttl_minutes: u32,
}

impl CacheService {
    pub fn new(store: KvStore, clock: Arc<dyn Clock>, default_ttl_minutes: u32) -> Self {
        Self {
            store,
            clock,
            default_ttl_minutes,
        }
    }

    async fn load(&self) -> CacheMap {
        self.store.get(StorageKey::Cache).await.unwrap_or_default()
    }

    /// Cache `value` with the default TTL
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        self.set_with_ttl(key, value, self.default_ttl_minutes).await
    }

    /// Cache `value` for `ttl_minutes`. A TTL of zero stores an already expired entry.
    pub async fn set_with_ttl<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl_minutes: u32,
    ) -> bool {
        let data = match serde_json::to_value(value) {
            Ok(data) => data,
            Err(e) => {
                tracing::error!("Error serializing cache value ({}): {}", key, e);
                return false;
            }
        };

        let mut cache = self.load().await;
        let now = self.clock.now_millis();

        cache.insert(
            key.to_string(),
            CacheEntry {
                key: key.to_string(),
                data,
                expires_at: now + i64::from(ttl_minutes) * 60 * 1000,
                created_at: now,
            },
        );

        tracing::debug!("Cached {} for {} minutes", key, ttl_minutes);
        self.store.set(StorageKey::Cache, &cache).await
    }

    /// Cached value for `key`, evicting it if it has expired
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut cache = self.load().await;
        let entry = cache.get(key)?;

        if entry.is_expired(self.clock.now_millis()) {
            cache.remove(key);
            self.store.set(StorageKey::Cache, &cache).await;
            tracing::debug!("Evicted expired cache entry {}", key);
            return None;
        }

        match serde_json::from_value(entry.data.clone()) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Cached value for {} has unexpected shape: {}", key, e);
                None
            }
        }
    }

    /// Whether the persisted map holds an entry for `key`, expired or not
    pub async fn contains_raw(&self, key: &str) -> bool {
        self.load().await.contains_key(key)
    }

    /// Drop every entry
    pub async fn clear(&self) -> bool {
        self.store.set(StorageKey::Cache, &CacheMap::new()).await
    }
}
