//! Audit log service
//!
//! Append-only record of user actions, kept newest first and capped to a
//! fixed number of entries.

use super::generate_id;
use crate::clock::Clock;
use crate::database::models::{AuditLogEntry, NewAuditEntry};
use crate::storage::{KvStore, StorageKey};
use std::sync::Arc;

#[derive(Clone)]
pub struct AuditLogService {
    store: KvStore,
    clock: Arc<dyn Clock>,
    capacity: usize,
}

impl AuditLogService {
    pub fn new(store: KvStore, clock: Arc<dyn Clock>, capacity: usize) -> Self {
        Self {
            store,
            clock,
            capacity,
        }
    }

    async fn load(&self) -> Vec<AuditLogEntry> {
        self.store.get_records(StorageKey::AuditLog).await
    }

    /// Record an action. The oldest entries beyond capacity are dropped.
    pub async fn append(&self, entry: NewAuditEntry) -> bool {
        let mut logs = self.load().await;
        let entry = entry.into_entry(generate_id("audit", self.clock.as_ref()), self.clock.now());

        tracing::debug!(
            "Audit: {} {} {} ({})",
            entry.user_id,
            entry.action,
            entry.resource,
            entry.id
        );

        logs.insert(0, entry);
        logs.truncate(self.capacity);

        self.store.set(StorageKey::AuditLog, &logs).await
    }

    /// The `limit` most recent entries, newest first
    pub async fn list(&self, limit: usize) -> Vec<AuditLogEntry> {
        let mut logs = self.load().await;
        logs.truncate(limit);
        logs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{Duration, TimeZone, Utc};

    fn create_test_service(capacity: usize) -> (AuditLogService, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap(),
        ));
        let service = AuditLogService::new(KvStore::in_memory(), clock.clone(), capacity);
        (service, clock)
    }

    #[tokio::test]
    async fn test_append_assigns_id_and_timestamp() {
        let (audit, clock) = create_test_service(1000);

        assert!(
            audit
                .append(NewAuditEntry::new("u1", "Alice", "create", "complaint").resource_id("c1"))
                .await
        );

        let logs = audit.list(10).await;
        assert_eq!(logs.len(), 1);
        assert!(logs[0].id.starts_with("audit_"));
        assert_eq!(logs[0].timestamp, clock.now());
        assert_eq!(logs[0].resource_id.as_deref(), Some("c1"));
    }

    #[tokio::test]
    async fn test_newest_first_and_limit() {
        let (audit, clock) = create_test_service(1000);

        for action in ["first", "second", "third"] {
            audit.append(NewAuditEntry::new("u1", "Alice", action, "user")).await;
            clock.advance(Duration::seconds(1));
        }

        let logs = audit.list(2).await;
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].action, "third");
        assert_eq!(logs[1].action, "second");
    }

    #[tokio::test]
    async fn test_capacity_keeps_newest() {
        let (audit, _clock) = create_test_service(1000);

        for i in 0..1001 {
            audit
                .append(NewAuditEntry::new("u1", "Alice", format!("action-{}", i), "user"))
                .await;
        }

        let logs = audit.list(2000).await;
        assert_eq!(logs.len(), 1000);
        assert_eq!(logs[0].action, "action-1000");
        assert_eq!(logs[999].action, "action-1");
    }

    #[tokio::test]
    async fn test_empty_log() {
        let (audit, _clock) = create_test_service(10);
        assert!(audit.list(100).await.is_empty());
    }
}
