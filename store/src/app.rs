//! Store wiring and initialization
//!
//! [`DataStore`] builds every repository and service over one shared
//! [`KvStore`] and [`Clock`]. Callers construct it once and pass it where it
//! is needed; there is no process-wide instance.

use crate::clock::{Clock, SystemClock};
use crate::config::StoreConfig;
use crate::database::create_pool;
use crate::database::models::{
    NewAuditEntry, NewNotification, NotificationCategory, NotificationType,
};
use crate::database::repository::{ComplaintRepository, Repository, UserRepository};
use crate::error::Result;
use crate::services::{
    AnalyticsService, AuditLogService, BackupService, CacheService, IntegrityReport,
    NotificationsService, SettingsService,
};
use crate::storage::KvStore;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Every store component, sharing one persistence medium
#[derive(Clone)]
pub struct DataStore {
    pub users: UserRepository,
    pub complaints: ComplaintRepository,
    pub cache: CacheService,
    pub audit: AuditLogService,
    pub notifications: NotificationsService,
    pub settings: SettingsService,
    pub analytics: AnalyticsService,
    pub backup: BackupService,
    store: KvStore,
}

impl DataStore {
    pub fn new(store: KvStore, clock: Arc<dyn Clock>, config: &StoreConfig) -> Self {
        let users: UserRepository = Repository::new(store.clone(), clock.clone());
        let complaints: ComplaintRepository = Repository::new(store.clone(), clock.clone());
        let cache = CacheService::new(
            store.clone(),
            clock.clone(),
            config.default_cache_ttl_minutes,
        );
        let audit = AuditLogService::new(store.clone(), clock.clone(), config.audit_log_capacity);
        let notifications = NotificationsService::new(
            store.clone(),
            clock.clone(),
            config.notifications_per_user,
        );
        let settings = SettingsService::new(store.clone(), clock.clone());
        let analytics = AnalyticsService::new(
            store.clone(),
            clock.clone(),
            users.clone(),
            complaints.clone(),
            cache.clone(),
        );
        let backup = BackupService::new(
            store.clone(),
            clock,
            users.clone(),
            complaints.clone(),
            analytics.clone(),
            settings.clone(),
            notifications.clone(),
            audit.clone(),
            config.export_audit_limit,
        );

        Self {
            users,
            complaints,
            cache,
            audit,
            notifications,
            settings,
            analytics,
            backup,
            store,
        }
    }

    /// Open the SQLite database named by `config`, running migrations
    pub async fn open(config: &StoreConfig) -> Result<Self> {
        tracing::info!("Opening store at {:?}", config.database_path);

        let pool = create_pool(&config.database_path).await?;
        Ok(Self::new(
            KvStore::sqlite(pool),
            Arc::new(SystemClock),
            config,
        ))
    }

    /// Store backed by process memory, with default limits
    pub fn in_memory() -> Self {
        Self::new(
            KvStore::in_memory(),
            Arc::new(SystemClock),
            &StoreConfig::default(),
        )
    }

    /// Whether writes reach a persistence medium
    pub fn is_available(&self) -> bool {
        self.store.is_available()
    }

    /// Compute analytics if none are stored and materialize default settings
    pub async fn initialize(&self) {
        tracing::info!("Initializing store");

        if self.analytics.get().await.is_none() && !self.analytics.refresh().await {
            tracing::warn!("Initial analytics snapshot could not be stored");
        }
        self.settings.get().await;
    }

    /// Append an audit entry for a user action
    pub async fn log_user_action(
        &self,
        user_id: &str,
        user_name: &str,
        action: &str,
        resource: &str,
        resource_id: Option<&str>,
        details: Map<String, Value>,
    ) -> bool {
        let mut entry = NewAuditEntry::new(user_id, user_name, action, resource);
        entry.resource_id = resource_id.map(str::to_string);
        entry.details = details;

        self.audit.append(entry).await
    }

    /// Queue a notification for `user_id` (or `"all"`)
    pub async fn create_notification(
        &self,
        user_id: &str,
        title: &str,
        message: &str,
        kind: NotificationType,
        category: NotificationCategory,
    ) -> bool {
        self.notifications
            .append(NewNotification {
                kind,
                category,
                ..NewNotification::new(user_id, title, message)
            })
            .await
    }

    pub async fn export_data(&self) -> String {
        self.backup.export_data().await
    }

    pub async fn import_data(&self, json: &str) -> bool {
        self.backup.import_data(json).await
    }

    pub async fn clear_all_data(&self) -> bool {
        self.backup.clear_all_data().await
    }

    pub async fn validate_data_integrity(&self) -> IntegrityReport {
        self.backup.validate_data_integrity().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{AuditLogEntry, Role, User};
    use crate::storage::StorageKey;
    use chrono::Utc;

    #[tokio::test]
    async fn test_initialize_creates_analytics_and_settings() {
        let store = DataStore::in_memory();
        assert!(store.analytics.get().await.is_none());

        store.initialize().await;

        let analytics = store.analytics.get().await.unwrap();
        assert_eq!(analytics.id, "main");
        assert_eq!(analytics.total_complaints, 0);

        let settings: Option<Value> = store.store.get(StorageKey::Settings).await;
        assert!(settings.is_some());
    }

    #[tokio::test]
    async fn test_initialize_keeps_existing_analytics() {
        let store = DataStore::in_memory();
        store.initialize().await;
        let first = store.analytics.get().await.unwrap();

        store
            .users
            .insert(User::new("a@b.com", "A", Role::Citizen, Utc::now()))
            .await;
        store.initialize().await;

        assert_eq!(store.analytics.get().await.unwrap(), first);
    }

    #[tokio::test]
    async fn test_log_user_action() {
        let store = DataStore::in_memory();
        let mut details = Map::new();
        details.insert("status".to_string(), Value::from("approved"));

        assert!(
            store
                .log_user_action("p1", "Officer", "review", "complaint", Some("c1"), details)
                .await
        );

        let logs: Vec<AuditLogEntry> = store.audit.list(10).await;
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].resource_id.as_deref(), Some("c1"));
        assert_eq!(logs[0].details["status"], "approved");
    }

    #[tokio::test]
    async fn test_create_notification() {
        let store = DataStore::in_memory();

        assert!(
            store
                .create_notification(
                    "u1",
                    "Complaint approved",
                    "Your report was approved",
                    NotificationType::Success,
                    NotificationCategory::Complaint,
                )
                .await
        );

        let list = store.notifications.list_for_user("u1").await;
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].kind, NotificationType::Success);
        assert_eq!(list[0].category, NotificationCategory::Complaint);
    }

    #[tokio::test]
    async fn test_detached_store_degrades_quietly() {
        let store = DataStore::new(
            KvStore::detached(),
            Arc::new(SystemClock),
            &StoreConfig::default(),
        );

        assert!(!store.is_available());
        assert!(store.users.get_all().await.is_empty());
        assert!(!store.users.insert(User::new("a@b.com", "A", Role::Admin, Utc::now())).await);
        assert!(store.import_data("{}").await);
        assert!(!store.clear_all_data().await);
        assert!(store.validate_data_integrity().await.is_valid);
    }
}
