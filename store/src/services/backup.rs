//! Backup service
//!
//! JSON export and import of every persisted collection, wholesale clearing,
//! and a referential integrity check over users and complaints.

use crate::clock::Clock;
use crate::config::EXPORT_FORMAT_VERSION;
use crate::database::models::{
    Analytics, AuditLogEntry, Complaint, Notification, SystemSettings, User,
};
use crate::database::repository::{ComplaintRepository, UserRepository};
use crate::services::{AnalyticsService, AuditLogService, NotificationsService, SettingsService};
use crate::storage::{decode_records, KvStore, StorageKey};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;

/// Export document layout
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataExport {
    pub users: Vec<User>,
    pub complaints: Vec<Complaint>,
    pub analytics: Option<Analytics>,
    pub settings: SystemSettings,
    pub notifications: Vec<Notification>,
    pub audit_logs: Vec<AuditLogEntry>,
    pub exported_at: DateTime<Utc>,
    pub version: String,
}

/// Outcome of [`BackupService::validate_data_integrity`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

#[derive(Clone)]
pub struct BackupService {
    store: KvStore,
    clock: Arc<dyn Clock>,
    users: UserRepository,
    complaints: ComplaintRepository,
    analytics: AnalyticsService,
    settings: SettingsService,
    notifications: NotificationsService,
    audit: AuditLogService,
    export_audit_limit: usize,
}

impl BackupService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: KvStore,
        clock: Arc<dyn Clock>,
        users: UserRepository,
        complaints: ComplaintRepository,
        analytics: AnalyticsService,
        settings: SettingsService,
        notifications: NotificationsService,
        audit: AuditLogService,
        export_audit_limit: usize,
    ) -> Self {
        Self {
            store,
            clock,
            users,
            complaints,
            analytics,
            settings,
            notifications,
            audit,
            export_audit_limit,
        }
    }

    /// Pretty-printed JSON snapshot of every collection. Only the newest
    /// audit entries up to the export limit are included.
    pub async fn export_data(&self) -> String {
        let export = DataExport {
            users: self.users.get_all().await,
            complaints: self.complaints.get_all().await,
            analytics: self.analytics.get().await,
            settings: self.settings.get().await,
            notifications: self.notifications.list_all().await,
            audit_logs: self.audit.list(self.export_audit_limit).await,
            exported_at: self.clock.now(),
            version: EXPORT_FORMAT_VERSION.to_string(),
        };

        tracing::info!(
            "Exporting {} users, {} complaints, {} audit entries",
            export.users.len(),
            export.complaints.len(),
            export.audit_logs.len()
        );

        match serde_json::to_string_pretty(&export) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to serialize export: {}", e);
                String::from("{}")
            }
        }
    }

    /// Restore collections from an export document.
    ///
    /// Each present, non-null top-level key overwrites its collection. List
    /// keys are decoded record by record and malformed records are dropped
    /// with a warning. A key whose value has the wrong shape altogether is
    /// skipped and the rest are still imported. Returns `false` only when the
    /// payload is not a JSON object.
    pub async fn import_data(&self, json: &str) -> bool {
        let data: Map<String, Value> = match serde_json::from_str(json) {
            Ok(data) => data,
            Err(e) => {
                tracing::error!("Error importing data: {}", e);
                return false;
            }
        };

        let mut imported = 0;
        imported += self
            .import_records::<User>(&data, "users", StorageKey::Users)
            .await as usize;
        imported += self
            .import_records::<Complaint>(&data, "complaints", StorageKey::Complaints)
            .await as usize;
        imported += self
            .import_document::<Analytics>(&data, "analytics", StorageKey::Analytics)
            .await as usize;
        imported += self
            .import_document::<SystemSettings>(&data, "settings", StorageKey::Settings)
            .await as usize;
        imported += self
            .import_records::<Notification>(&data, "notifications", StorageKey::Notifications)
            .await as usize;
        imported += self
            .import_records::<AuditLogEntry>(&data, "auditLogs", StorageKey::AuditLog)
            .await as usize;

        tracing::info!("Imported {} collections", imported);
        true
    }

    /// Import a list key, keeping every record that decodes
    async fn import_records<T>(
        &self,
        data: &Map<String, Value>,
        field: &str,
        key: StorageKey,
    ) -> bool
    where
        T: Serialize + DeserializeOwned,
    {
        let values = match data.get(field) {
            None | Some(Value::Null) => return false,
            Some(Value::Array(values)) => values.clone(),
            Some(_) => {
                tracing::warn!("Skipping '{}' during import: expected a list", field);
                return false;
            }
        };

        let records: Vec<T> = decode_records(field, values);
        self.store.set(key, &records).await
    }

    /// Import a single-document key such as settings
    async fn import_document<T>(
        &self,
        data: &Map<String, Value>,
        field: &str,
        key: StorageKey,
    ) -> bool
    where
        T: Serialize + DeserializeOwned,
    {
        let value = match data.get(field) {
            None | Some(Value::Null) => return false,
            Some(value) => value.clone(),
        };

        match serde_json::from_value::<T>(value) {
            Ok(typed) => self.store.set(key, &typed).await,
            Err(e) => {
                tracing::warn!("Skipping '{}' during import: {}", field, e);
                false
            }
        }
    }

    /// Remove every persisted key
    pub async fn clear_all_data(&self) -> bool {
        let mut ok = true;
        for key in StorageKey::ALL {
            ok &= self.store.remove(key).await;
        }

        if ok {
            tracing::info!("All data cleared");
        } else {
            tracing::warn!("Some keys could not be cleared");
        }
        ok
    }

    /// Check every complaint owner exists as a user and ids are unique
    pub async fn validate_data_integrity(&self) -> IntegrityReport {
        let users = self.users.get_all().await;
        let complaints = self.complaints.get_all().await;
        let mut errors = Vec::new();

        let user_ids: HashSet<&str> = users.iter().map(|u| u.id.as_str()).collect();

        for complaint in &complaints {
            if !user_ids.contains(complaint.user_id.as_str()) {
                errors.push(format!(
                    "Complaint {} references non-existent user {}",
                    complaint.id, complaint.user_id
                ));
            }
        }

        if user_ids.len() != users.len() {
            errors.push("Duplicate user IDs found".to_string());
        }

        let complaint_ids: HashSet<&str> = complaints.iter().map(|c| c.id.as_str()).collect();
        if complaint_ids.len() != complaints.len() {
            errors.push("Duplicate complaint IDs found".to_string());
        }

        if !errors.is_empty() {
            tracing::warn!("Integrity check found {} problems", errors.len());
        }

        IntegrityReport {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::database::models::{NewAuditEntry, Priority, Role};
    use crate::database::repository::Repository;
    use crate::services::CacheService;
    use chrono::TimeZone;

    struct Fixture {
        backup: BackupService,
        store: KvStore,
        users: UserRepository,
        complaints: ComplaintRepository,
        audit: AuditLogService,
    }

    fn create_fixture() -> Fixture {
        let store = KvStore::in_memory();
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap(),
        ));
        let users: UserRepository = Repository::new(store.clone(), clock.clone());
        let complaints: ComplaintRepository = Repository::new(store.clone(), clock.clone());
        let cache = CacheService::new(store.clone(), clock.clone(), 60);
        let analytics = AnalyticsService::new(
            store.clone(),
            clock.clone(),
            users.clone(),
            complaints.clone(),
            cache,
        );
        let settings = SettingsService::new(store.clone(), clock.clone());
        let notifications = NotificationsService::new(store.clone(), clock.clone(), 100);
        let audit = AuditLogService::new(store.clone(), clock.clone(), 1000);

        let backup = BackupService::new(
            store.clone(),
            clock.clone(),
            users.clone(),
            complaints.clone(),
            analytics,
            settings,
            notifications,
            audit.clone(),
            3,
        );

        Fixture {
            backup,
            store,
            users,
            complaints,
            audit,
        }
    }

    fn user(id: &str) -> User {
        let mut user = User::new(
            format!("{}@example.com", id),
            id,
            Role::Citizen,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        );
        user.id = id.to_string();
        user
    }

    fn complaint(id: &str, user_id: &str) -> Complaint {
        let mut complaint = Complaint::new(
            user_id,
            "Stolen bike",
            "Taken from the rack",
            "Theft",
            "Main St",
            Priority::Medium,
            Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap(),
        );
        complaint.id = id.to_string();
        complaint
    }

    #[tokio::test]
    async fn test_export_shape() {
        let f = create_fixture();
        f.users.insert(user("u1")).await;
        for i in 0..5 {
            f.audit
                .append(NewAuditEntry::new("u1", "u1", format!("a{}", i), "user"))
                .await;
        }

        let json = f.backup.export_data().await;
        let value: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["version"], "1.0.0");
        assert_eq!(value["users"].as_array().unwrap().len(), 1);
        assert!(value["complaints"].as_array().unwrap().is_empty());
        assert!(value["analytics"].is_null());
        assert_eq!(value["settings"]["id"], "main");
        assert_eq!(value["auditLogs"].as_array().unwrap().len(), 3);
        assert_eq!(value["auditLogs"][0]["action"], "a4");
        assert!(value["exportedAt"].is_string());
    }

    #[tokio::test]
    async fn test_export_clear_import_restores_collections() {
        let f = create_fixture();
        f.users.insert(user("u1")).await;
        f.complaints.insert(complaint("c1", "u1")).await;

        let json = f.backup.export_data().await;
        assert!(f.backup.clear_all_data().await);
        assert!(f.users.get_all().await.is_empty());

        assert!(f.backup.import_data(&json).await);
        assert_eq!(f.users.get_all().await, vec![user("u1")]);
        assert_eq!(f.complaints.get_all().await, vec![complaint("c1", "u1")]);
    }

    #[tokio::test]
    async fn test_import_rejects_non_object() {
        let f = create_fixture();
        assert!(!f.backup.import_data("not json").await);
        assert!(!f.backup.import_data("[1, 2, 3]").await);
    }

    #[tokio::test]
    async fn test_import_skips_bad_keys_and_leaves_absent_untouched() {
        let f = create_fixture();
        f.complaints.insert(complaint("c1", "u1")).await;

        let payload = serde_json::json!({
            "users": [serde_json::to_value(user("u9")).unwrap()],
            "notifications": "not a list",
            "analytics": null,
        });
        assert!(f.backup.import_data(&payload.to_string()).await);

        assert_eq!(f.users.get_all().await, vec![user("u9")]);
        assert_eq!(f.complaints.count().await, 1);
        let notifications: Option<Value> = f.store.get(StorageKey::Notifications).await;
        assert!(notifications.is_none());
    }

    #[tokio::test]
    async fn test_import_keeps_valid_records_and_naive_timestamps() {
        let f = create_fixture();
        let payload = r#"{
            "users": [
                {"id": "u1", "email": "a@x.com", "name": "A", "role": "citizen",
                 "createdAt": "2024-01-01T10:00:00.123456"},
                {"id": "u2", "email": "b@x.com", "name": "B", "role": "police",
                 "createdAt": "2024-01-02T10:00:00Z"},
                {"id": "u3", "name": "missing email"}
            ],
            "complaints": [
                {"id": "c1", "userId": "u1", "title": "t", "description": "d",
                 "category": "Theft", "location": "loc", "dateOfIncident": "2024-01-01",
                 "timeOfIncident": "10:00", "status": "approved", "priority": "high",
                 "createdAt": "2024-01-01T10:00:00", "updatedAt": "2024-01-01T12:30:00"}
            ]
        }"#;

        assert!(f.backup.import_data(payload).await);

        let users = f.users.get_all().await;
        assert_eq!(
            users.iter().map(|u| u.id.as_str()).collect::<Vec<_>>(),
            vec!["u1", "u2"]
        );
        assert_eq!(
            users[0].created_at,
            Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap() + chrono::Duration::microseconds(123_456)
        );

        let complaints = f.complaints.get_all().await;
        assert_eq!(complaints.len(), 1);
        assert_eq!(complaints[0].response_hours(), 2.5);
    }

    #[tokio::test]
    async fn test_integrity_clean() {
        let f = create_fixture();
        f.users.insert(user("u1")).await;
        f.complaints.insert(complaint("c1", "u1")).await;
        f.complaints.insert(complaint("c2", "u1")).await;

        let report = f.backup.validate_data_integrity().await;
        assert!(report.is_valid);
        assert!(report.errors.is_empty());
    }

    #[tokio::test]
    async fn test_integrity_flags_anonymous_owner_without_user() {
        let f = create_fixture();
        let payload = serde_json::json!({
            "complaints": [serde_json::to_value(complaint("c9", "anonymous")).unwrap()],
        });
        assert!(f.backup.import_data(&payload.to_string()).await);

        let report = f.backup.validate_data_integrity().await;
        assert!(!report.is_valid);
        assert_eq!(
            report.errors,
            vec!["Complaint c9 references non-existent user anonymous".to_string()]
        );
    }

    #[tokio::test]
    async fn test_integrity_reports_orphans_and_duplicates() {
        let f = create_fixture();
        f.users.save_all(&[user("u1"), user("u1")]).await;
        f.complaints
            .save_all(&[complaint("c1", "ghost"), complaint("c1", "u1")])
            .await;

        let report = f.backup.validate_data_integrity().await;
        assert!(!report.is_valid);
        assert_eq!(
            report.errors,
            vec![
                "Complaint c1 references non-existent user ghost".to_string(),
                "Duplicate user IDs found".to_string(),
                "Duplicate complaint IDs found".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_clear_all_data_removes_every_key() {
        let f = create_fixture();
        f.users.insert(user("u1")).await;
        f.audit.append(NewAuditEntry::new("u1", "u1", "login", "user")).await;

        assert!(f.backup.clear_all_data().await);
        for key in StorageKey::ALL {
            let value: Option<Value> = f.store.get(key).await;
            assert!(value.is_none(), "{} should be cleared", key);
        }
    }
}
