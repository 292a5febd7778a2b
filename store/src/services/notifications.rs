//! Notifications service
//!
//! A single newest-first list of notifications. Each target user id keeps
//! at most `per_user_capacity` entries; trimming one user's backlog never
//! touches anyone else's.

use super::generate_id;
use crate::clock::Clock;
use crate::config::BROADCAST_USER_ID;
use crate::database::models::{NewNotification, Notification};
use crate::storage::{KvStore, StorageKey};
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Clone)]
pub struct NotificationsService {
    store: KvStore,
    clock: Arc<dyn Clock>,
    per_user_capacity: usize,
}

impl NotificationsService {
    pub fn new(store: KvStore, clock: Arc<dyn Clock>, per_user_capacity: usize) -> Self {
        Self {
            store,
            clock,
            per_user_capacity,
        }
    }

    /// Every stored notification, newest first
    pub async fn list_all(&self) -> Vec<Notification> {
        self.store.get_records(StorageKey::Notifications).await
    }

    async fn save(&self, notifications: &[Notification]) -> bool {
        self.store.set(StorageKey::Notifications, notifications).await
    }

    /// Notifications addressed to `user_id` or broadcast to everyone
    pub async fn list_for_user(&self, user_id: &str) -> Vec<Notification> {
        self.list_all()
            .await
            .into_iter()
            .filter(|n| n.user_id == user_id || n.user_id == BROADCAST_USER_ID)
            .collect()
    }

    pub async fn unread_count(&self, user_id: &str) -> usize {
        self.list_for_user(user_id)
            .await
            .iter()
            .filter(|n| !n.read)
            .count()
    }

    /// Prepend a notification, then trim the target user's oldest entries
    /// beyond capacity.
    pub async fn append(&self, notification: NewNotification) -> bool {
        let mut notifications = self.list_all().await;
        let notification =
            notification.into_notification(generate_id("notif", self.clock.as_ref()), self.clock.now());
        let target = notification.user_id.clone();

        tracing::debug!("Adding notification {} for {}", notification.id, target);
        notifications.insert(0, notification);

        let overflow: HashSet<String> = notifications
            .iter()
            .filter(|n| n.user_id == target)
            .skip(self.per_user_capacity)
            .map(|n| n.id.clone())
            .collect();

        if !overflow.is_empty() {
            tracing::debug!("Trimming {} old notifications for {}", overflow.len(), target);
            notifications.retain(|n| !overflow.contains(&n.id));
        }

        self.save(&notifications).await
    }

    /// Returns `false` when no notification has that id
    pub async fn mark_read(&self, id: &str) -> bool {
        let mut notifications = self.list_all().await;

        let Some(notification) = notifications.iter_mut().find(|n| n.id == id) else {
            return false;
        };
        notification.read = true;

        self.save(&notifications).await
    }

    /// Remove by id. Idempotent like repository deletes.
    pub async fn delete(&self, id: &str) -> bool {
        let mut notifications = self.list_all().await;
        notifications.retain(|n| n.id != id);
        self.save(&notifications).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::database::models::{NotificationCategory, NotificationType};
    use chrono::{Duration, TimeZone, Utc};

    fn create_test_service() -> (NotificationsService, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap(),
        ));
        let service = NotificationsService::new(KvStore::in_memory(), clock.clone(), 100);
        (service, clock)
    }

    #[tokio::test]
    async fn test_append_and_list_for_user_includes_broadcast() {
        let (notifications, _clock) = create_test_service();

        notifications.append(NewNotification::new("u1", "Hi", "for u1")).await;
        notifications.append(NewNotification::new("u2", "Hi", "for u2")).await;
        notifications
            .append(NewNotification {
                kind: NotificationType::Warning,
                category: NotificationCategory::System,
                ..NewNotification::new("all", "Maintenance", "tonight")
            })
            .await;

        let for_u1 = notifications.list_for_user("u1").await;
        assert_eq!(for_u1.len(), 2);
        assert_eq!(for_u1[0].title, "Maintenance");
        assert_eq!(for_u1[0].kind, NotificationType::Warning);
        assert!(for_u1[1].id.starts_with("notif_"));
        assert!(!for_u1[1].read);
    }

    #[tokio::test]
    async fn test_per_user_cap_leaves_other_users_alone() {
        let (notifications, clock) = create_test_service();

        for i in 0..5 {
            notifications
                .append(NewNotification::new("u2", "Other", format!("u2-{}", i)))
                .await;
        }
        for i in 0..101 {
            clock.advance(Duration::milliseconds(1));
            notifications
                .append(NewNotification::new("u1", "Update", format!("u1-{}", i)))
                .await;
        }

        let all = notifications.list_all().await;
        let u1: Vec<_> = all.iter().filter(|n| n.user_id == "u1").collect();
        let u2: Vec<_> = all.iter().filter(|n| n.user_id == "u2").collect();

        assert_eq!(u1.len(), 100);
        assert_eq!(u1[0].message, "u1-100");
        assert!(u1.iter().all(|n| n.message != "u1-0"));
        assert_eq!(u2.len(), 5);
    }

    #[tokio::test]
    async fn test_mark_read() {
        let (notifications, _clock) = create_test_service();

        notifications.append(NewNotification::new("u1", "Hi", "msg")).await;
        let id = notifications.list_all().await[0].id.clone();

        assert_eq!(notifications.unread_count("u1").await, 1);
        assert!(notifications.mark_read(&id).await);
        assert_eq!(notifications.unread_count("u1").await, 0);

        assert!(!notifications.mark_read("missing").await);
    }

    #[tokio::test]
    async fn test_delete() {
        let (notifications, _clock) = create_test_service();

        notifications.append(NewNotification::new("u1", "Hi", "msg")).await;
        let id = notifications.list_all().await[0].id.clone();

        assert!(notifications.delete(&id).await);
        assert!(notifications.list_all().await.is_empty());
        assert!(notifications.delete(&id).await);
    }
}
