use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationCategory {
    Complaint,
    System,
    Security,
    #[default]
    General,
}

/// A message addressed to one user or to everyone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    /// Target user id, or [`crate::config::BROADCAST_USER_ID`]
    pub user_id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub category: NotificationCategory,
    #[serde(default)]
    pub read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    #[serde(deserialize_with = "super::de::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        deserialize_with = "super::de::optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Notification fields supplied by the caller; id and timestamp are assigned on append
#[derive(Debug, Clone, Default)]
pub struct NewNotification {
    pub user_id: String,
    pub title: String,
    pub message: String,
    pub kind: NotificationType,
    pub category: NotificationCategory,
    pub read: bool,
    pub action_url: Option<String>,
    pub metadata: Option<Map<String, Value>>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl NewNotification {
    pub fn new(
        user_id: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            title: title.into(),
            message: message.into(),
            ..Default::default()
        }
    }

    pub(crate) fn into_notification(self, id: String, created_at: DateTime<Utc>) -> Notification {
        Notification {
            id,
            user_id: self.user_id,
            title: self.title,
            message: self.message,
            kind: self.kind,
            category: self.category,
            read: self.read,
            action_url: self.action_url,
            metadata: self.metadata,
            created_at,
            expires_at: self.expires_at,
        }
    }
}
