use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One recorded user action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub action: String,
    pub resource: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    #[serde(default)]
    pub details: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(deserialize_with = "super::de::timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// Audit fields supplied by the caller; id and timestamp are assigned on append
#[derive(Debug, Clone, Default)]
pub struct NewAuditEntry {
    pub user_id: String,
    pub user_name: String,
    pub action: String,
    pub resource: String,
    pub resource_id: Option<String>,
    pub details: Map<String, Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl NewAuditEntry {
    pub fn new(
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        action: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            user_name: user_name.into(),
            action: action.into(),
            resource: resource.into(),
            ..Default::default()
        }
    }

    pub fn resource_id(mut self, id: impl Into<String>) -> Self {
        self.resource_id = Some(id.into());
        self
    }

    pub(crate) fn into_entry(self, id: String, timestamp: DateTime<Utc>) -> AuditLogEntry {
        AuditLogEntry {
            id,
            user_id: self.user_id,
            user_name: self.user_name,
            action: self.action,
            resource: self.resource,
            resource_id: self.resource_id,
            details: self.details,
            ip_address: self.ip_address,
            user_agent: self.user_agent,
            timestamp,
        }
    }
}
