use crate::config::SINGLETON_ID;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outbound notification channels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    #[serde(default = "default_true")]
    pub email_enabled: bool,
    #[serde(default)]
    pub sms_enabled: bool,
    #[serde(default = "default_true")]
    pub push_enabled: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email_enabled: true,
            sms_enabled: false,
            push_enabled: true,
        }
    }
}

/// Account security policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecuritySettings {
    #[serde(default = "default_password_min_length")]
    pub password_min_length: u32,
    #[serde(default)]
    pub require_two_factor: bool,
    /// Session lifetime in milliseconds
    #[serde(default = "default_session_timeout")]
    pub session_timeout: u64,
}

fn default_password_min_length() -> u32 {
    8
}

fn default_session_timeout() -> u64 {
    24 * 60 * 60 * 1000 // 24 hours
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            password_min_length: default_password_min_length(),
            require_two_factor: false,
            session_timeout: default_session_timeout(),
        }
    }
}

/// System-wide settings singleton
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemSettings {
    #[serde(default = "default_id")]
    pub id: String,
    #[serde(default)]
    pub maintenance_mode: bool,
    #[serde(default = "default_true")]
    pub allow_registration: bool,
    #[serde(default)]
    pub require_email_verification: bool,
    /// Upload limit in bytes
    #[serde(default = "default_max_file_upload_size")]
    pub max_file_upload_size: u64,
    #[serde(default = "default_supported_file_types")]
    pub supported_file_types: Vec<String>,
    #[serde(default = "default_true")]
    pub auto_assign_officers: bool,
    #[serde(default)]
    pub notification_settings: NotificationSettings,
    #[serde(default)]
    pub security_settings: SecuritySettings,
    #[serde(deserialize_with = "super::de::timestamp")]
    pub updated_at: DateTime<Utc>,
}

fn default_id() -> String {
    SINGLETON_ID.to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_file_upload_size() -> u64 {
    10 * 1024 * 1024 // 10MB
}

fn default_supported_file_types() -> Vec<String> {
    ["image/*", "video/*", ".pdf", ".doc", ".docx"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl SystemSettings {
    pub fn defaults(now: DateTime<Utc>) -> Self {
        Self {
            id: default_id(),
            maintenance_mode: false,
            allow_registration: true,
            require_email_verification: false,
            max_file_upload_size: default_max_file_upload_size(),
            supported_file_types: default_supported_file_types(),
            auto_assign_officers: true,
            notification_settings: NotificationSettings::default(),
            security_settings: SecuritySettings::default(),
            updated_at: now,
        }
    }
}

/// Partial settings update. Nested groups are replaced as a whole.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub maintenance_mode: Option<bool>,
    pub allow_registration: Option<bool>,
    pub require_email_verification: Option<bool>,
    pub max_file_upload_size: Option<u64>,
    pub supported_file_types: Option<Vec<String>>,
    pub auto_assign_officers: Option<bool>,
    pub notification_settings: Option<NotificationSettings>,
    pub security_settings: Option<SecuritySettings>,
}

impl SettingsUpdate {
    pub(crate) fn apply_to(self, settings: &mut SystemSettings, now: DateTime<Utc>) {
        if let Some(v) = self.maintenance_mode {
            settings.maintenance_mode = v;
        }
        if let Some(v) = self.allow_registration {
            settings.allow_registration = v;
        }
        if let Some(v) = self.require_email_verification {
            settings.require_email_verification = v;
        }
        if let Some(v) = self.max_file_upload_size {
            settings.max_file_upload_size = v;
        }
        if let Some(v) = self.supported_file_types {
            settings.supported_file_types = v;
        }
        if let Some(v) = self.auto_assign_officers {
            settings.auto_assign_officers = v;
        }
        if let Some(v) = self.notification_settings {
            settings.notification_settings = v;
        }
        if let Some(v) = self.security_settings {
            settings.security_settings = v;
        }
        settings.updated_at = now;
    }
}
