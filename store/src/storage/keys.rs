//! Namespaced storage keys

use std::fmt;

/// Every key the store persists under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Users,
    Complaints,
    Analytics,
    Settings,
    Notifications,
    AuditLog,
    Cache,
}

impl StorageKey {
    pub const ALL: [StorageKey; 7] = [
        StorageKey::Users,
        StorageKey::Complaints,
        StorageKey::Analytics,
        StorageKey::Settings,
        StorageKey::Notifications,
        StorageKey::AuditLog,
        StorageKey::Cache,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::Users => "crimewatch_users",
            StorageKey::Complaints => "crimewatch_complaints",
            StorageKey::Analytics => "crimewatch_analytics",
            StorageKey::Settings => "crimewatch_settings",
            StorageKey::Notifications => "crimewatch_notifications",
            StorageKey::AuditLog => "crimewatch_audit_log",
            StorageKey::Cache => "crimewatch_cache",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
