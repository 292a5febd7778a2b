use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[serde(alias = "user")]
    Citizen,
    Police,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Citizen => "citizen",
            Role::Police => "police",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(deserialize_with = "super::de::timestamp")]
    pub created_at: DateTime<Utc>,
}

impl User {
    /// New account with a random id
    pub fn new(
        email: impl Into<String>,
        name: impl Into<String>,
        role: Role,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.into(),
            name: name.into(),
            role,
            phone: None,
            address: None,
            profile_image: None,
            created_at,
        }
    }
}

/// Partial update for a [`User`]; `None` fields are left untouched.
///
/// Optional profile fields take `Some(None)` to clear them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<Role>,
    #[serde(default, deserialize_with = "super::de::nullable")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::de::nullable")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::de::nullable")]
    pub profile_image: Option<Option<String>>,
}

impl UserUpdate {
    pub(crate) fn apply_to(self, user: &mut User) {
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(phone) = self.phone {
            user.phone = phone;
        }
        if let Some(address) = self.address {
            user.address = address;
        }
        if let Some(profile_image) = self.profile_image {
            user.profile_image = profile_image;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_user_role_reads_as_citizen() {
        let user: User = serde_json::from_str(
            r#"{"id":"3","email":"c@x.com","name":"Jane","role":"user","createdAt":"2024-01-03T00:00:00Z"}"#,
        )
        .unwrap();

        assert_eq!(user.role, Role::Citizen);
        assert_eq!(serde_json::to_value(user.role).unwrap(), "citizen");
    }

    #[test]
    fn test_update_only_touches_given_fields() {
        let mut user = User::new("a@x.com", "Alice", Role::Citizen, Utc::now());
        user.phone = Some("555".to_string());

        UserUpdate {
            name: Some("Alicia".to_string()),
            ..Default::default()
        }
        .apply_to(&mut user);

        assert_eq!(user.name, "Alicia");
        assert_eq!(user.email, "a@x.com");
        assert_eq!(user.phone.as_deref(), Some("555"));
    }

    #[test]
    fn test_update_can_clear_optional_fields() {
        let mut user = User::new("a@x.com", "Alice", Role::Citizen, Utc::now());
        user.phone = Some("555".to_string());
        user.address = Some("1 Main St".to_string());

        let update: UserUpdate =
            serde_json::from_str(r#"{"phone":null,"profileImage":"me.png"}"#).unwrap();
        assert_eq!(update.phone, Some(None));
        assert_eq!(update.address, None);
        update.apply_to(&mut user);

        assert_eq!(user.phone, None);
        assert_eq!(user.address.as_deref(), Some("1 Main St"));
        assert_eq!(user.profile_image.as_deref(), Some("me.png"));
    }
}
