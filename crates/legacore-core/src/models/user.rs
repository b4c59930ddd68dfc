//! User domain model.
//!
//! Credential material is never serialized: `password_hash` and `salt`
//! are skipped by serde, so no response built from a [`User`] can carry
//! them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::EnumField;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    Manager,
    User,
}

impl EnumField for UserRole {
    const FIELD: &'static str = "role";
    const ALL: &'static [Self] = &[Self::Admin, Self::Manager, Self::User];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Manager => "MANAGER",
            Self::User => "USER",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub company_id: Uuid,
    pub email: String,
    pub name: Option<String>,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    #[serde(skip_serializing, default)]
    pub salt: String,
    pub role: UserRole,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateUser {
    pub company_id: Uuid,
    pub email: String,
    pub name: Option<String>,
    /// Raw password (hashed with Argon2id before storage).
    pub password: String,
    pub role: UserRole,
    pub active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_user_carries_no_credentials() {
        let user = User {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            email: "admin@acme.com".into(),
            name: Some("Admin".into()),
            password_hash: "$argon2id$v=19$secret".into(),
            salt: "pepperedsalt".into(),
            role: UserRole::Admin,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&user).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("passwordHash"));
        assert!(!obj.contains_key("password"));
        assert!(!obj.contains_key("salt"));
        assert_eq!(obj["role"], "ADMIN");
        assert_eq!(obj["companyId"], user.company_id.to_string());
    }

    #[test]
    fn role_parse_rejects_unknown_value() {
        assert_eq!(UserRole::parse("MANAGER").unwrap(), UserRole::Manager);
        let err = UserRole::parse("ROOT").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid role. Must be one of: ADMIN, MANAGER, USER"
        );
    }
}
