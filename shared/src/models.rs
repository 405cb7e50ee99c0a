//! Data models for the Technotes application

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const ROLE_EMPLOYEE: &str = "Employee";
pub const ROLE_MANAGER: &str = "Manager";
pub const ROLE_ADMIN: &str = "Admin";

/// Roles allowed to administer user accounts
pub const USER_ADMIN_ROLES: [&str; 2] = [ROLE_ADMIN, ROLE_MANAGER];

/// First ticket number handed out to a note
pub const FIRST_TICKET: i64 = 500;

/// User account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub roles: Vec<String>,
    pub active: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Public view of the account, never carrying the password hash
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            username: self.username.clone(),
            roles: self.roles.clone(),
            active: self.active,
        }
    }
}

/// User fields exposed over the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub roles: Vec<String>,
    pub active: bool,
}

/// A note assigned to a user, identified to humans by its ticket number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub user: Uuid,
    pub title: String,
    pub text: String,
    pub completed: bool,
    pub ticket: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(roles: &[&str]) -> User {
        User {
            id: Uuid::new_v4(),
            username: "kevin".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let json = serde_json::to_value(user(&[ROLE_EMPLOYEE])).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "kevin");
    }

    #[test]
    fn test_summary_omits_timestamps() {
        let json = serde_json::to_value(user(&[ROLE_MANAGER]).summary()).unwrap();
        assert_eq!(json["roles"][0], ROLE_MANAGER);
        assert!(json.get("createdAt").is_none());
    }

    #[test]
    fn test_note_serializes_camel_case() {
        let note = Note {
            id: Uuid::new_v4(),
            user: Uuid::new_v4(),
            title: "Printer".to_string(),
            text: "Out of toner".to_string(),
            completed: false,
            ticket: FIRST_TICKET,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&note).unwrap();
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["ticket"], 500);
    }
}
