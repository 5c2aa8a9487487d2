use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const ADMIN_LABEL: &str = "admin";

/// The account behind the current session, as the backend reports it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub prefs: Map<String, Value>,
    #[serde(default)]
    pub labels: Vec<String>,
}

impl User {
    pub fn avatar_url(&self) -> Option<&str> {
        self.prefs.get("avatarUrl").and_then(Value::as_str)
    }

    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "User"
        } else {
            &self.name
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Member,
}

impl Role {
    pub fn from_labels(labels: &[String]) -> Self {
        if labels.iter().any(|l| l == ADMIN_LABEL) {
            Role::Admin
        } else {
            Role::Member
        }
    }
}

/// An authenticated user with the role resolved at session establishment
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub user: User,
    pub role: Role,
}

impl Identity {
    pub fn new(user: User) -> Self {
        let role = Role::from_labels(&user.labels);
        Self { user, role }
    }

    pub fn id(&self) -> &str {
        &self.user.id
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// A backend session record (email/password sign-in)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(default)]
    pub provider: String,
    pub expire: Option<DateTime<Utc>>,
}

/// Avatar fallback: first letter of each word, uppercase. "U" when no name.
pub fn initials(name: &str) -> String {
    let letters: String = name
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .collect();
    if letters.is_empty() {
        "U".to_string()
    } else {
        letters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initials_from_words() {
        assert_eq!(initials("ada lovelace"), "AL");
        assert_eq!(initials("  Grace   Brewster Hopper "), "GBH");
        assert_eq!(initials(""), "U");
    }

    #[test]
    fn role_from_labels() {
        assert_eq!(Role::from_labels(&["admin".to_string()]), Role::Admin);
        assert_eq!(Role::from_labels(&["Admin".to_string()]), Role::Member);
        assert_eq!(Role::from_labels(&[]), Role::Member);
    }

    #[test]
    fn user_defaults_missing_fields() {
        let user: User = serde_json::from_value(serde_json::json!({"$id": "u1"})).unwrap();
        assert!(user.labels.is_empty());
        assert_eq!(user.display_name(), "User");
        assert!(user.avatar_url().is_none());
    }
}
