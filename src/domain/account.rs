use std::fmt;

use chrono::{DateTime, Utc};

/// Opaque account identifier
///
/// Storage backends may use any key encoding that round-trips through a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId(String);

impl AccountId {
    /// A fresh random identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for AccountId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for AccountId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A registered account
///
/// Carries the password hash, so it is deliberately not `Serialize`;
/// the HTTP layer converts it into a response type that omits the hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn new(name: String, email: String, password_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            id: AccountId::generate(),
            name,
            email,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_new_account() {
        let now = Utc::now();
        let account = Account::new(
            "John Doe".to_string(),
            "john@example.com".to_string(),
            "$2b$04$hash".to_string(),
            now,
        );

        assert_eq!(account.name, "John Doe");
        assert_eq!(account.email, "john@example.com");
        assert_eq!(account.created_at, now);
        assert_eq!(account.updated_at, now);
        assert!(!account.id.as_str().is_empty());
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(AccountId::generate(), AccountId::generate());
    }

    #[test]
    fn test_touch_moves_only_update_timestamp() {
        let created = Utc::now();
        let mut account = Account::new("Jane".into(), "jane@test.com".into(), "h".into(), created);

        let later = created + Duration::seconds(5);
        account.touch(later);

        assert_eq!(account.created_at, created);
        assert_eq!(account.updated_at, later);
    }
}
