use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::AccountDirectory;
use crate::domain::{Account, AccountId};
use crate::error::DirectoryError;

/// Process-local directory. Uniqueness checks and writes happen under one
/// write lock, so concurrent registrations of the same email cannot both win.
#[derive(Default)]
pub struct InMemoryAccountDirectory {
    accounts: RwLock<HashMap<AccountId, Account>>,
}

impl InMemoryAccountDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

fn email_taken(accounts: &HashMap<AccountId, Account>, email: &str, except: Option<&AccountId>) -> bool {
    accounts
        .values()
        .any(|a| a.email == email && Some(&a.id) != except)
}

#[async_trait]
impl AccountDirectory for InMemoryAccountDirectory {
    async fn create(&self, account: &Account) -> Result<(), DirectoryError> {
        let mut accounts = self.accounts.write().await;

        if email_taken(&accounts, &account.email, None) {
            return Err(DirectoryError::DuplicateEmail);
        }
        if accounts.contains_key(&account.id) {
            return Err(DirectoryError::Unexpected(format!(
                "account id {} already exists",
                account.id
            )));
        }

        accounts.insert(account.id.clone(), account.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: &AccountId) -> Result<Option<Account>, DirectoryError> {
        Ok(self.accounts.read().await.get(id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<Account>, DirectoryError> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|a| a.email == email)
            .cloned())
    }

    async fn get_all(&self) -> Result<Vec<Account>, DirectoryError> {
        let mut all: Vec<Account> = self.accounts.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn update(&self, account: &Account) -> Result<bool, DirectoryError> {
        let mut accounts = self.accounts.write().await;

        if !accounts.contains_key(&account.id) {
            return Ok(false);
        }
        if email_taken(&accounts, &account.email, Some(&account.id)) {
            return Err(DirectoryError::DuplicateEmail);
        }

        if let Some(stored) = accounts.get_mut(&account.id) {
            stored.name = account.name.clone();
            stored.email = account.email.clone();
            stored.password_hash = account.password_hash.clone();
            stored.updated_at = account.updated_at;
        }
        Ok(true)
    }

    async fn delete(&self, id: &AccountId) -> Result<bool, DirectoryError> {
        Ok(self.accounts.write().await.remove(id).is_some())
    }

    async fn count(&self) -> Result<u64, DirectoryError> {
        Ok(self.accounts.read().await.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn account(email: &str) -> Account {
        Account::new("Test User".to_string(), email.to_string(), "$2b$04$x".to_string(), Utc::now())
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let directory = InMemoryAccountDirectory::new();
        let ann = account("ann@x.com");
        directory.create(&ann).await.unwrap();

        assert_eq!(directory.get_by_id(&ann.id).await.unwrap(), Some(ann.clone()));
        assert_eq!(directory.get_by_email("ann@x.com").await.unwrap(), Some(ann));
        assert_eq!(directory.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_absent_is_not_an_error() {
        let directory = InMemoryAccountDirectory::new();

        assert_eq!(directory.get_by_id(&AccountId::from("missing")).await, Ok(None));
        assert_eq!(directory.get_by_email("nobody@x.com").await, Ok(None));
        assert_eq!(directory.delete(&AccountId::from("missing")).await, Ok(false));
        assert_eq!(directory.update(&account("ghost@x.com")).await, Ok(false));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let directory = InMemoryAccountDirectory::new();
        directory.create(&account("ann@x.com")).await.unwrap();

        assert_eq!(
            directory.create(&account("ann@x.com")).await,
            Err(DirectoryError::DuplicateEmail)
        );
        assert_eq!(directory.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let directory = InMemoryAccountDirectory::new();
        let mut ann = account("ann@x.com");
        directory.create(&ann).await.unwrap();

        ann.name = "Ann B".to_string();
        ann.updated_at = ann.updated_at + Duration::seconds(1);
        assert_eq!(directory.update(&ann).await, Ok(true));

        let stored = directory.get_by_id(&ann.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Ann B");
        assert_eq!(stored.updated_at, ann.updated_at);

        assert_eq!(directory.delete(&ann.id).await, Ok(true));
        assert_eq!(directory.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_cannot_steal_email() {
        let directory = InMemoryAccountDirectory::new();
        directory.create(&account("ann@x.com")).await.unwrap();
        let mut bob = account("bob@x.com");
        directory.create(&bob).await.unwrap();

        bob.email = "ann@x.com".to_string();
        assert_eq!(directory.update(&bob).await, Err(DirectoryError::DuplicateEmail));
    }

    #[tokio::test]
    async fn test_get_all_oldest_first() {
        let directory = InMemoryAccountDirectory::new();
        let now = Utc::now();
        let mut older = account("old@x.com");
        older.created_at = now - Duration::minutes(5);
        let mut newer = account("new@x.com");
        newer.created_at = now;

        directory.create(&newer).await.unwrap();
        directory.create(&older).await.unwrap();

        let emails: Vec<String> = directory
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.email)
            .collect();
        assert_eq!(emails, vec!["old@x.com", "new@x.com"]);
    }
}
