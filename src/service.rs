/// Account service: registration, authentication, login and the account
/// pass-throughs, written against the `AccountDirectory` contract.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::OnceCell;

use crate::auth::{CredentialHasher, TokenService};
use crate::directory::AccountDirectory;
use crate::domain::{Account, AccountId};
use crate::error::{AppError, HashError};

// Only ever verified against, never stored
const DUMMY_PASSWORD: &str = "dummy-password-for-unknown-accounts";

pub struct AccountService {
    directory: Arc<dyn AccountDirectory>,
    hasher: CredentialHasher,
    tokens: Arc<TokenService>,
    dummy_hash: OnceCell<String>,
}

impl AccountService {
    pub fn new(
        directory: Arc<dyn AccountDirectory>,
        hasher: CredentialHasher,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            directory,
            hasher,
            tokens,
            dummy_hash: OnceCell::new(),
        }
    }

    pub fn tokens(&self) -> &Arc<TokenService> {
        &self.tokens
    }

    /// Register a new account
    ///
    /// The email lookup happens before any hashing work. The directory also
    /// enforces uniqueness on insert, so a concurrent registration that slips
    /// past the lookup still ends in `DuplicateAccount`.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Account, AppError> {
        if self.directory.get_by_email(email).await?.is_some() {
            return Err(AppError::DuplicateAccount);
        }

        let password_hash = self.hash_password(password).await?;
        let account = Account::new(name.to_string(), email.to_string(), password_hash, Utc::now());

        self.directory.create(&account).await?;

        tracing::info!(user_id = %account.id, "Account registered");
        Ok(account)
    }

    /// Check an email/password pair
    ///
    /// Unknown email and wrong password are both `InvalidCredentials`, and both
    /// pay for one bcrypt verification.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Account, AppError> {
        let account = match self.directory.get_by_email(email).await? {
            Some(account) => account,
            None => {
                self.verify_against_dummy(password).await;
                return Err(AppError::InvalidCredentials);
            }
        };

        match self.verify_password(password, &account.password_hash).await {
            Ok(true) => Ok(account),
            Ok(false) => Err(AppError::InvalidCredentials),
            Err(HashError::MalformedHash) => {
                tracing::error!(user_id = %account.id, "Stored password hash is malformed");
                Err(AppError::InvalidCredentials)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Authenticate, then issue a session token for the account
    pub async fn login(&self, email: &str, password: &str) -> Result<(String, Account), AppError> {
        let account = self.authenticate(email, password).await?;
        let token = self.tokens.issue(account.id.as_str(), &account.email)?;

        tracing::info!(user_id = %account.id, "Session token issued");
        Ok((token, account))
    }

    pub async fn get_by_id(&self, id: &AccountId) -> Result<Option<Account>, AppError> {
        Ok(self.directory.get_by_id(id).await?)
    }

    pub async fn get_all(&self) -> Result<Vec<Account>, AppError> {
        Ok(self.directory.get_all().await?)
    }

    /// Persist changes to an account, bumping its update timestamp.
    /// Returns `false` if the account no longer exists.
    pub async fn update(&self, account: &mut Account) -> Result<bool, AppError> {
        account.touch(Utc::now());
        Ok(self.directory.update(account).await?)
    }

    /// Apply a partial profile change. `None` leaves a field untouched.
    pub async fn update_profile(
        &self,
        id: &AccountId,
        name: Option<String>,
        email: Option<String>,
    ) -> Result<Account, AppError> {
        let mut account = self
            .directory
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        if let Some(name) = name {
            account.name = name;
        }
        if let Some(email) = email {
            account.email = email;
        }

        if !self.update(&mut account).await? {
            return Err(AppError::NotFound("User".to_string()));
        }

        tracing::info!(user_id = %account.id, "Account updated");
        Ok(account)
    }

    pub async fn delete(&self, id: &AccountId) -> Result<bool, AppError> {
        let deleted = self.directory.delete(id).await?;
        if deleted {
            tracing::info!(user_id = %id, "Account deleted");
        }
        Ok(deleted)
    }

    pub async fn count(&self) -> Result<u64, AppError> {
        Ok(self.directory.count().await?)
    }

    // bcrypt is deliberately slow; keep it off the async workers.
    async fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let hasher = self.hasher;
        let password = password.to_string();

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::HashingFailure(e.to_string()))?
            .map_err(AppError::from)
    }

    // Prepared on first use at the configured cost
    async fn verify_against_dummy(&self, password: &str) {
        let dummy = self
            .dummy_hash
            .get_or_try_init(|| self.hash_password(DUMMY_PASSWORD))
            .await;

        match dummy {
            Ok(hash) => {
                let _ = self.verify_password(password, hash).await;
            }
            Err(e) => tracing::error!(error = %e, "Failed to prepare dummy password hash"),
        }
    }

    async fn verify_password(&self, password: &str, stored_hash: &str) -> Result<bool, HashError> {
        let hasher = self.hasher;
        let password = password.to_string();
        let stored_hash = stored_hash.to_string();

        tokio::task::spawn_blocking(move || hasher.verify(&password, &stored_hash))
            .await
            .map_err(|e| HashError::Failure(e.to_string()))?
    }
}
