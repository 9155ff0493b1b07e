/// Account Directory
///
/// The storage contract the account service is written against. Absence is
/// reported as `Ok(None)` / `Ok(false)`, never as an error, and every
/// implementation enforces email uniqueness itself.

mod memory;
mod postgres;
mod timeout;

pub use memory::InMemoryAccountDirectory;
pub use postgres::PgAccountDirectory;
pub use timeout::{TimeoutDirectory, DEFAULT_DIRECTORY_TIMEOUT};

use async_trait::async_trait;

use crate::domain::{Account, AccountId};
use crate::error::DirectoryError;

#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Store a new account. Fails with `DuplicateEmail` if the email is taken.
    async fn create(&self, account: &Account) -> Result<(), DirectoryError>;

    async fn get_by_id(&self, id: &AccountId) -> Result<Option<Account>, DirectoryError>;

    async fn get_by_email(&self, email: &str) -> Result<Option<Account>, DirectoryError>;

    /// All accounts, oldest first
    async fn get_all(&self) -> Result<Vec<Account>, DirectoryError>;

    /// Overwrite the mutable fields of an existing account.
    /// Returns `false` when no account has this id.
    async fn update(&self, account: &Account) -> Result<bool, DirectoryError>;

    /// Returns `false` when no account has this id
    async fn delete(&self, id: &AccountId) -> Result<bool, DirectoryError>;

    async fn count(&self) -> Result<u64, DirectoryError>;
}
