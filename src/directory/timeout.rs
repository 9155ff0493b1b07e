use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::AccountDirectory;
use crate::domain::{Account, AccountId};
use crate::error::DirectoryError;

pub const DEFAULT_DIRECTORY_TIMEOUT: Duration = Duration::from_secs(10);

/// Bounds every call to the wrapped directory by a deadline.
/// No retries: a timed-out call fails with `DirectoryError::Timeout`.
pub struct TimeoutDirectory {
    inner: Arc<dyn AccountDirectory>,
    timeout: Duration,
}

impl TimeoutDirectory {
    pub fn new(inner: Arc<dyn AccountDirectory>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> Result<T, DirectoryError>
    where
        F: Future<Output = Result<T, DirectoryError>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!(
                    operation,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Directory call timed out"
                );
                Err(DirectoryError::Timeout(self.timeout))
            }
        }
    }
}

#[async_trait]
impl AccountDirectory for TimeoutDirectory {
    async fn create(&self, account: &Account) -> Result<(), DirectoryError> {
        self.bounded("create", self.inner.create(account)).await
    }

    async fn get_by_id(&self, id: &AccountId) -> Result<Option<Account>, DirectoryError> {
        self.bounded("get_by_id", self.inner.get_by_id(id)).await
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<Account>, DirectoryError> {
        self.bounded("get_by_email", self.inner.get_by_email(email)).await
    }

    async fn get_all(&self) -> Result<Vec<Account>, DirectoryError> {
        self.bounded("get_all", self.inner.get_all()).await
    }

    async fn update(&self, account: &Account) -> Result<bool, DirectoryError> {
        self.bounded("update", self.inner.update(account)).await
    }

    async fn delete(&self, id: &AccountId) -> Result<bool, DirectoryError> {
        self.bounded("delete", self.inner.delete(id)).await
    }

    async fn count(&self) -> Result<u64, DirectoryError> {
        self.bounded("count", self.inner.count()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::InMemoryAccountDirectory;

    /// Directory whose calls never finish in time
    struct StalledDirectory;

    #[async_trait]
    impl AccountDirectory for StalledDirectory {
        async fn create(&self, _: &Account) -> Result<(), DirectoryError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        }
        async fn get_by_id(&self, _: &AccountId) -> Result<Option<Account>, DirectoryError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(None)
        }
        async fn get_by_email(&self, _: &str) -> Result<Option<Account>, DirectoryError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(None)
        }
        async fn get_all(&self) -> Result<Vec<Account>, DirectoryError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Vec::new())
        }
        async fn update(&self, _: &Account) -> Result<bool, DirectoryError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(false)
        }
        async fn delete(&self, _: &AccountId) -> Result<bool, DirectoryError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(false)
        }
        async fn count(&self) -> Result<u64, DirectoryError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(0)
        }
    }

    #[tokio::test]
    async fn test_stalled_call_times_out() {
        let timeout = Duration::from_millis(20);
        let directory = TimeoutDirectory::new(Arc::new(StalledDirectory), timeout);

        assert_eq!(directory.count().await, Err(DirectoryError::Timeout(timeout)));
        assert_eq!(
            directory.get_by_email("ann@x.com").await,
            Err(DirectoryError::Timeout(timeout))
        );
    }

    #[tokio::test]
    async fn test_fast_call_passes_through() {
        let directory = TimeoutDirectory::new(
            Arc::new(InMemoryAccountDirectory::new()),
            DEFAULT_DIRECTORY_TIMEOUT,
        );

        assert_eq!(directory.count().await, Ok(0));
    }
}
