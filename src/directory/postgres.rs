use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::AccountDirectory;
use crate::domain::{Account, AccountId};
use crate::error::DirectoryError;

/// Directory backed by the `users` table (see `migrations/`).
/// Email uniqueness is enforced by the table's unique constraint.
#[derive(Clone)]
pub struct PgAccountDirectory {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: String,
    name: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Account {
            id: AccountId::from(row.id),
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl PgAccountDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountDirectory for PgAccountDirectory {
    async fn create(&self, account: &Account) -> Result<(), DirectoryError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(account.id.as_str())
        .bind(&account.name)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_by_id(&self, id: &AccountId) -> Result<Option<Account>, DirectoryError> {
        let row = sqlx::query_as::<_, AccountRow>(
            "SELECT id, name, email, password_hash, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Account::from))
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<Account>, DirectoryError> {
        let row = sqlx::query_as::<_, AccountRow>(
            "SELECT id, name, email, password_hash, created_at, updated_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Account::from))
    }

    async fn get_all(&self) -> Result<Vec<Account>, DirectoryError> {
        let rows = sqlx::query_as::<_, AccountRow>(
            "SELECT id, name, email, password_hash, created_at, updated_at FROM users ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Account::from).collect())
    }

    async fn update(&self, account: &Account) -> Result<bool, DirectoryError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = $1, email = $2, password_hash = $3, updated_at = $4
            WHERE id = $5
            "#,
        )
        .bind(&account.name)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.updated_at)
        .bind(account.id.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: &AccountId) -> Result<bool, DirectoryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<u64, DirectoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as u64)
    }
}
