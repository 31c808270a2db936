/// Persistence layer
///
/// `UserStore` owns user records, `RefreshTokenStore` owns issued refresh
/// tokens. Handlers only see these traits; the Postgres implementations
/// live in `postgres`, and `memory` provides an in-process implementation
/// used by the integration tests.

mod memory;
mod postgres;

pub use memory::{InMemoryRefreshTokenStore, InMemoryUserStore};
pub use postgres::{PgRefreshTokenStore, PgUserStore};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::error::AppError;

/// A registered user. Created inactive; `is_active` flips on activation.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub login: String,
    pub password_hash: String,
    pub is_active: bool,
}

/// One issued refresh token. The token itself is stored as a SHA-256
/// digest, never in plaintext. Rotation overwrites the row in place.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefreshTokenRecord {
    pub id: i64,
    pub user_id: i64,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}

/// Digest a refresh token for at-rest storage and lookup.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new, inactive user. Fails on duplicate login.
    async fn create(&self, login: &str, password_hash: &str) -> Result<UserRecord, AppError>;

    async fn find_by_login(&self, login: &str) -> Result<Option<UserRecord>, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, AppError>;

    /// Mark a user active. Updating an already-active user is a no-op.
    async fn activate(&self, id: i64) -> Result<(), AppError>;
}

#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    async fn save(
        &self,
        user_id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError>;

    /// Look up an unexpired token by owner and digest. The lookup is
    /// user-scoped so a token can never match a record it does not own.
    async fn find(
        &self,
        user_id: i64,
        token_hash: &str,
    ) -> Result<Option<RefreshTokenRecord>, AppError>;

    /// Overwrite the record identified by `token_id` with a new digest and
    /// expiry. At most one row changes per call.
    async fn replace(
        &self,
        token_id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError>;
}
