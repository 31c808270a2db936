/// In-memory stores
///
/// Back the same traits as the Postgres stores with plain vectors under a
/// mutex. Used by the integration tests, where handler behavior is under
/// test rather than SQL.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{AppError, DatabaseError};
use crate::store::{RefreshTokenRecord, RefreshTokenStore, UserRecord, UserStore};

pub struct InMemoryUserStore {
    users: Mutex<Vec<UserRecord>>,
    next_id: AtomicI64,
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<UserRecord>>, AppError> {
        self.users
            .lock()
            .map_err(|_| AppError::Internal("User store lock poisoned".to_string()))
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, login: &str, password_hash: &str) -> Result<UserRecord, AppError> {
        let mut users = self.lock()?;

        if users.iter().any(|u| u.login == login) {
            return Err(AppError::Database(DatabaseError::UniqueConstraintViolation(
                "Login already registered".to_string(),
            )));
        }

        let user = UserRecord {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            login: login.to_string(),
            password_hash: password_hash.to_string(),
            is_active: false,
        };
        users.push(user.clone());

        Ok(user)
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<UserRecord>, AppError> {
        let users = self.lock()?;
        Ok(users.iter().find(|u| u.login == login).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, AppError> {
        let users = self.lock()?;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn activate(&self, id: i64) -> Result<(), AppError> {
        let mut users = self.lock()?;
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.is_active = true;
        }
        Ok(())
    }
}

pub struct InMemoryRefreshTokenStore {
    tokens: Mutex<Vec<RefreshTokenRecord>>,
    next_id: AtomicI64,
}

impl Default for InMemoryRefreshTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self {
            tokens: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<RefreshTokenRecord>>, AppError> {
        self.tokens
            .lock()
            .map_err(|_| AppError::Internal("Token store lock poisoned".to_string()))
    }

    /// Number of stored refresh-token records. Test observability hook.
    pub fn record_count(&self) -> usize {
        self.tokens.lock().map(|t| t.len()).unwrap_or(0)
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryRefreshTokenStore {
    async fn save(
        &self,
        user_id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut tokens = self.lock()?;
        tokens.push(RefreshTokenRecord {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            user_id,
            token_hash: token_hash.to_string(),
            expires_at,
        });
        Ok(())
    }

    async fn find(
        &self,
        user_id: i64,
        token_hash: &str,
    ) -> Result<Option<RefreshTokenRecord>, AppError> {
        let tokens = self.lock()?;
        let now = Utc::now();
        Ok(tokens
            .iter()
            .find(|t| t.user_id == user_id && t.token_hash == token_hash && t.expires_at > now)
            .cloned())
    }

    async fn replace(
        &self,
        token_id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut tokens = self.lock()?;
        if let Some(record) = tokens.iter_mut().find(|t| t.id == token_id) {
            record.token_hash = token_hash.to_string();
            record.expires_at = expires_at;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn create_rejects_duplicate_login() {
        let store = InMemoryUserStore::new();

        store.create("alice", "hash").await.expect("first create");
        let result = store.create("alice", "other-hash").await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn activate_flips_flag_and_is_idempotent() {
        let store = InMemoryUserStore::new();
        let user = store.create("bob", "hash").await.expect("create");
        assert!(!user.is_active);

        store.activate(user.id).await.expect("activate");
        store.activate(user.id).await.expect("repeat activate");

        let found = store.find_by_id(user.id).await.expect("find").unwrap();
        assert!(found.is_active);
    }

    #[tokio::test]
    async fn find_skips_expired_tokens() {
        let store = InMemoryRefreshTokenStore::new();
        store
            .save(1, "stale", Utc::now() - Duration::seconds(1))
            .await
            .expect("save");

        let found = store.find(1, "stale").await.expect("find");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn replace_overwrites_single_record() {
        let store = InMemoryRefreshTokenStore::new();
        let expiry = Utc::now() + Duration::days(7);
        store.save(1, "old-hash", expiry).await.expect("save");

        let record = store.find(1, "old-hash").await.expect("find").unwrap();
        store
            .replace(record.id, "new-hash", expiry)
            .await
            .expect("replace");

        assert!(store.find(1, "old-hash").await.expect("find").is_none());
        assert!(store.find(1, "new-hash").await.expect("find").is_some());
        assert_eq!(store.record_count(), 1);
    }

    #[tokio::test]
    async fn find_is_scoped_to_owner() {
        let store = InMemoryRefreshTokenStore::new();
        let expiry = Utc::now() + Duration::days(7);
        store.save(1, "hash", expiry).await.expect("save");

        assert!(store.find(2, "hash").await.expect("find").is_none());
    }
}
