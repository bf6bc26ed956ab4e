//! Read-through cache in front of user lookups.
//!
//! [`CachedUserRepository`] decorates any [`UserRepository`]. Single-user lookups are
//! served from the cache when possible; misses fall through to the wrapped store and
//! populate the cache in a background task. Cache failures are logged and never
//! surface to the caller.
//!
//! Invalidation bumps an epoch before deleting keys. A background write started under
//! an older epoch skips itself, or removes what it wrote if the bump lands mid-write,
//! so a lookup racing a `mark_verified` or `delete_user` cannot leave a stale entry. Listings (`users`, `project_users`) bypass the cache since
//! there is no invalidation path for them.

pub mod redis_client;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::error::AppError;
use crate::models::User;
use crate::repository::UserRepository;

pub use redis_client::RedisCache;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),
}

impl From<redis::RedisError> for CacheError {
    fn from(error: redis::RedisError) -> Self {
        CacheError::Backend(error.to_string())
    }
}

/// Minimal key-value store interface the cache layer needs.
#[async_trait]
pub trait CacheClient: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

fn id_key(id: i64) -> String {
    format!("user:{}", id)
}

fn email_key(email: &str) -> String {
    format!("user:{}", email)
}

pub struct CachedUserRepository {
    inner: Arc<dyn UserRepository>,
    cache: Arc<dyn CacheClient>,
    ttl: Duration,
    epoch: Arc<AtomicU64>,
}

impl CachedUserRepository {
    pub fn new(inner: Arc<dyn UserRepository>, cache: Arc<dyn CacheClient>, ttl: Duration) -> Self {
        Self {
            inner,
            cache,
            ttl,
            epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    fn current_epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    async fn lookup(&self, key: &str) -> Option<User> {
        match self.cache.get(key).await {
            Ok(Some(json)) => match serde_json::from_str::<User>(&json) {
                Ok(user) => {
                    log::debug!("cache hit for {}", key);
                    Some(user)
                }
                Err(e) => {
                    log::warn!("discarding undecodable cache entry {}: {}", key, e);
                    None
                }
            },
            Ok(None) => {
                log::debug!("cache miss for {}", key);
                None
            }
            Err(e) => {
                log::warn!("cache read failed for {}: {}", key, e);
                None
            }
        }
    }

    /// Writes both keys for `user` without waiting for the result. `read_epoch` must be
    /// taken before `user` was read from the store.
    fn populate(&self, user: &User, read_epoch: u64) {
        let cache = Arc::clone(&self.cache);
        let epoch = Arc::clone(&self.epoch);
        let ttl = self.ttl;
        let keys = [id_key(user.id), email_key(&user.email)];
        let payload = serde_json::to_string(user);

        tokio::spawn(async move {
            let json = match payload {
                Ok(json) => json,
                Err(e) => {
                    log::warn!("failed to encode user for cache: {}", e);
                    return;
                }
            };
            if epoch.load(Ordering::SeqCst) != read_epoch {
                log::debug!("skipping cache write for {}: invalidated meanwhile", keys[0]);
                return;
            }
            for key in &keys {
                if let Err(e) = cache.set(key, &json, ttl).await {
                    log::warn!("cache write failed for {}: {}", key, e);
                }
            }
            if epoch.load(Ordering::SeqCst) != read_epoch {
                for key in &keys {
                    if let Err(e) = cache.delete(key).await {
                        log::warn!("cache cleanup failed for {}: {}", key, e);
                    }
                }
            }
        });
    }

    async fn invalidate(&self, id: i64, email: Option<&str>) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        let mut keys = vec![id_key(id)];
        keys.extend(email.map(email_key));
        for key in keys {
            if let Err(e) = self.cache.delete(&key).await {
                log::warn!("cache invalidation failed for {}: {}", key, e);
            }
        }
    }

    /// Best-effort email lookup so both keys of a user can be invalidated.
    async fn known_email(&self, id: i64) -> Option<String> {
        self.inner.user_by_id(id).await.ok().map(|user| user.email)
    }
}

#[async_trait]
impl UserRepository for CachedUserRepository {
    async fn create_user(&self, user: User) -> Result<User, AppError> {
        let epoch = self.current_epoch();
        let user = self.inner.create_user(user).await?;
        self.populate(&user, epoch);
        Ok(user)
    }

    async fn delete_user(&self, id: i64) -> Result<(), AppError> {
        let email = self.known_email(id).await;
        self.inner.delete_user(id).await?;
        self.invalidate(id, email.as_deref()).await;
        Ok(())
    }

    async fn user_by_id(&self, id: i64) -> Result<User, AppError> {
        if let Some(user) = self.lookup(&id_key(id)).await {
            return Ok(user);
        }
        let epoch = self.current_epoch();
        let user = self.inner.user_by_id(id).await?;
        self.populate(&user, epoch);
        Ok(user)
    }

    async fn user_by_email(&self, email: &str) -> Result<User, AppError> {
        if let Some(user) = self.lookup(&email_key(email)).await {
            return Ok(user);
        }
        let epoch = self.current_epoch();
        let user = self.inner.user_by_email(email).await?;
        self.populate(&user, epoch);
        Ok(user)
    }

    async fn users(&self) -> Result<Vec<User>, AppError> {
        self.inner.users().await
    }

    async fn project_users(&self, project_id: i64) -> Result<Vec<User>, AppError> {
        self.inner.project_users(project_id).await
    }

    async fn mark_verified(&self, id: i64) -> Result<(), AppError> {
        let email = self.known_email(id).await;
        self.inner.mark_verified(id).await?;
        self.invalidate(id, email.as_deref()).await;
        Ok(())
    }
}
