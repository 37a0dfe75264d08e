//! In-Memory Repository Implementations
//!
//! Process-local storage for tests and single-node local runs. State is
//! shared between clones.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::id::TokenId;
use platform::password::HashedPassword;
use tokio::sync::RwLock;

use crate::domain::entity::{app::App, user::User};
use crate::domain::repository::{
    AppProvider, RevocationStore, StorageError, StorageResult, UserProvider, UserSaver,
};
use crate::domain::value_object::{app_id::AppId, email::Email, user_id::UserId};

#[derive(Debug, Default)]
struct MemoryState {
    users: HashMap<UserId, User>,
    /// Unique index on email
    emails: HashMap<String, UserId>,
    apps: HashMap<AppId, App>,
}

/// In-memory users and apps, plus a revocation list
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuthRepository {
    state: Arc<RwLock<MemoryState>>,
    revocations: InMemoryRevocationStore,
}

impl InMemoryAuthRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provision an application (replaces one with the same id)
    pub async fn insert_app(&self, app: App) {
        self.state.write().await.apps.insert(app.app_id, app);
    }

    /// Grant or withdraw the admin flag
    pub async fn set_admin(&self, user_id: &UserId, is_admin: bool) -> StorageResult<()> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .get_mut(user_id)
            .ok_or(StorageError::UserNotFound)?;
        user.is_admin = is_admin;
        Ok(())
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserSaver for InMemoryAuthRepository {
    async fn save_user(
        &self,
        email: &Email,
        password_hash: &HashedPassword,
    ) -> StorageResult<UserId> {
        let mut state = self.state.write().await;

        if state.emails.contains_key(email.as_str()) {
            return Err(StorageError::UserExists);
        }

        let user = User::new(email.clone(), password_hash.clone());
        let user_id = user.user_id;
        state.emails.insert(email.as_str().to_string(), user_id);
        state.users.insert(user_id, user);

        Ok(user_id)
    }
}

impl UserProvider for InMemoryAuthRepository {
    async fn user_by_email(&self, email: &Email) -> StorageResult<User> {
        let state = self.state.read().await;
        state
            .emails
            .get(email.as_str())
            .and_then(|id| state.users.get(id))
            .cloned()
            .ok_or(StorageError::UserNotFound)
    }

    async fn is_admin(&self, user_id: &UserId) -> StorageResult<bool> {
        let state = self.state.read().await;
        state
            .users
            .get(user_id)
            .map(|user| user.is_admin)
            .ok_or(StorageError::UserNotFound)
    }
}

// ============================================================================
// App Repository Implementation
// ============================================================================

impl AppProvider for InMemoryAuthRepository {
    async fn app(&self, app_id: AppId) -> StorageResult<App> {
        self.state
            .read()
            .await
            .apps
            .get(&app_id)
            .cloned()
            .ok_or(StorageError::AppNotFound)
    }
}

impl RevocationStore for InMemoryAuthRepository {
    async fn revoke(&self, jti: TokenId, until: DateTime<Utc>) -> StorageResult<()> {
        self.revocations.revoke(jti, until).await
    }

    async fn is_revoked(&self, jti: TokenId, now: DateTime<Utc>) -> StorageResult<bool> {
        self.revocations.is_revoked(jti, now).await
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> StorageResult<u64> {
        self.revocations.purge_expired(now).await
    }
}

// ============================================================================
// Revocation list
// ============================================================================

/// `jti -> revoked_until`, evicted once the token would have expired anyway
#[derive(Debug, Clone, Default)]
pub struct InMemoryRevocationStore {
    revoked: Arc<RwLock<HashMap<TokenId, DateTime<Utc>>>>,
}

impl InMemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.revoked.read().await.len()
    }
}

impl RevocationStore for InMemoryRevocationStore {
    async fn revoke(&self, jti: TokenId, until: DateTime<Utc>) -> StorageResult<()> {
        let mut revoked = self.revoked.write().await;
        revoked
            .entry(jti)
            .and_modify(|existing| *existing = (*existing).max(until))
            .or_insert(until);
        Ok(())
    }

    async fn is_revoked(&self, jti: TokenId, now: DateTime<Utc>) -> StorageResult<bool> {
        Ok(self
            .revoked
            .read()
            .await
            .get(&jti)
            .is_some_and(|until| *until > now))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> StorageResult<u64> {
        let mut revoked = self.revoked.write().await;
        let before = revoked.len();
        revoked.retain(|_, until| *until > now);
        Ok((before - revoked.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::app_secret::AppSecret;
    use chrono::Duration;

    const PHC: &str = "$argon2id$v=19$m=8,t=1,p=1$c2FsdHNhbHQ$YWJjZGVmZ2hpamtsbW5vcA";

    fn hash() -> HashedPassword {
        HashedPassword::from_phc_string(PHC).unwrap()
    }

    fn email(s: &str) -> Email {
        Email::new(s).unwrap()
    }

    #[tokio::test]
    async fn test_save_and_find_user() {
        let repo = InMemoryAuthRepository::new();
        let id = repo.save_user(&email("a@x.com"), &hash()).await.unwrap();

        let user = repo.user_by_email(&email("a@x.com")).await.unwrap();
        assert_eq!(user.user_id, id);
        assert!(!user.is_admin);
        assert!(!repo.is_admin(&id).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let repo = InMemoryAuthRepository::new();
        let first = repo.save_user(&email("a@x.com"), &hash()).await.unwrap();

        let second = repo.save_user(&email("a@x.com"), &hash()).await;
        assert!(matches!(second, Err(StorageError::UserExists)));

        let user = repo.user_by_email(&email("a@x.com")).await.unwrap();
        assert_eq!(user.user_id, first);
    }

    #[tokio::test]
    async fn test_email_lookup_is_exact() {
        let repo = InMemoryAuthRepository::new();
        repo.save_user(&email("a@x.com"), &hash()).await.unwrap();

        let result = repo.user_by_email(&email("A@x.com")).await;
        assert!(matches!(result, Err(StorageError::UserNotFound)));
    }

    #[tokio::test]
    async fn test_is_admin() {
        let repo = InMemoryAuthRepository::new();
        let id = repo.save_user(&email("a@x.com"), &hash()).await.unwrap();
        repo.set_admin(&id, true).await.unwrap();
        assert!(repo.is_admin(&id).await.unwrap());

        let missing = repo.is_admin(&UserId::new()).await;
        assert!(matches!(missing, Err(StorageError::UserNotFound)));
    }

    #[tokio::test]
    async fn test_app_lookup() {
        let repo = InMemoryAuthRepository::new();
        let app_id = AppId::new(1).unwrap();
        repo.insert_app(App::new(app_id, "web", AppSecret::new(b"k".to_vec())))
            .await;

        assert_eq!(repo.app(app_id).await.unwrap().name, "web");
        let missing = repo.app(AppId::new(2).unwrap()).await;
        assert!(matches!(missing, Err(StorageError::AppNotFound)));
    }

    #[tokio::test]
    async fn test_revocation_lifecycle() {
        let store = InMemoryRevocationStore::new();
        let now = Utc::now();
        let jti = TokenId::new();

        assert!(!store.is_revoked(jti, now).await.unwrap());

        store.revoke(jti, now + Duration::hours(1)).await.unwrap();
        assert!(store.is_revoked(jti, now).await.unwrap());
        assert!(!store.is_revoked(TokenId::new(), now).await.unwrap());

        // Past the bound the record no longer matters and is purged
        let later = now + Duration::hours(2);
        assert!(!store.is_revoked(jti, later).await.unwrap());
        assert_eq!(store.purge_expired(later).await.unwrap(), 1);
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_revoke_twice_keeps_later_bound() {
        let store = InMemoryRevocationStore::new();
        let now = Utc::now();
        let jti = TokenId::new();

        store.revoke(jti, now + Duration::hours(2)).await.unwrap();
        store.revoke(jti, now + Duration::hours(1)).await.unwrap();

        assert!(store
            .is_revoked(jti, now + Duration::minutes(90))
            .await
            .unwrap());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_purge_keeps_live_records() {
        let store = InMemoryRevocationStore::new();
        let now = Utc::now();

        store.revoke(TokenId::new(), now - Duration::seconds(1)).await.unwrap();
        store.revoke(TokenId::new(), now + Duration::hours(1)).await.unwrap();

        assert_eq!(store.purge_expired(now).await.unwrap(), 1);
        assert_eq!(store.len().await, 1);
    }
}
