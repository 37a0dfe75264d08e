//! Repository Traits
//!
//! Storage capabilities the auth service depends on. Implementations live in
//! the infrastructure layer and translate their driver errors into
//! [`StorageError`] so no driver type leaks into the domain.

use chrono::{DateTime, Utc};
use kernel::id::TokenId;
use platform::password::HashedPassword;
use thiserror::Error;

use crate::domain::entity::{app::App, user::User};
use crate::domain::value_object::{app_id::AppId, email::Email, user_id::UserId};

/// Storage failure as seen by the domain
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("user already exists")]
    UserExists,

    #[error("user not found")]
    UserNotFound,

    #[error("app not found")]
    AppNotFound,

    /// The call did not complete within its deadline
    #[error("storage timeout")]
    Timeout,

    /// Any other backend failure, driver type erased
    #[error("storage backend: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StorageError {
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        StorageError::Backend(Box::new(err))
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Persists new users
#[trait_variant::make(UserSaver: Send)]
pub trait LocalUserSaver {
    /// Store a user and return its new id
    ///
    /// Fails with [`StorageError::UserExists`] when the email is taken.
    async fn save_user(
        &self,
        email: &Email,
        password_hash: &HashedPassword,
    ) -> StorageResult<UserId>;
}

/// Reads users
#[trait_variant::make(UserProvider: Send)]
pub trait LocalUserProvider {
    /// Fails with [`StorageError::UserNotFound`]
    async fn user_by_email(&self, email: &Email) -> StorageResult<User>;

    /// Fails with [`StorageError::UserNotFound`]
    async fn is_admin(&self, user_id: &UserId) -> StorageResult<bool>;
}

/// Reads applications
#[trait_variant::make(AppProvider: Send)]
pub trait LocalAppProvider {
    /// Fails with [`StorageError::AppNotFound`]
    async fn app(&self, app_id: AppId) -> StorageResult<App>;
}

/// Records logged-out tokens until they would have expired anyway
#[trait_variant::make(RevocationStore: Send)]
pub trait LocalRevocationStore {
    /// Mark `jti` revoked until `until`. Revoking twice keeps the later bound.
    async fn revoke(&self, jti: TokenId, until: DateTime<Utc>) -> StorageResult<()>;

    /// Whether `jti` is revoked at `now`
    async fn is_revoked(&self, jti: TokenId, now: DateTime<Utc>) -> StorageResult<bool>;

    /// Drop records whose bound has passed; returns how many were removed
    async fn purge_expired(&self, now: DateTime<Utc>) -> StorageResult<u64>;
}

/// Everything the HTTP layer needs from a single storage backend
pub trait AuthStorage:
    UserSaver + UserProvider + AppProvider + RevocationStore + Send + Sync + 'static
{
}

impl<T> AuthStorage for T where
    T: UserSaver + UserProvider + AppProvider + RevocationStore + Send + Sync + 'static
{
}
