//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::id::TokenId;
use platform::password::HashedPassword;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{app::App, user::User};
use crate::domain::repository::{
    AppProvider, RevocationStore, StorageError, StorageResult, UserProvider, UserSaver,
};
use crate::domain::value_object::{
    app_id::AppId, app_secret::AppSecret, email::Email, user_id::UserId,
};

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Translate driver errors; nothing sqlx-specific crosses this boundary
fn storage_error(err: sqlx::Error) -> StorageError {
    if matches!(err, sqlx::Error::PoolTimedOut) {
        return StorageError::Timeout;
    }
    StorageError::backend(err)
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some("23505"),
        _ => false,
    }
}

/// `users.email` is the only unique column a new user can collide on
fn insert_user_error(err: sqlx::Error) -> StorageError {
    if is_unique_violation(&err) {
        StorageError::UserExists
    } else {
        storage_error(err)
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserSaver for PgAuthRepository {
    async fn save_user(
        &self,
        email: &Email,
        password_hash: &HashedPassword,
    ) -> StorageResult<UserId> {
        let user_id = UserId::new();

        sqlx::query(
            r#"
            INSERT INTO users (
                id,
                email,
                pass_hash
            ) VALUES ($1, $2, $3)
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(email.as_str())
        .bind(password_hash.as_phc_string())
        .execute(&self.pool)
        .await
        .map_err(insert_user_error)?;

        Ok(user_id)
    }
}

impl UserProvider for PgAuthRepository {
    async fn user_by_email(&self, email: &Email) -> StorageResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                id,
                email,
                pass_hash,
                is_admin
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        row.ok_or(StorageError::UserNotFound)?.into_user()
    }

    async fn is_admin(&self, user_id: &UserId) -> StorageResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT is_admin FROM users WHERE id = $1")
            .bind(user_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?
            .ok_or(StorageError::UserNotFound)
    }
}

// ============================================================================
// App Repository Implementation
// ============================================================================

impl AppProvider for PgAuthRepository {
    async fn app(&self, app_id: AppId) -> StorageResult<App> {
        let row = sqlx::query_as::<_, AppRow>(
            r#"
            SELECT
                id,
                name,
                secret
            FROM apps
            WHERE id = $1
            "#,
        )
        .bind(app_id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(row.ok_or(StorageError::AppNotFound)?.into_app())
    }
}

// ============================================================================
// Revocation Repository Implementation
// ============================================================================

impl RevocationStore for PgAuthRepository {
    async fn revoke(&self, jti: TokenId, until: DateTime<Utc>) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO revoked_tokens (jti, revoked_until)
            VALUES ($1, $2)
            ON CONFLICT (jti) DO UPDATE
                SET revoked_until = GREATEST(revoked_tokens.revoked_until, EXCLUDED.revoked_until)
            "#,
        )
        .bind(jti.as_uuid())
        .bind(until)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(())
    }

    async fn is_revoked(&self, jti: TokenId, now: DateTime<Utc>) -> StorageResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM revoked_tokens WHERE jti = $1 AND revoked_until > $2)",
        )
        .bind(jti.as_uuid())
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(storage_error)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> StorageResult<u64> {
        let deleted = sqlx::query("DELETE FROM revoked_tokens WHERE revoked_until <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?
            .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    pass_hash: String,
    is_admin: bool,
}

impl UserRow {
    fn into_user(self) -> StorageResult<User> {
        let password_hash =
            HashedPassword::from_phc_string(self.pass_hash).map_err(StorageError::backend)?;

        Ok(User {
            user_id: UserId::from_uuid(self.id),
            email: Email::from_db(self.email),
            password_hash,
            is_admin: self.is_admin,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AppRow {
    id: i32,
    name: String,
    secret: String,
}

impl AppRow {
    fn into_app(self) -> App {
        App::new(
            AppId::from_db(self.id),
            self.name,
            AppSecret::new(self.secret.into_bytes()),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;
    use std::error::Error as StdError;

    use super::*;

    #[derive(Debug)]
    struct FakeDbError {
        code: &'static str,
    }

    impl std::fmt::Display for FakeDbError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "database error {}", self.code)
        }
    }

    impl StdError for FakeDbError {}

    impl sqlx::error::DatabaseError for FakeDbError {
        fn message(&self) -> &str {
            "fake"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed(self.code))
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            match self.code {
                "23505" => sqlx::error::ErrorKind::UniqueViolation,
                _ => sqlx::error::ErrorKind::Other,
            }
        }
    }

    fn db_error(code: &'static str) -> sqlx::Error {
        sqlx::Error::Database(Box::new(FakeDbError { code }))
    }

    #[test]
    fn test_duplicate_email_maps_to_user_exists() {
        assert!(matches!(
            insert_user_error(db_error("23505")),
            StorageError::UserExists
        ));
    }

    #[test]
    fn test_other_constraint_violations_stay_backend_errors() {
        // not_null_violation
        assert!(matches!(
            insert_user_error(db_error("23502")),
            StorageError::Backend(_)
        ));
        assert!(matches!(
            insert_user_error(sqlx::Error::PoolTimedOut),
            StorageError::Timeout
        ));
    }

    #[test]
    fn test_pool_timeout_maps_to_timeout() {
        assert!(matches!(
            storage_error(sqlx::Error::PoolTimedOut),
            StorageError::Timeout
        ));
    }

    #[test]
    fn test_other_errors_are_erased() {
        let err = storage_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, StorageError::Backend(_)));
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }

    #[test]
    fn test_row_with_bad_hash_is_backend_error() {
        let row = UserRow {
            id: Uuid::new_v4(),
            email: "a@x.com".to_string(),
            pass_hash: "plaintext".to_string(),
            is_admin: false,
        };
        assert!(matches!(row.into_user(), Err(StorageError::Backend(_))));
    }

    #[test]
    fn test_app_row_secret_bytes() {
        let app = AppRow {
            id: 3,
            name: "cli".to_string(),
            secret: "s3cr3t".to_string(),
        }
        .into_app();
        assert_eq!(app.app_id.value(), 3);
        assert_eq!(app.secret.as_bytes(), b"s3cr3t");
    }
}
