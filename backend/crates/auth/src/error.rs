//! Auth Error Types
//!
//! Domain error taxonomy of the auth service, the operation wrapper that
//! carries diagnostics context, and the mapping onto the unified
//! `kernel::error::AppError` wire error.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::password::{PasswordHashError, PasswordPolicyError};
use thiserror::Error;

use crate::domain::repository::StorageError;
use crate::domain::token::TokenError;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Result of a named auth operation
pub type OpResult<T> = Result<T, OperationError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed or missing request field
    #[error("{0}")]
    Validation(String),

    /// Wrong email/password pair. Never says which half was wrong.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Email already registered
    #[error("user already exists")]
    UserExists,

    /// User not found
    #[error("user not found")]
    UserNotFound,

    /// Application not found
    #[error("app not found")]
    AppNotFound,

    /// Token is malformed, badly signed or bound to an unknown application
    #[error("token is invalid")]
    TokenInvalid,

    /// Token is past its expiry
    #[error("token has expired")]
    TokenExpired,

    /// Token was revoked by logout
    #[error("token has been revoked")]
    TokenRevoked,

    /// Storage did not answer within the configured deadline
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the transport status for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Validation(_) => ErrorKind::InvalidArgument,
            AuthError::InvalidCredentials
            | AuthError::TokenInvalid
            | AuthError::TokenExpired
            | AuthError::TokenRevoked => ErrorKind::Unauthenticated,
            AuthError::UserExists => ErrorKind::AlreadyExists,
            AuthError::UserNotFound | AuthError::AppNotFound => ErrorKind::NotFound,
            AuthError::DeadlineExceeded => ErrorKind::DeadlineExceeded,
            AuthError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Convert to the wire error
    ///
    /// Internal detail is replaced by a generic message.
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::Internal(_) => AppError::internal(),
            other => AppError::new(other.kind(), other.to_string()),
        }
    }

    fn log(&self, op: &str) {
        if self.kind().is_server_error() {
            tracing::error!(op, error = %self, "Auth operation failed");
        } else if matches!(self, AuthError::InvalidCredentials) {
            tracing::warn!(op, "Invalid login attempt");
        } else {
            tracing::debug!(op, error = %self, "Auth error");
        }
    }
}

impl From<StorageError> for AuthError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::UserExists => AuthError::UserExists,
            StorageError::UserNotFound => AuthError::UserNotFound,
            StorageError::AppNotFound => AuthError::AppNotFound,
            StorageError::Timeout => AuthError::DeadlineExceeded,
            StorageError::Backend(e) => AuthError::Internal(e.to_string()),
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AuthError::TokenExpired,
            TokenError::Malformed | TokenError::BadSignature | TokenError::AppMismatch => {
                AuthError::TokenInvalid
            }
            TokenError::Signing(msg) => AuthError::Internal(format!("token signing: {msg}")),
        }
    }
}

impl From<PasswordPolicyError> for AuthError {
    fn from(err: PasswordPolicyError) -> Self {
        match err {
            PasswordPolicyError::Empty => AuthError::Validation("password is required".to_string()),
        }
    }
}

impl From<PasswordHashError> for AuthError {
    fn from(err: PasswordHashError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

// ============================================================================
// Operation context
// ============================================================================

/// An [`AuthError`] annotated with the operation that produced it
///
/// The wrapped kind is preserved so callers can still tell
/// `InvalidCredentials` from `Internal` after the wrap.
#[derive(Debug, Error)]
#[error("{op}: {error}")]
pub struct OperationError {
    op: &'static str,
    #[source]
    error: AuthError,
}

impl OperationError {
    pub fn new(op: &'static str, error: impl Into<AuthError>) -> Self {
        Self {
            op,
            error: error.into(),
        }
    }

    pub fn op(&self) -> &'static str {
        self.op
    }

    pub fn error(&self) -> &AuthError {
        &self.error
    }

    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}

impl IntoResponse for OperationError {
    fn into_response(self) -> Response {
        self.error.log(self.op);
        self.error.to_app_error().into_response()
    }
}

/// Attach an operation name to any error convertible into [`AuthError`]
pub trait WithOp<T> {
    fn with_op(self, op: &'static str) -> OpResult<T>;
}

impl<T, E> WithOp<T> for Result<T, E>
where
    E: Into<AuthError>,
{
    fn with_op(self, op: &'static str) -> OpResult<T> {
        self.map_err(|e| OperationError::new(op, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let cases = [
            (AuthError::Validation("x".into()), ErrorKind::InvalidArgument),
            (AuthError::InvalidCredentials, ErrorKind::Unauthenticated),
            (AuthError::TokenInvalid, ErrorKind::Unauthenticated),
            (AuthError::TokenExpired, ErrorKind::Unauthenticated),
            (AuthError::TokenRevoked, ErrorKind::Unauthenticated),
            (AuthError::UserExists, ErrorKind::AlreadyExists),
            (AuthError::UserNotFound, ErrorKind::NotFound),
            (AuthError::AppNotFound, ErrorKind::NotFound),
            (AuthError::DeadlineExceeded, ErrorKind::DeadlineExceeded),
            (AuthError::Internal("x".into()), ErrorKind::Internal),
        ];
        for (error, kind) in cases {
            assert_eq!(error.kind(), kind, "{error:?}");
        }
    }

    #[test]
    fn test_internal_detail_not_exposed() {
        let app_error = AuthError::Internal("pool exhausted at 10.0.0.5".into()).to_app_error();
        assert_eq!(app_error.message(), "internal error");
    }

    #[test]
    fn test_storage_error_conversion() {
        assert!(matches!(
            AuthError::from(StorageError::UserExists),
            AuthError::UserExists
        ));
        assert!(matches!(
            AuthError::from(StorageError::Timeout),
            AuthError::DeadlineExceeded
        ));
        let backend = StorageError::backend(std::io::Error::other("boom"));
        assert!(matches!(AuthError::from(backend), AuthError::Internal(_)));
    }

    #[test]
    fn test_token_error_conversion() {
        assert!(matches!(
            AuthError::from(TokenError::Expired),
            AuthError::TokenExpired
        ));
        assert!(matches!(
            AuthError::from(TokenError::BadSignature),
            AuthError::TokenInvalid
        ));
        assert!(matches!(
            AuthError::from(TokenError::Signing("no key".into())),
            AuthError::Internal(_)
        ));
    }

    #[test]
    fn test_with_op_preserves_kind() {
        let result: Result<(), StorageError> = Err(StorageError::UserNotFound);
        let err = result.with_op("auth.IsAdmin").unwrap_err();

        assert_eq!(err.op(), "auth.IsAdmin");
        assert!(matches!(err.error(), AuthError::UserNotFound));
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "auth.IsAdmin: user not found");
    }
}
