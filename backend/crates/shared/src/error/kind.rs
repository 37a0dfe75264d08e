//! Error Kind - Classification of errors
//!
//! Defines the [`ErrorKind`] enum: the transport-level status taxonomy shared
//! by every RPC surface. Each kind carries a canonical status name and the
//! HTTP status code it is served with.

use serde::Serialize;

/// Transport status of a failed call
///
/// Domain crates translate their own error enums into one of these kinds.
/// Only the transport layer turns a kind into a wire response.
///
/// ## Examples
/// ```rust
/// use kernel::error::kind::ErrorKind;
///
/// let kind = ErrorKind::NotFound;
/// assert_eq!(kind.status_code(), 404);
/// assert_eq!(kind.as_str(), "NOT_FOUND");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorKind {
    /// Malformed or missing input. Caller's fault, not retryable.
    InvalidArgument,
    /// Missing, wrong or no longer valid credentials.
    Unauthenticated,
    /// Referenced entity does not exist.
    NotFound,
    /// Entity being created already exists.
    AlreadyExists,
    /// A deadline elapsed before the call completed.
    DeadlineExceeded,
    /// Unexpected failure. Details stay in the server logs.
    Internal,
}

impl ErrorKind {
    /// HTTP status code used when the kind is served over HTTP
    ///
    /// ## Examples
    /// ```rust
    /// use kernel::error::kind::ErrorKind;
    /// assert_eq!(ErrorKind::InvalidArgument.status_code(), 400);
    /// assert_eq!(ErrorKind::AlreadyExists.status_code(), 409);
    /// ```
    #[inline]
    pub const fn status_code(&self) -> u16 {
        match self {
            ErrorKind::InvalidArgument => 400,
            ErrorKind::Unauthenticated => 401,
            ErrorKind::NotFound => 404,
            ErrorKind::AlreadyExists => 409,
            ErrorKind::Internal => 500,
            ErrorKind::DeadlineExceeded => 504,
        }
    }

    /// Canonical status name, as it appears in error bodies
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "INVALID_ARGUMENT",
            ErrorKind::Unauthenticated => "UNAUTHENTICATED",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::AlreadyExists => "ALREADY_EXISTS",
            ErrorKind::DeadlineExceeded => "DEADLINE_EXCEEDED",
            ErrorKind::Internal => "INTERNAL",
        }
    }

    /// Whether the failure is on the server side
    ///
    /// Server-side failures must be logged; their messages must not reach
    /// the caller.
    #[inline]
    pub const fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ErrorKind::InvalidArgument.status_code(), 400);
        assert_eq!(ErrorKind::Unauthenticated.status_code(), 401);
        assert_eq!(ErrorKind::NotFound.status_code(), 404);
        assert_eq!(ErrorKind::AlreadyExists.status_code(), 409);
        assert_eq!(ErrorKind::Internal.status_code(), 500);
        assert_eq!(ErrorKind::DeadlineExceeded.status_code(), 504);
    }

    #[test]
    fn test_is_server_error() {
        assert!(!ErrorKind::InvalidArgument.is_server_error());
        assert!(!ErrorKind::NotFound.is_server_error());
        assert!(ErrorKind::Internal.is_server_error());
        assert!(ErrorKind::DeadlineExceeded.is_server_error());
    }

    #[test]
    fn test_serialized_name_matches_as_str() {
        let json = serde_json::to_string(&ErrorKind::AlreadyExists).unwrap();
        assert_eq!(json, format!("\"{}\"", ErrorKind::AlreadyExists.as_str()));
    }
}
