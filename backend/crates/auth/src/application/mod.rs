//! Application Layer
//!
//! Use cases and application services.

use std::future::Future;
use std::time::Duration;

use crate::domain::repository::{StorageError, StorageResult};
use crate::error::{AuthError, AuthResult};

pub mod config;
pub mod is_admin;
pub mod login;
pub mod logout;
pub mod register;
pub mod verify_token;

// Re-exports
pub use config::AuthConfig;
pub use is_admin::IsAdminUseCase;
pub use login::{LoginInput, LoginUseCase};
pub use logout::LogoutUseCase;
pub use register::{RegisterInput, RegisterUseCase};
pub use verify_token::VerifyTokenUseCase;

/// Operation names attached to every error
pub mod ops {
    pub const REGISTER: &str = "auth.RegisterNewUser";
    pub const LOGIN: &str = "auth.Login";
    pub const IS_ADMIN: &str = "auth.IsAdmin";
    pub const LOGOUT: &str = "auth.Logout";
    pub const VERIFY_TOKEN: &str = "auth.VerifyToken";
}

/// Bound a storage call by `timeout`
pub(crate) async fn with_deadline<T, F>(timeout: Duration, fut: F) -> StorageResult<T>
where
    F: Future<Output = StorageResult<T>>,
{
    tokio::time::timeout(timeout, fut)
        .await
        .unwrap_or(Err(StorageError::Timeout))
}

/// Run CPU-bound work (password hashing) off the async executor
pub(crate) async fn run_blocking<T, F>(f: F) -> AuthResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AuthError::Internal(format!("blocking task failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_with_deadline_passes_result_through() {
        let ok = with_deadline(Duration::from_secs(1), async { Ok::<_, StorageError>(7) }).await;
        assert_eq!(ok.unwrap(), 7);

        let err = with_deadline(Duration::from_secs(1), async {
            Err::<(), _>(StorageError::UserNotFound)
        })
        .await;
        assert!(matches!(err, Err(StorageError::UserNotFound)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_deadline_times_out() {
        let result = with_deadline(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, StorageError>(())
        })
        .await;
        assert!(matches!(result, Err(StorageError::Timeout)));
    }

    #[tokio::test]
    async fn test_run_blocking() {
        assert_eq!(run_blocking(|| 2 + 2).await.unwrap(), 4);
    }
}
