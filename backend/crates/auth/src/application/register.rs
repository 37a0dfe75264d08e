//! Register Use Case
//!
//! Creates a new user account.

use std::sync::Arc;

use platform::password::ClearTextPassword;

use crate::application::config::AuthConfig;
use crate::application::{ops, run_blocking, with_deadline};
use crate::domain::repository::{StorageError, UserSaver};
use crate::domain::value_object::{email::Email, user_id::UserId};
use crate::error::{OpResult, WithOp};

/// Register input
pub struct RegisterInput {
    pub email: Email,
    pub password: ClearTextPassword,
}

/// Register use case
pub struct RegisterUseCase<U>
where
    U: UserSaver,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
}

impl<U> RegisterUseCase<U>
where
    U: UserSaver,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self { user_repo, config }
    }

    pub async fn execute(&self, input: RegisterInput) -> OpResult<UserId> {
        let op = ops::REGISTER;
        let RegisterInput { email, password } = input;

        let codec = self.config.password_codec().with_op(op)?;
        let password_hash = run_blocking(move || codec.hash(&password))
            .await
            .with_op(op)?
            .with_op(op)?;

        let saved = with_deadline(
            self.config.storage_timeout,
            self.user_repo.save_user(&email, &password_hash),
        )
        .await;

        let user_id = match saved {
            Ok(id) => id,
            Err(StorageError::UserExists) => {
                tracing::info!(op, email = %email, "Email already registered");
                return Err(StorageError::UserExists).with_op(op);
            }
            Err(e) => {
                tracing::error!(op, email = %email, error = %e, "Failed to save user");
                return Err(e).with_op(op);
            }
        };

        tracing::info!(op, user_id = %user_id, "User registered");

        Ok(user_id)
    }
}
