//! Login Use Case
//!
//! Checks credentials and issues a session token for the calling app.

use std::sync::Arc;

use chrono::Utc;
use platform::password::ClearTextPassword;

use crate::application::config::AuthConfig;
use crate::application::{ops, run_blocking, with_deadline};
use crate::domain::repository::{AppProvider, StorageError, UserProvider};
use crate::domain::token::IssuedToken;
use crate::domain::value_object::{app_id::AppId, email::Email};
use crate::error::{AuthError, OpResult, WithOp};

/// Login input
pub struct LoginInput {
    pub email: Email,
    pub password: ClearTextPassword,
    pub app_id: AppId,
}

/// Login use case
pub struct LoginUseCase<U, A>
where
    U: UserProvider,
    A: AppProvider,
{
    user_repo: Arc<U>,
    app_repo: Arc<A>,
    config: Arc<AuthConfig>,
}

impl<U, A> LoginUseCase<U, A>
where
    U: UserProvider,
    A: AppProvider,
{
    pub fn new(user_repo: Arc<U>, app_repo: Arc<A>, config: Arc<AuthConfig>) -> Self {
        Self {
            user_repo,
            app_repo,
            config,
        }
    }

    pub async fn execute(&self, input: LoginInput) -> OpResult<IssuedToken> {
        let op = ops::LOGIN;
        let LoginInput {
            email,
            password,
            app_id,
        } = input;

        let found = with_deadline(
            self.config.storage_timeout,
            self.user_repo.user_by_email(&email),
        )
        .await;

        let user = match found {
            Ok(user) => Some(user),
            Err(StorageError::UserNotFound) => None,
            Err(e) => {
                tracing::error!(op, email = %email, error = %e, "Failed to load user");
                return Err(e).with_op(op);
            }
        };

        let codec = self.config.password_codec().with_op(op)?;

        let Some(user) = user else {
            // Spend the same work as a verification so the response time
            // does not reveal whether the email is registered.
            let _ = run_blocking(move || codec.hash(&password)).await;
            tracing::warn!(op, email = %email, "Login for unknown email");
            return Err(AuthError::InvalidCredentials).with_op(op);
        };

        let stored_hash = user.password_hash.clone();
        let password_valid = run_blocking(move || codec.verify(&stored_hash, &password))
            .await
            .with_op(op)?;

        if !password_valid {
            tracing::warn!(op, user_id = %user.user_id, "Password mismatch");
            return Err(AuthError::InvalidCredentials).with_op(op);
        }

        let app = with_deadline(self.config.storage_timeout, self.app_repo.app(app_id))
            .await
            .with_op(op)?;

        let issued = self
            .config
            .token_issuer()
            .issue(&user, &app, Utc::now())
            .with_op(op)?;

        tracing::info!(
            op,
            user_id = %user.user_id,
            app_id = %app.app_id,
            "User logged in"
        );

        Ok(issued)
    }
}
