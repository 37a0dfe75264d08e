//! Verify Token Use Case
//!
//! Full check of a presented session token: known app, valid signature,
//! not expired, not revoked.

use std::sync::Arc;

use chrono::Utc;

use crate::application::config::AuthConfig;
use crate::application::{ops, with_deadline};
use crate::domain::repository::{AppProvider, RevocationStore, StorageError};
use crate::domain::token::SessionClaims;
use crate::error::{AuthError, OpResult, WithOp};

pub struct VerifyTokenUseCase<A, V>
where
    A: AppProvider,
    V: RevocationStore,
{
    app_repo: Arc<A>,
    revocations: Arc<V>,
    config: Arc<AuthConfig>,
}

impl<A, V> VerifyTokenUseCase<A, V>
where
    A: AppProvider,
    V: RevocationStore,
{
    pub fn new(app_repo: Arc<A>, revocations: Arc<V>, config: Arc<AuthConfig>) -> Self {
        Self {
            app_repo,
            revocations,
            config,
        }
    }

    pub async fn execute(&self, token: &str) -> OpResult<SessionClaims> {
        let op = ops::VERIFY_TOKEN;
        let issuer = self.config.token_issuer();

        // Unverified claims only pick the app whose secret checks the MAC
        let unverified = issuer.peek(token).with_op(op)?;

        let app = match with_deadline(
            self.config.storage_timeout,
            self.app_repo.app(unverified.app_id),
        )
        .await
        {
            Ok(app) => app,
            Err(StorageError::AppNotFound) => {
                tracing::debug!(op, app_id = %unverified.app_id, "Token names unknown app");
                return Err(AuthError::TokenInvalid).with_op(op);
            }
            Err(e) => return Err(e).with_op(op),
        };

        let now = Utc::now();
        let claims = issuer.verify(token, &app, now).with_op(op)?;

        let revoked = with_deadline(
            self.config.storage_timeout,
            self.revocations.is_revoked(claims.jti, now),
        )
        .await
        .with_op(op)?;

        if revoked {
            return Err(AuthError::TokenRevoked).with_op(op);
        }

        Ok(claims)
    }
}
