//! Logout Use Case
//!
//! Revokes a session token. The token only has to be well formed: its `jti`
//! is a random UUID, so revoking a forged one affects nobody. The record is
//! kept no longer than a genuine token could live, whatever `exp` it claims.

use std::sync::Arc;

use chrono::Utc;

use crate::application::config::AuthConfig;
use crate::application::{ops, with_deadline};
use crate::domain::repository::RevocationStore;
use crate::error::{OpResult, WithOp};

/// Logout use case
pub struct LogoutUseCase<V>
where
    V: RevocationStore,
{
    revocations: Arc<V>,
    config: Arc<AuthConfig>,
}

impl<V> LogoutUseCase<V>
where
    V: RevocationStore,
{
    pub fn new(revocations: Arc<V>, config: Arc<AuthConfig>) -> Self {
        Self {
            revocations,
            config,
        }
    }

    /// Always `true` on success, including for already revoked or expired tokens
    pub async fn execute(&self, token: &str) -> OpResult<bool> {
        let op = ops::LOGOUT;
        let issuer = self.config.token_issuer();
        let claims = issuer.peek(token).with_op(op)?;

        let now = Utc::now();
        if claims.is_expired(now) {
            tracing::debug!(op, jti = %claims.jti, "Token already expired, nothing to revoke");
            return Ok(true);
        }

        let until = claims.expires_at().min(issuer.latest_expiry(now));
        with_deadline(
            self.config.storage_timeout,
            self.revocations.revoke(claims.jti, until),
        )
        .await
        .with_op(op)?;

        tracing::info!(
            op,
            user_id = %claims.uid,
            app_id = %claims.app_id,
            jti = %claims.jti,
            "Session revoked"
        );

        Ok(true)
    }
}
