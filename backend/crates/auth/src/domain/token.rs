//! Session Tokens
//!
//! Compact `HS256` JWTs. Each token is signed with the secret of the
//! application it was issued for. Tokens are stateless; revocation is
//! tracked separately by `jti`.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use kernel::id::TokenId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::entity::{app::App, user::User};
use crate::domain::value_object::{app_id::AppId, user_id::UserId};

const ALG: Algorithm = Algorithm::HS256;

/// Token failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The token could not be signed (missing key)
    #[error("token signing failed: {0}")]
    Signing(String),

    /// Not an `HS256` JWT carrying session claims
    #[error("malformed token")]
    Malformed,

    /// MAC does not match the application's secret
    #[error("bad token signature")]
    BadSignature,

    /// Token names a different application than the verifying one
    #[error("token issued for another app")]
    AppMismatch,

    #[error("token expired")]
    Expired,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            JwtErrorKind::InvalidSignature => TokenError::BadSignature,
            JwtErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed,
        }
    }
}

/// Claims carried by a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub uid: UserId,
    pub email: String,
    pub app_id: AppId,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expires at (unix seconds)
    pub exp: i64,
    pub jti: TokenId,
}

impl SessionClaims {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// A freshly signed token together with its claims
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: SessionClaims,
}

/// Signs and checks session tokens
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }

    /// Latest instant at which a token issued up to `now` can expire
    pub fn latest_expiry(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        TimeDelta::from_std(self.ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Issue a token for `user` scoped to `app`, valid from `now` for the TTL
    pub fn issue(
        &self,
        user: &User,
        app: &App,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        if app.secret.is_empty() {
            return Err(TokenError::Signing(format!(
                "app {} has no signing secret",
                app.app_id
            )));
        }

        let iat = now.timestamp();
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = SessionClaims {
            uid: user.user_id,
            email: user.email.as_str().to_string(),
            app_id: app.app_id,
            iat,
            exp: iat.saturating_add(ttl),
            jti: TokenId::new(),
        };

        let token = jsonwebtoken::encode(
            &Header::new(ALG),
            &claims,
            &EncodingKey::from_secret(app.secret.as_bytes()),
        )
        .map_err(|e| TokenError::Signing(e.to_string()))?;

        Ok(IssuedToken { token, claims })
    }

    /// Decode claims without checking the signature
    ///
    /// Only for routing (which app's secret to use) and for logout.
    /// Never trust the result for authorization.
    pub fn peek(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let mut validation = validation();
        validation.insecure_disable_signature_validation();

        let data = jsonwebtoken::decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(&[]),
            &validation,
        )?;
        if data.header.alg != ALG {
            return Err(TokenError::Malformed);
        }
        Ok(data.claims)
    }

    /// Full verification against `app`'s secret
    ///
    /// The signature is checked before expiry, so a forged token never
    /// learns whether it would have been expired.
    pub fn verify(
        &self,
        token: &str,
        app: &App,
        now: DateTime<Utc>,
    ) -> Result<SessionClaims, TokenError> {
        let claims = jsonwebtoken::decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(app.secret.as_bytes()),
            &validation(),
        )?
        .claims;

        if claims.app_id != app.app_id {
            return Err(TokenError::AppMismatch);
        }

        if claims.is_expired(now) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

/// `HS256` only. `exp` is checked by the caller against its own clock.
fn validation() -> Validation {
    let mut validation = Validation::new(ALG);
    validation.leeway = 0;
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation
}
