//! Application Configuration
//!
//! Configuration for the Auth application layer. Built once by the binary
//! and shared behind an `Arc`.

use std::fmt;
use std::time::Duration;

pub use platform::password::HashCost;
use platform::password::{PasswordCodec, PasswordHashError};

use crate::domain::token::TokenIssuer;

/// Auth application configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// Lifetime of issued session tokens
    pub token_ttl: Duration,
    /// Deadline applied to every storage call
    pub storage_timeout: Duration,
    /// Argon2id work factor for new hashes
    pub hash_cost: HashCost,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_ttl: Duration::from_secs(3600),
            storage_timeout: Duration::from_secs(5),
            hash_cost: HashCost::default(),
            password_pepper: None,
        }
    }
}

impl AuthConfig {
    /// Build the password hasher for this configuration
    pub fn password_codec(&self) -> Result<PasswordCodec, PasswordHashError> {
        PasswordCodec::new(self.hash_cost, self.password_pepper.clone())
    }

    pub fn token_issuer(&self) -> TokenIssuer {
        TokenIssuer::new(self.token_ttl)
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_ttl", &self.token_ttl)
            .field("storage_timeout", &self.storage_timeout)
            .field("hash_cost", &self.hash_cost)
            .field(
                "password_pepper",
                &self.password_pepper.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AuthConfig::default();
        assert_eq!(config.token_ttl, Duration::from_secs(3600));
        assert_eq!(config.storage_timeout, Duration::from_secs(5));
        assert_eq!(config.hash_cost, HashCost::default());
        assert!(config.password_codec().is_ok());
    }

    #[test]
    fn test_debug_redacts_pepper() {
        let config = AuthConfig {
            password_pepper: Some(b"pepper-value".to_vec()),
            ..Default::default()
        };
        let debug_output = format!("{:?}", config);
        assert!(debug_output.contains("REDACTED"));
        assert!(!debug_output.contains("pepper-value"));
        assert!(!debug_output.contains("112, 101"));
    }
}
