//! Per-application token signing key

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Symmetric HMAC key of one application
///
/// Each application signs with its own key, so a token minted for one
/// application never verifies under another.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct AppSecret(Vec<u8>);

impl AppSecret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for AppSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AppSecret").field(&"[REDACTED]").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redaction() {
        let secret = AppSecret::new(b"super-secret".to_vec());
        let debug_output = format!("{:?}", secret);
        assert!(debug_output.contains("REDACTED"));
        assert!(!debug_output.contains("super-secret"));
    }

    #[test]
    fn test_empty() {
        assert!(AppSecret::new(Vec::new()).is_empty());
        assert!(!AppSecret::new(b"k".to_vec()).is_empty());
    }
}
