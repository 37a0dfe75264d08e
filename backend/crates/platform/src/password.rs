//! Password Hashing and Verification
//!
//! One-way adaptive password handling:
//! - Argon2id hashing (memory-hard, recommended by OWASP)
//! - Zeroization of clear text
//! - Constant-time verification
//! - Optional pepper (application-wide secret)
//!
//! A mismatch during verification is a normal negative result (`false`),
//! never an error. Only catastrophic failures (no entropy, invalid cost
//! parameters) surface as [`PasswordHashError`].

use std::fmt;

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};
use rand::rngs::OsRng;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

// ============================================================================
// Error Types
// ============================================================================

/// Password input rejected before hashing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("Password cannot be empty")]
    Empty,
}

/// Password hashing errors
#[derive(Debug, Error)]
pub enum PasswordHashError {
    /// Cost parameters rejected by Argon2
    #[error("Invalid hashing parameters: {0}")]
    InvalidParams(String),

    /// Hashing operation failed
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    /// Stored hash is not a valid PHC string
    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

// ============================================================================
// Cost parameters
// ============================================================================

/// Argon2id work factor
///
/// The default targets tens of milliseconds per verification on commodity
/// hardware (OWASP: m=19456 KiB, t=2, p=1). Hashes record their own
/// parameters, so raising the cost never breaks existing hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    /// Memory size in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for HashCost {
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl HashCost {
    /// Smallest cost Argon2 accepts. Only for tests and local tooling.
    pub const fn minimal() -> Self {
        Self {
            memory_kib: Params::MIN_M_COST,
            iterations: Params::MIN_T_COST,
            parallelism: Params::MIN_P_COST,
        }
    }
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password with automatic memory zeroization
///
/// ## Security
/// - Implements `Zeroize` and `ZeroizeOnDrop`
/// - Does not implement `Clone` to prevent accidental copies
/// - Debug output is redacted
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Wrap user input
    ///
    /// Unicode is normalized using NFKC so that visually identical input
    /// typed on different keyboards hashes the same way.
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        let mut raw = raw;
        let normalized: String = raw.nfkc().collect();
        raw.zeroize();

        if normalized.is_empty() {
            return Err(PasswordPolicyError::Empty);
        }

        Ok(Self(normalized))
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Hashed Password (Safe to store)
// ============================================================================

/// Hashed password in PHC string format
///
/// The PHC string records algorithm, version, parameters, salt and hash, so a
/// stored value is self-describing.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    hash: String,
}

impl HashedPassword {
    /// Create from PHC string (e.g., from database)
    pub fn from_phc_string(s: impl Into<String>) -> Result<Self, PasswordHashError> {
        let hash = s.into();
        PasswordHash::new(&hash).map_err(|_| PasswordHashError::InvalidHashFormat)?;
        Ok(Self { hash })
    }

    /// Get the PHC string for storage
    pub fn as_phc_string(&self) -> &str {
        &self.hash
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

// ============================================================================
// Codec
// ============================================================================

/// Argon2id hasher/verifier configured once at startup
///
/// Cheap to clone, so it can be moved onto a blocking thread per call.
#[derive(Clone)]
pub struct PasswordCodec {
    argon2: Argon2<'static>,
    pepper: Option<Zeroizing<Vec<u8>>>,
}

impl PasswordCodec {
    pub fn new(cost: HashCost, pepper: Option<Vec<u8>>) -> Result<Self, PasswordHashError> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|e| PasswordHashError::InvalidParams(e.to_string()))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            pepper: pepper.map(Zeroizing::new),
        })
    }

    /// Hash the password with a fresh 128-bit salt
    pub fn hash(&self, password: &ClearTextPassword) -> Result<HashedPassword, PasswordHashError> {
        let input = self.peppered(password);
        let salt = SaltString::generate(OsRng);

        let hash = self
            .argon2
            .hash_password(&input, &salt)
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?;

        Ok(HashedPassword {
            hash: hash.to_string(),
        })
    }

    /// Verify a password against a stored hash
    ///
    /// Argon2 compares digests in constant time. Parameters are read from the
    /// stored hash, not from this codec's cost.
    pub fn verify(&self, hash: &HashedPassword, password: &ClearTextPassword) -> bool {
        let Ok(parsed) = PasswordHash::new(&hash.hash) else {
            return false;
        };

        let input = self.peppered(password);
        self.argon2.verify_password(&input, &parsed).is_ok()
    }

    fn peppered(&self, password: &ClearTextPassword) -> Zeroizing<Vec<u8>> {
        let mut combined = Zeroizing::new(password.as_bytes().to_vec());
        if let Some(pepper) = &self.pepper {
            combined.extend_from_slice(pepper);
        }
        combined
    }
}

impl fmt::Debug for PasswordCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordCodec")
            .field("pepper", &self.pepper.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> PasswordCodec {
        PasswordCodec::new(HashCost::minimal(), None).unwrap()
    }

    fn password(s: &str) -> ClearTextPassword {
        ClearTextPassword::new(s.to_string()).unwrap()
    }

    #[test]
    fn test_password_empty() {
        let result = ClearTextPassword::new(String::new());
        assert_eq!(result.unwrap_err(), PasswordPolicyError::Empty);
    }

    #[test]
    fn test_short_password_is_accepted() {
        assert!(ClearTextPassword::new("pw1".to_string()).is_ok());
    }

    #[test]
    fn test_nfkc_normalization() {
        // Fullwidth "ＡＢＣ" normalizes to "ABC"
        let codec = codec();
        let hashed = codec.hash(&password("ＡＢＣ")).unwrap();
        assert!(codec.verify(&hashed, &password("ABC")));
    }

    #[test]
    fn test_hash_and_verify() {
        let codec = codec();
        let hashed = codec.hash(&password("TestPassword123!")).unwrap();

        assert!(codec.verify(&hashed, &password("TestPassword123!")));
        assert!(!codec.verify(&hashed, &password("WrongPassword123!")));
    }

    #[test]
    fn test_hash_is_salted() {
        let codec = codec();
        let a = codec.hash(&password("same")).unwrap();
        let b = codec.hash(&password("same")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_is_argon2id() {
        let hashed = codec().hash(&password("secret")).unwrap();
        assert!(hashed.as_phc_string().starts_with("$argon2id$"));
    }

    #[test]
    fn test_hash_with_pepper() {
        let peppered = PasswordCodec::new(HashCost::minimal(), Some(b"pepper".to_vec())).unwrap();
        let hashed = peppered.hash(&password("TestPassword123!")).unwrap();

        assert!(peppered.verify(&hashed, &password("TestPassword123!")));
        // Same password without the pepper must not verify
        assert!(!codec().verify(&hashed, &password("TestPassword123!")));
    }

    #[test]
    fn test_verify_uses_parameters_from_hash() {
        let cheap = codec();
        let hashed = cheap.hash(&password("secret")).unwrap();

        let costlier = PasswordCodec::new(
            HashCost {
                memory_kib: 64,
                iterations: 2,
                parallelism: 1,
            },
            None,
        )
        .unwrap();
        assert!(costlier.verify(&hashed, &password("secret")));
    }

    #[test]
    fn test_invalid_cost_is_rejected() {
        let result = PasswordCodec::new(
            HashCost {
                memory_kib: 1,
                iterations: 0,
                parallelism: 0,
            },
            None,
        );
        assert!(matches!(result, Err(PasswordHashError::InvalidParams(_))));
    }

    #[test]
    fn test_phc_string_roundtrip() {
        let codec = codec();
        let hashed = codec.hash(&password("TestPassword123!")).unwrap();

        let restored = HashedPassword::from_phc_string(hashed.as_phc_string()).unwrap();
        assert!(codec.verify(&restored, &password("TestPassword123!")));
    }

    #[test]
    fn test_invalid_phc_string() {
        let result = HashedPassword::from_phc_string("not_a_valid_hash");
        assert!(matches!(result, Err(PasswordHashError::InvalidHashFormat)));
    }

    #[test]
    fn test_debug_redaction() {
        let pw = password("secret");
        let debug_output = format!("{:?}", pw);
        assert!(debug_output.contains("REDACTED"));
        assert!(!debug_output.contains("secret"));

        let hashed = codec().hash(&pw).unwrap();
        assert!(!format!("{:?}", hashed).contains("argon2id"));
    }
}
