//! Application identifier
//!
//! Applications are provisioned out of band with small positive integer ids.

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};

#[derive(
    Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AppId(i32);

impl AppId {
    /// Validate a caller-supplied id. Zero and negatives are never assigned.
    pub fn new(id: i32) -> AuthResult<Self> {
        if id <= 0 {
            return Err(AuthError::Validation("app_id is required".to_string()));
        }
        Ok(Self(id))
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(id: i32) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_id_positive() {
        assert_eq!(AppId::new(1).unwrap().value(), 1);
    }

    #[test]
    fn test_app_id_rejects_zero_and_negative() {
        assert!(matches!(AppId::new(0), Err(AuthError::Validation(_))));
        assert!(matches!(AppId::new(-5), Err(AuthError::Validation(_))));
    }

    #[test]
    fn test_app_id_display_and_serde() {
        let id = AppId::new(42).unwrap();
        assert_eq!(id.to_string(), "42");
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
    }
}
