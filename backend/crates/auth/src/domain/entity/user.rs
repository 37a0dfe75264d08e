//! User Entity

use platform::password::HashedPassword;

use crate::domain::value_object::{email::Email, user_id::UserId};

/// Registered user
///
/// Only the password hash is held; `HashedPassword` redacts itself in
/// `Debug`.
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: UserId,
    pub email: Email,
    pub password_hash: HashedPassword,
    pub is_admin: bool,
}

impl User {
    /// Create a new, non-admin user
    pub fn new(email: Email, password_hash: HashedPassword) -> Self {
        Self {
            user_id: UserId::new(),
            email,
            password_hash,
            is_admin: false,
        }
    }
}
