//! Domain Layer
//!
//! Contains entities, value objects, repository traits and the token format.

pub mod entity;
pub mod repository;
pub mod token;
pub mod value_object;

// Re-exports
pub use entity::{app::App, user::User};
pub use repository::{
    AppProvider, AuthStorage, RevocationStore, StorageError, StorageResult, UserProvider,
    UserSaver,
};
pub use token::{IssuedToken, SessionClaims, TokenError, TokenIssuer};
