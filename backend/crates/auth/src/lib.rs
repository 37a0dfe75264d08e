//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits, token format
//! - `application/` - Use cases and application services
//! - `infra/` - PostgreSQL and in-memory storage
//! - `presentation/` - HTTP handlers, DTOs, router, middleware
//!
//! ## Features
//! - User registration and login with email + password
//! - Multi-tenant session tokens: each app signs with its own secret
//! - Admin flag lookup
//! - Logout through a revocation list keyed by token id
//!
//! ## Security Model
//! - Passwords hashed with Argon2id, optional pepper
//! - Unknown email and wrong password are indistinguishable to callers
//! - Tokens are HS256 JWTs bound to the issuing app; rotating an app's
//!   secret invalidates its outstanding tokens
//! - Internal error detail is logged, never returned

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::AuthConfig;
pub use domain::repository::{AuthStorage, RevocationStore};
pub use domain::token::SessionClaims;
pub use error::{AuthError, AuthResult, OperationError};
pub use infra::{InMemoryAuthRepository, PgAuthRepository};
pub use presentation::router::auth_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod models {
    pub use crate::domain::entity::{app::App, user::User};
    pub use crate::domain::value_object::{
        app_id::AppId, app_secret::AppSecret, email::Email, user_id::UserId,
    };
    pub use crate::presentation::dto::*;
}
