//! Auth Router
//!
//! RPC-style routes; the binary nests them under the service prefix
//! (`/auth.v1.Auth`).

use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::repository::AuthStorage;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::require_session_token;

/// Create the Auth router for any storage backend
pub fn auth_router<R>(repo: R, config: AuthConfig) -> Router
where
    R: AuthStorage,
{
    let state = AuthAppState {
        repo: Arc::new(repo),
        config: Arc::new(config),
    };

    let protected = Router::new()
        .route("/Me", get(handlers::me))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session_token::<R>,
        ));

    Router::new()
        .route("/Register", post(handlers::register::<R>))
        .route("/Login", post(handlers::login::<R>))
        .route("/IsAdmin", post(handlers::is_admin::<R>))
        .route("/Logout", post(handlers::logout::<R>))
        .merge(protected)
        .with_state(state)
}
