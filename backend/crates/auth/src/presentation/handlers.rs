//! HTTP Handlers
//!
//! Request shape is validated here, before any use case runs.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::{Extension, Json};
use platform::password::ClearTextPassword;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::{
    IsAdminUseCase, LoginInput, LoginUseCase, LogoutUseCase, RegisterInput, RegisterUseCase, ops,
};
use crate::domain::repository::AuthStorage;
use crate::domain::token::SessionClaims;
use crate::domain::value_object::{app_id::AppId, email::Email, user_id::UserId};
use crate::error::{AuthError, OpResult, WithOp};
use crate::presentation::dto::{
    IsAdminRequest, IsAdminResponse, LoginRequest, LoginResponse, LogoutRequest, LogoutResponse,
    RegisterRequest, RegisterResponse, SessionInfoResponse,
};

/// Shared state for auth handlers
pub struct AuthAppState<R>
where
    R: AuthStorage,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
}

impl<R> Clone for AuthAppState<R>
where
    R: AuthStorage,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            config: self.config.clone(),
        }
    }
}

// ============================================================================
// Register
// ============================================================================

/// POST /Register
pub async fn register<R>(
    State(state): State<AuthAppState<R>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> OpResult<Json<RegisterResponse>>
where
    R: AuthStorage,
{
    let op = ops::REGISTER;
    let Json(req) = payload.map_err(invalid_body).with_op(op)?;

    let input = RegisterInput {
        email: Email::new(req.email).with_op(op)?,
        password: ClearTextPassword::new(req.password).with_op(op)?,
    };

    let use_case = RegisterUseCase::new(state.repo.clone(), state.config.clone());
    let user_id = use_case.execute(input).await?;

    Ok(Json(RegisterResponse { user_id }))
}

// ============================================================================
// Login
// ============================================================================

/// POST /Login
pub async fn login<R>(
    State(state): State<AuthAppState<R>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> OpResult<Json<LoginResponse>>
where
    R: AuthStorage,
{
    let op = ops::LOGIN;
    let Json(req) = payload.map_err(invalid_body).with_op(op)?;

    let input = LoginInput {
        email: Email::new(req.email).with_op(op)?,
        password: ClearTextPassword::new(req.password).with_op(op)?,
        app_id: AppId::new(req.app_id).with_op(op)?,
    };

    let use_case = LoginUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());
    let issued = use_case.execute(input).await?;

    Ok(Json(LoginResponse {
        token: issued.token,
    }))
}

// ============================================================================
// IsAdmin
// ============================================================================

/// POST /IsAdmin
pub async fn is_admin<R>(
    State(state): State<AuthAppState<R>>,
    payload: Result<Json<IsAdminRequest>, JsonRejection>,
) -> OpResult<Json<IsAdminResponse>>
where
    R: AuthStorage,
{
    let op = ops::IS_ADMIN;
    let Json(req) = payload.map_err(invalid_body).with_op(op)?;
    let user_id = parse_user_id(&req.user_id).with_op(op)?;

    let use_case = IsAdminUseCase::new(state.repo.clone(), state.config.clone());
    let is_admin = use_case.execute(user_id).await?;

    Ok(Json(IsAdminResponse { is_admin }))
}

// ============================================================================
// Logout
// ============================================================================

/// POST /Logout
pub async fn logout<R>(
    State(state): State<AuthAppState<R>>,
    payload: Result<Json<LogoutRequest>, JsonRejection>,
) -> OpResult<Json<LogoutResponse>>
where
    R: AuthStorage,
{
    let op = ops::LOGOUT;
    let Json(req) = payload.map_err(invalid_body).with_op(op)?;

    if req.token.is_empty() {
        return Err(AuthError::Validation("token is required".to_string())).with_op(op);
    }

    let use_case = LogoutUseCase::new(state.repo.clone(), state.config.clone());
    let success = use_case.execute(&req.token).await?;

    Ok(Json(LogoutResponse { success }))
}

// ============================================================================
// Session (requires authentication)
// ============================================================================

/// GET /Me
pub async fn me(Extension(claims): Extension<SessionClaims>) -> Json<SessionInfoResponse> {
    Json(SessionInfoResponse {
        user_id: claims.uid,
        email: claims.email,
        app_id: claims.app_id,
        expires_at: claims.exp,
    })
}

// ============================================================================
// Helper Functions
// ============================================================================

fn invalid_body(rejection: JsonRejection) -> AuthError {
    AuthError::Validation(rejection.body_text())
}

fn parse_user_id(raw: &str) -> Result<UserId, AuthError> {
    if raw.is_empty() {
        return Err(AuthError::Validation("user_id is required".to_string()));
    }

    let user_id: UserId = raw
        .parse()
        .map_err(|_| AuthError::Validation("user_id must be a UUID".to_string()))?;

    if user_id.is_nil() {
        return Err(AuthError::Validation("user_id is required".to_string()));
    }

    Ok(user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_id() {
        let id = UserId::new();
        assert_eq!(parse_user_id(&id.to_string()).unwrap(), id);

        for raw in ["", "42", "00000000-0000-0000-0000-000000000000"] {
            assert!(matches!(
                parse_user_id(raw),
                Err(AuthError::Validation(_))
            ));
        }
    }
}
