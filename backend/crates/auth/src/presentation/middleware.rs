//! Auth Middleware
//!
//! Middleware for requiring a session token on protected routes.

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request, header};
use axum::middleware::Next;
use axum::response::Response;

use crate::application::{VerifyTokenUseCase, ops};
use crate::domain::repository::AuthStorage;
use crate::error::{AuthError, OpResult, WithOp};
use crate::presentation::handlers::AuthAppState;

/// Middleware that requires `Authorization: Bearer <token>`
///
/// On success the verified `SessionClaims` are stored in the request
/// extensions for downstream handlers.
pub async fn require_session_token<R>(
    State(state): State<AuthAppState<R>>,
    mut req: Request<Body>,
    next: Next,
) -> OpResult<Response>
where
    R: AuthStorage,
{
    let token = bearer_token(req.headers())
        .ok_or(AuthError::TokenInvalid)
        .with_op(ops::VERIFY_TOKEN)?;

    let use_case =
        VerifyTokenUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());
    let claims = use_case.execute(&token).await?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }

    Some(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(
            bearer_token(&headers("Bearer abc.def.ghi")).as_deref(),
            Some("abc.def.ghi")
        );
        assert_eq!(bearer_token(&headers("bearer xyz")).as_deref(), Some("xyz"));
    }

    #[test]
    fn test_bearer_token_rejects() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwdw==")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&headers("Bearer")), None);
    }
}
