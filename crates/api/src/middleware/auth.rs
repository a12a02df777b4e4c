//! Authentication middleware for protected routes.
//!
//! Authentication itself is an external collaborator: an identity widget
//! that turns a bearer token into a user id. This module only bridges
//! that widget to the user directory - it never validates credentials.

use async_trait::async_trait;
use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use konsern_core::access::User;
use konsern_shared::types::UserId;

use crate::AppState;

/// External identity provider: resolves a bearer token to a user id.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the authenticated user id, or `None` for a bad token.
    async fn verify(&self, token: &str) -> Option<UserId>;
}

/// Development provider: accepts tokens of the form `user-{id}`.
pub struct DemoIdentity;

#[async_trait]
impl IdentityProvider for DemoIdentity {
    async fn verify(&self, token: &str) -> Option<UserId> {
        token.strip_prefix("user-")?.parse().ok().map(UserId::new)
    }
}

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// Authentication middleware.
///
/// 1. Extracts the Bearer token from the Authorization header
/// 2. Resolves it through the identity provider
/// 3. Loads the user record and stores it in request extensions
pub async fn auth_middleware(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let Some(token) = auth_header.and_then(extract_bearer_token) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "missing_token",
                "message": "Authorization header with Bearer token is required"
            })),
        )
            .into_response();
    };

    let Some(user_id) = state.identity.verify(token).await else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "invalid_token",
                "message": "Invalid or expired token"
            })),
        )
            .into_response();
    };

    // The cache covers the common case; a freshly created user may not be
    // in it yet, so fall back to the directory.
    let user = match state.ctx.find_cached_user(user_id).await {
        Some(user) => Some(user),
        None => state
            .ctx
            .access()
            .find_user(state.ctx.group_id(), user_id)
            .await
            .ok(),
    };

    match user {
        Some(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "unknown_user",
                "message": "Token does not map to a known user"
            })),
        )
            .into_response(),
    }
}

/// Extractor for the authenticated user.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<User>().cloned().map(AuthUser).ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "unauthenticated",
                    "message": "Authentication middleware did not run"
                })),
            )
                .into_response()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
    }

    #[tokio::test]
    async fn test_demo_identity_token_format() {
        assert_eq!(DemoIdentity.verify("user-3").await, Some(UserId::new(3)));
        assert_eq!(DemoIdentity.verify("user-x").await, None);
        assert_eq!(DemoIdentity.verify("3").await, None);
    }
}
