//! Bearer access token extraction
//!
//! A missing or malformed `Authorization` header is `401`. A token that
//! fails verification is `403`, which tells the client to go through
//! `/auth/refresh` and retry.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::FromRef,
    http::{header::AUTHORIZATION, request::Parts},
};

/// Authenticated caller extracted from an access token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub username: String,
    pub roles: Vec<String>,
}

impl AuthUser {
    /// Fail with `403` unless the caller holds one of `roles`
    pub fn require_any_role(&self, roles: &[&str]) -> Result<(), ApiError> {
        if self.roles.iter().any(|r| roles.contains(&r.as_str())) {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Forbidden".to_string()))
        }
    }
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiError::Unauthorized("Unauthorized".to_string()))?;

        let claims = app_state
            .jwt()
            .verify_access_token(token)
            .map_err(|_| ApiError::Forbidden("Forbidden".to_string()))?;

        Ok(AuthUser {
            username: claims.user_info.username,
            roles: claims.user_info.roles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use axum::{extract::FromRequestParts, http::Request, http::StatusCode};

    async fn extract(state: &AppState, header: Option<&str>) -> Result<AuthUser, ApiError> {
        let mut builder = Request::builder().uri("/notes");
        if let Some(h) = header {
            builder = builder.header(AUTHORIZATION, h);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        AuthUser::from_request_parts(&mut parts, state).await
    }

    #[tokio::test]
    async fn test_valid_access_token() {
        let state = AppState::in_memory(AppConfig::default());
        let token = state
            .jwt()
            .issue_access_token("kevin", &["Admin".to_string()])
            .unwrap();

        let user = extract(&state, Some(&format!("Bearer {}", token))).await.unwrap();
        assert_eq!(user.username, "kevin");
        assert!(user.require_any_role(&["Admin", "Manager"]).is_ok());
        assert!(user.require_any_role(&["Manager"]).is_err());
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        let state = AppState::in_memory(AppConfig::default());
        let err = extract(&state, None).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);

        let err = extract(&state, Some("Basic dXNlcjpwYXNz")).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_refresh_token_is_not_an_access_token() {
        let state = AppState::in_memory(AppConfig::default());
        let token = state.jwt().issue_refresh_token("kevin").unwrap();

        let err = extract(&state, Some(&format!("Bearer {}", token))).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }
}
