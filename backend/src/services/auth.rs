//! Login and access token refresh
//!
//! Unknown users, inactive users and wrong passwords all produce the same
//! `401 Unauthorized`, and all three pay for one argon2 verification.

use crate::auth::{JwtService, PasswordService};
use crate::error::ApiError;
use crate::repositories::UserStore;
use technotes_shared::validation::validate_login;
use technotes_shared::LoginRequest;
use tracing::{debug, warn};

/// Tokens produced by a successful login
#[derive(Debug, Clone)]
pub struct IssuedTokens {
    /// Returned in the response body
    pub access_token: String,
    /// Delivered only through the refresh cookie
    pub refresh_token: String,
}

fn unauthorized() -> ApiError {
    ApiError::Unauthorized("Unauthorized".to_string())
}

pub struct AuthService;

impl AuthService {
    /// Authenticate credentials and issue an access/refresh token pair
    pub async fn login(
        users: &dyn UserStore,
        jwt: &JwtService,
        req: &LoginRequest,
    ) -> Result<IssuedTokens, ApiError> {
        let credentials = validate_login(req)?;

        let user = match users
            .find_by_username(credentials.username)
            .await?
            .filter(|u| u.active)
        {
            Some(user) => user,
            None => {
                debug!(username = credentials.username, "Login for unknown or inactive user");
                PasswordService::verify_dummy_async(credentials.password.to_string()).await?;
                return Err(unauthorized());
            }
        };

        let valid = PasswordService::verify_async(
            credentials.password.to_string(),
            user.password_hash.clone(),
        )
        .await?;

        if !valid {
            warn!(username = %user.username, "Login with wrong password");
            return Err(unauthorized());
        }

        let access_token = jwt.issue_access_token(&user.username, &user.roles)?;
        let refresh_token = jwt.issue_refresh_token(&user.username)?;

        Ok(IssuedTokens {
            access_token,
            refresh_token,
        })
    }

    /// Mint a new access token from a refresh token.
    ///
    /// Roles come from the store, not the token, so role changes apply on
    /// the next refresh. The refresh token itself is not rotated.
    pub async fn refresh(
        users: &dyn UserStore,
        jwt: &JwtService,
        refresh_token: Option<&str>,
    ) -> Result<String, ApiError> {
        let refresh_token = refresh_token
            .ok_or_else(|| ApiError::Unauthorized("Unauthorized request".to_string()))?;

        let claims = jwt
            .verify_refresh_token(refresh_token)
            .map_err(|e| {
                debug!(error = %e, "Rejected refresh token");
                ApiError::Forbidden("Forbidden".to_string())
            })?;

        let user = users
            .find_by_username(&claims.username)
            .await?
            .filter(|u| u.active)
            .ok_or_else(unauthorized)?;

        Ok(jwt.issue_access_token(&user.username, &user.roles)?)
    }
}
