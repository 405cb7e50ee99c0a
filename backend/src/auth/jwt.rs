//! JWT token generation and validation
//!
//! Access and refresh tokens use separate pre-computed key pairs. A refresh
//! token is never accepted where an access token is expected (and vice
//! versa) because the signature check runs against a different secret.

use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Identity carried by an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub username: String,
    pub roles: Vec<String>,
}

/// Access token claims: `{UserInfo: {username, roles}, iat, exp}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    #[serde(rename = "UserInfo")]
    pub user_info: UserInfo,
    pub iat: i64,
    pub exp: i64,
}

/// Refresh token claims: `{username, iat, exp}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

/// Token verification failure.
///
/// Bad signatures, malformed tokens and expired tokens are deliberately one
/// variant; callers only learn that the token is unusable.
#[derive(Error, Debug)]
#[error("invalid or expired token")]
pub struct TokenError(#[source] jsonwebtoken::errors::Error);

/// Pre-computed JWT keys for efficient token operations
/// These are expensive to create, so we cache them in AppState
#[derive(Clone)]
pub struct JwtKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl JwtKeys {
    /// Create new JWT keys from secret
    /// This should be called once at startup
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
        }
    }
}

/// JWT service for token operations
#[derive(Clone)]
pub struct JwtService {
    access: JwtKeys,
    refresh: JwtKeys,
    access_token_expiry_secs: i64,
    refresh_token_expiry_secs: i64,
    validation: Arc<Validation>,
}

impl JwtService {
    /// Create a new JWT service with pre-computed keys
    ///
    /// Call this once at application startup and store in AppState.
    pub fn new(
        access_secret: &SecretString,
        refresh_secret: &SecretString,
        access_token_expiry_secs: i64,
        refresh_token_expiry_secs: i64,
    ) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            access: JwtKeys::new(access_secret.expose_secret()),
            refresh: JwtKeys::new(refresh_secret.expose_secret()),
            access_token_expiry_secs,
            refresh_token_expiry_secs,
            validation: Arc::new(validation),
        }
    }

    /// Sign an access token carrying the user's name and roles
    pub fn issue_access_token(&self, username: &str, roles: &[String]) -> Result<String> {
        let (iat, exp) = self.window(self.access_token_expiry_secs);
        let claims = AccessClaims {
            user_info: UserInfo {
                username: username.to_string(),
                roles: roles.to_vec(),
            },
            iat,
            exp,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.access.encoding)
            .map_err(|e| anyhow::anyhow!("Failed to generate access token: {}", e))
    }

    /// Sign a refresh token carrying only the username
    pub fn issue_refresh_token(&self, username: &str) -> Result<String> {
        let (iat, exp) = self.window(self.refresh_token_expiry_secs);
        let claims = RefreshClaims {
            username: username.to_string(),
            iat,
            exp,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.refresh.encoding)
            .map_err(|e| anyhow::anyhow!("Failed to generate refresh token: {}", e))
    }

    #[inline]
    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, TokenError> {
        decode::<AccessClaims>(token, &self.access.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(TokenError)
    }

    #[inline]
    pub fn verify_refresh_token(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        decode::<RefreshClaims>(token, &self.refresh.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(TokenError)
    }

    fn window(&self, expiry_secs: i64) -> (i64, i64) {
        let now = Utc::now();
        let exp = now + Duration::seconds(expiry_secs);
        (now.timestamp(), exp.timestamp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn secret(s: &str) -> SecretString {
        SecretString::new(s.to_string())
    }

    fn create_test_service() -> JwtService {
        JwtService::new(&secret("access-secret"), &secret("refresh-secret"), 900, 604800)
    }

    fn roles() -> Vec<String> {
        vec!["Employee".to_string(), "Manager".to_string()]
    }

    #[test]
    fn test_access_token_carries_user_info() {
        let service = create_test_service();
        let token = service.issue_access_token("kevin", &roles()).unwrap();
        let claims = service.verify_access_token(&token).unwrap();

        assert_eq!(claims.user_info.username, "kevin");
        assert_eq!(claims.user_info.roles, roles());
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn test_access_token_claim_shape() {
        let service = create_test_service();
        let token = service.issue_access_token("kevin", &roles()).unwrap();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        let raw = decode::<serde_json::Value>(
            &token,
            &DecodingKey::from_secret(b"access-secret"),
            &validation,
        )
        .unwrap()
        .claims;

        assert_eq!(raw["UserInfo"]["username"], "kevin");
        assert!(raw["iat"].is_i64());
        assert!(raw["exp"].is_i64());
    }

    #[test]
    fn test_refresh_token_round_trip() {
        let service = create_test_service();
        let token = service.issue_refresh_token("kevin").unwrap();
        let claims = service.verify_refresh_token(&token).unwrap();

        assert_eq!(claims.username, "kevin");
        assert_eq!(claims.exp - claims.iat, 604800);
    }

    #[test]
    fn test_access_token_rejected_as_refresh() {
        let service = create_test_service();
        let token = service.issue_access_token("kevin", &roles()).unwrap();
        assert!(service.verify_refresh_token(&token).is_err());
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let service = create_test_service();
        let token = service.issue_refresh_token("kevin").unwrap();
        assert!(service.verify_access_token(&token).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let service = create_test_service();
        let other = JwtService::new(&secret("access-secret"), &secret("another-secret"), 900, 604800);
        let token = other.issue_refresh_token("kevin").unwrap();
        assert!(service.verify_refresh_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = JwtService::new(&secret("a"), &secret("r"), 900, -60);
        let token = service.issue_refresh_token("kevin").unwrap();
        assert!(service.verify_refresh_token(&token).is_err());
    }

    #[test]
    fn test_invalid_token_rejected() {
        let service = create_test_service();
        assert!(service.verify_refresh_token("invalid.token.here").is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Flipping any character of the signature invalidates the token
        #[test]
        fn prop_tampered_signature_rejected(idx in 0usize..43, replacement in "[A-Za-z0-9_-]") {
            let service = create_test_service();
            let token = service.issue_refresh_token("kevin").unwrap();
            let (head, signature) = token.rsplit_once('.').unwrap();
            let mut chars: Vec<char> = signature.chars().collect();
            let idx = idx % chars.len();
            let replacement = replacement.chars().next().unwrap();
            prop_assume!(chars[idx] != replacement);
            // The last base64url character only carries 2 significant bits
            prop_assume!(idx != chars.len() - 1);
            chars[idx] = replacement;
            let tampered = format!("{}.{}", head, chars.into_iter().collect::<String>());

            prop_assert!(service.verify_refresh_token(&tampered).is_err());
        }
    }
}
