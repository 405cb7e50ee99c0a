//! Authentication routes
//!
//! Login, access token refresh and logout. The refresh token only ever
//! travels in the `__Host-jwt` cookie; the access token is returned in the
//! JSON body.

use crate::auth::RefreshCookie;
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::middleware::login_rate_limit;
use crate::services::AuthService;
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use technotes_shared::{AccessTokenResponse, LoginRequest, MessageResponse};
use tracing::info;

/// Create auth routes
///
/// The rate limiter wraps only the login route.
pub fn auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(login))
        .route_layer(middleware::from_fn_with_state(state, login_rate_limit))
        .route("/refresh", get(refresh))
        .route("/logout", post(logout))
}

/// Login with username and password
///
/// POST /auth
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<(CookieJar, Json<AccessTokenResponse>)> {
    let tokens = AuthService::login(state.users(), state.jwt(), &req).await?;

    let jar = jar.add(state.refresh_cookie.issue(tokens.refresh_token));
    Ok((
        jar,
        Json(AccessTokenResponse {
            access_token: tokens.access_token,
        }),
    ))
}

/// Mint a new access token from the refresh cookie
///
/// GET /auth/refresh
async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> ApiResult<Json<AccessTokenResponse>> {
    let refresh_token = RefreshCookie::read(&jar);
    let access_token =
        AuthService::refresh(state.users(), state.jwt(), refresh_token.as_deref()).await?;
    Ok(Json(AccessTokenResponse { access_token }))
}

/// Clear the refresh cookie
///
/// POST /auth/logout
async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    if RefreshCookie::read(&jar).is_none() {
        return StatusCode::NO_CONTENT.into_response();
    }

    info!("Refresh cookie cleared");
    (
        jar.add(state.refresh_cookie.clear()),
        Json(MessageResponse {
            message: "Cookie cleared".to_string(),
        }),
    )
        .into_response()
}
