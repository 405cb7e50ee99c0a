//! User administration routes
//!
//! Every route requires a bearer access token. Creating, updating and
//! deleting accounts additionally requires the `Admin` or `Manager` role.

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::services::UserService;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use technotes_shared::models::USER_ADMIN_ROLES;
use technotes_shared::{
    CreateUserRequest, DeleteRequest, UpdateUserRequest, UserResponse, UsersResponse,
};

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new().route(
        "/",
        get(list_users)
            .post(create_user)
            .patch(update_user)
            .delete(delete_user),
    )
}

/// GET /users
async fn list_users(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> ApiResult<Json<UsersResponse>> {
    Ok(Json(UserService::list(state.users()).await?))
}

/// POST /users
async fn create_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ApiJson(req): ApiJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    auth_user.require_any_role(&USER_ADMIN_ROLES)?;
    let created = UserService::create(state.users(), &req).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PATCH /users
async fn update_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    auth_user.require_any_role(&USER_ADMIN_ROLES)?;
    Ok(Json(UserService::update(state.users(), &req).await?))
}

/// DELETE /users
async fn delete_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ApiJson(req): ApiJson<DeleteRequest>,
) -> ApiResult<Json<UserResponse>> {
    auth_user.require_any_role(&USER_ADMIN_ROLES)?;
    Ok(Json(
        UserService::delete(state.users(), state.notes(), &req).await?,
    ))
}
