//! User administration service
//!
//! Provides business logic for user accounts:
//! - Listing accounts without password hashes
//! - Creation with case-insensitive username uniqueness
//! - Updates with optional password change
//! - Deletion guarded against users that still have notes
//! - First-start administrator bootstrap

use crate::auth::PasswordService;
use crate::config::BootstrapConfig;
use crate::error::ApiError;
use crate::repositories::{CreateUser, NoteStore, UserStore};
use secrecy::ExposeSecret;
use technotes_shared::models::ROLE_ADMIN;
use technotes_shared::validation::{validate_delete, validate_new_user, validate_user_update};
use technotes_shared::{
    CreateUserRequest, DeleteRequest, UpdateUserRequest, User, UserResponse, UsersResponse,
};
use tracing::info;

/// Capitalise the first letter of a role name for display
fn capitalise(role: &str) -> String {
    let mut chars = role.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Describe an updated account, e.g. "dave is set to active and has taken up the role of Manager"
fn describe_update(user: &User) -> String {
    let state = if user.active { "active" } else { "inactive" };
    let roles: Vec<String> = user.roles.iter().map(|r| capitalise(r)).collect();
    let role_text = match roles.as_slice() {
        [single] => format!("the role of {}", single),
        many => format!("the roles of {}", many.join(", ")),
    };
    format!("{} is set to {} and has taken up {}", user.username, state, role_text)
}

/// User service for business logic
pub struct UserService;

impl UserService {
    pub async fn list(users: &dyn UserStore) -> Result<UsersResponse, ApiError> {
        let all = users.list().await?;

        let message = if all.is_empty() {
            "No users found".to_string()
        } else {
            format!("Technotes has {} users", all.len())
        };

        Ok(UsersResponse {
            message,
            users: all.iter().map(User::summary).collect(),
        })
    }

    pub async fn create(
        users: &dyn UserStore,
        req: &CreateUserRequest,
    ) -> Result<UserResponse, ApiError> {
        let input = validate_new_user(req)?;

        if users.find_by_username_ci(input.username).await?.is_some() {
            return Err(ApiError::Conflict("Duplicate username".to_string()));
        }

        let password_hash = PasswordService::hash_async(input.password.to_string()).await?;

        let user = users
            .create(CreateUser {
                username: input.username.to_string(),
                password_hash,
                roles: input.roles.to_vec(),
            })
            .await?;

        info!(user_id = %user.id, username = %user.username, "User created");

        Ok(UserResponse {
            message: format!("New user {} created", user.username),
            user: user.summary(),
        })
    }

    pub async fn update(
        users: &dyn UserStore,
        req: &UpdateUserRequest,
    ) -> Result<UserResponse, ApiError> {
        let changes = validate_user_update(req)?;

        let mut user = users
            .find_by_id(changes.id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        if let Some(existing) = users.find_by_username_ci(changes.username).await? {
            if existing.id != user.id {
                return Err(ApiError::Conflict("Duplicate username".to_string()));
            }
        }

        user.username = changes.username.to_string();
        user.roles = changes.roles.to_vec();
        user.active = changes.active;
        if let Some(password) = changes.password {
            user.password_hash = PasswordService::hash_async(password.to_string()).await?;
        }

        let updated = users
            .update(&user)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        info!(user_id = %updated.id, "User updated");

        Ok(UserResponse {
            message: describe_update(&updated),
            user: updated.summary(),
        })
    }

    pub async fn delete(
        users: &dyn UserStore,
        notes: &dyn NoteStore,
        req: &DeleteRequest,
    ) -> Result<UserResponse, ApiError> {
        let id = validate_delete(req.id.as_deref())?;

        if notes.exists_for_user(id).await? {
            return Err(ApiError::Conflict(format!(
                "User with id {} still has assigned notes",
                id
            )));
        }

        let user = users
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        if !users.delete(id).await? {
            return Err(ApiError::NotFound("User not found".to_string()));
        }

        info!(user_id = %id, username = %user.username, "User deleted");

        Ok(UserResponse {
            message: format!("Username {} with id {} deleted", user.username, user.id),
            user: user.summary(),
        })
    }

    /// Create the configured administrator when the store holds no users.
    ///
    /// Returns the created user, or `None` when bootstrap is not configured
    /// or users already exist.
    pub async fn bootstrap_admin(
        users: &dyn UserStore,
        config: &BootstrapConfig,
    ) -> Result<Option<User>, ApiError> {
        let (Some(username), Some(password)) = (
            config.admin_username.as_deref().filter(|u| !u.is_empty()),
            config.admin_password.as_ref(),
        ) else {
            return Ok(None);
        };

        if users.count().await? > 0 {
            return Ok(None);
        }

        let password_hash =
            PasswordService::hash_async(password.expose_secret().to_string()).await?;
        let user = users
            .create(CreateUser {
                username: username.to_string(),
                password_hash,
                roles: vec![ROLE_ADMIN.to_string()],
            })
            .await?;

        info!(username = %user.username, "Bootstrap administrator created");
        Ok(Some(user))
    }
}
