//! Input validation functions
//!
//! Presence checks mirror what the API promises: a field that is absent,
//! `null` or an empty string counts as missing.

use crate::errors::ValidationError;
use crate::types::{
    CreateNoteRequest, CreateUserRequest, LoginRequest, UpdateNoteRequest, UpdateUserRequest,
};
use uuid::Uuid;

/// Return the value if it is present and non-empty
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Roles must be a non-empty list of non-empty names
pub fn validate_roles(roles: Option<&[String]>) -> Option<&[String]> {
    roles.filter(|r| !r.is_empty() && r.iter().all(|role| !role.is_empty()))
}

/// Parse a record id supplied by the client
pub fn parse_id(raw: &str) -> Result<Uuid, ValidationError> {
    Uuid::parse_str(raw).map_err(|_| ValidationError::InvalidId(raw.to_string()))
}

/// Validated login credentials
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credentials<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

pub fn validate_login(req: &LoginRequest) -> Result<Credentials<'_>, ValidationError> {
    match (non_empty(req.username.as_deref()), non_empty(req.password.as_deref())) {
        (Some(username), Some(password)) => Ok(Credentials { username, password }),
        _ => Err(ValidationError::MissingFields(
            "All fields are required".to_string(),
        )),
    }
}

/// Validated input for creating a user
#[derive(Debug, Clone, Copy)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub roles: &'a [String],
}

pub fn validate_new_user(req: &CreateUserRequest) -> Result<NewUser<'_>, ValidationError> {
    let username = non_empty(req.username.as_deref());
    let password = non_empty(req.password.as_deref());
    let roles = validate_roles(req.roles.as_deref());

    match (username, password, roles) {
        (Some(username), Some(password), Some(roles)) => Ok(NewUser {
            username,
            password,
            roles,
        }),
        _ => Err(ValidationError::MissingFields(
            "All fields are required".to_string(),
        )),
    }
}

/// Validated input for updating a user
#[derive(Debug, Clone, Copy)]
pub struct UserChanges<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub roles: &'a [String],
    pub active: bool,
    pub password: Option<&'a str>,
}

pub fn validate_user_update(req: &UpdateUserRequest) -> Result<UserChanges<'_>, ValidationError> {
    let id = non_empty(req.id.as_deref());
    let username = non_empty(req.username.as_deref());
    let roles = validate_roles(req.roles.as_deref());

    match (id, username, roles, req.active) {
        (Some(id), Some(username), Some(roles), Some(active)) => Ok(UserChanges {
            id: parse_id(id)?,
            username,
            roles,
            active,
            password: non_empty(req.password.as_deref()),
        }),
        _ => Err(ValidationError::MissingFields(
            "All fields are required".to_string(),
        )),
    }
}

/// Validated input for creating a note
#[derive(Debug, Clone, Copy)]
pub struct NewNote<'a> {
    pub user: Uuid,
    pub title: &'a str,
    pub text: &'a str,
}

pub fn validate_new_note(req: &CreateNoteRequest) -> Result<NewNote<'_>, ValidationError> {
    let user = non_empty(req.user.as_deref());
    let title = non_empty(req.title.as_deref());
    let text = non_empty(req.text.as_deref());

    match (user, title, text) {
        (Some(user), Some(title), Some(text)) => Ok(NewNote {
            user: parse_id(user)?,
            title,
            text,
        }),
        _ => Err(ValidationError::MissingFields(
            "Provide a title, text and userId to create a note".to_string(),
        )),
    }
}

/// Validated input for updating a note; absent fields keep their stored value
#[derive(Debug, Clone, Copy)]
pub struct NoteChanges<'a> {
    pub id: Uuid,
    pub user: Uuid,
    pub title: Option<&'a str>,
    pub text: Option<&'a str>,
    pub completed: Option<bool>,
}

pub fn validate_note_update(req: &UpdateNoteRequest) -> Result<NoteChanges<'_>, ValidationError> {
    let id = non_empty(req.id.as_deref());
    let user = non_empty(req.user.as_deref());

    match (id, user) {
        (Some(id), Some(user)) => Ok(NoteChanges {
            id: parse_id(id)?,
            user: parse_id(user)?,
            title: non_empty(req.title.as_deref()),
            text: non_empty(req.text.as_deref()),
            completed: req.completed,
        }),
        _ => Err(ValidationError::MissingFields(
            "Note id and user id are required to update a note".to_string(),
        )),
    }
}

/// Id of the record to delete
pub fn validate_delete(id: Option<&str>) -> Result<Uuid, ValidationError> {
    match non_empty(id) {
        Some(id) => parse_id(id),
        None => Err(ValidationError::MissingFields(
            "Please provide the required id".to_string(),
        )),
    }
}
