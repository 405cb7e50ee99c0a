//! Database repositories
//!
//! The credential and note stores are traits so handlers work the same
//! against PostgreSQL and the in-process store used for local runs and tests.

pub mod memory;
pub mod note;
pub mod user;

use async_trait::async_trait;
use technotes_shared::{Note, User};
use thiserror::Error;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use note::PgNoteRepository;
pub use user::PgUserRepository;

/// Store failure
#[derive(Error, Debug)]
pub enum StoreError {
    /// A unique or referential constraint rejected the write
    #[error("{0}")]
    Conflict(String),

    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Map constraint violations to `Conflict`, everything else stays a database error
pub(crate) fn classify(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        match db.code().as_deref() {
            Some("23505") => return StoreError::Conflict("Duplicate value".to_string()),
            Some("23503") => {
                return StoreError::Conflict("Record is still referenced".to_string())
            }
            _ => {}
        }
    }
    StoreError::Database(err)
}

/// Input for creating a user
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub password_hash: String,
    pub roles: Vec<String>,
}

/// Input for creating a note
#[derive(Debug, Clone)]
pub struct CreateNote {
    pub user: Uuid,
    pub title: String,
    pub text: String,
}

/// Persisted user records
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn list(&self) -> StoreResult<Vec<User>>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Exact username match, used by login and refresh
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    /// Case-insensitive username match, used for uniqueness checks
    async fn find_by_username_ci(&self, username: &str) -> StoreResult<Option<User>>;

    async fn create(&self, input: CreateUser) -> StoreResult<User>;

    /// Persist username, password hash, roles and active flag.
    /// Returns `None` when the user no longer exists.
    async fn update(&self, user: &User) -> StoreResult<Option<User>>;

    async fn delete(&self, id: Uuid) -> StoreResult<bool>;

    async fn count(&self) -> StoreResult<i64>;

    /// Readiness probe
    async fn ping(&self) -> StoreResult<()>;
}

/// Persisted notes
#[async_trait]
pub trait NoteStore: Send + Sync {
    async fn list(&self) -> StoreResult<Vec<Note>>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Note>>;

    /// Case-insensitive title match, used for uniqueness checks
    async fn find_by_title_ci(&self, title: &str) -> StoreResult<Option<Note>>;

    async fn exists_for_user(&self, user: Uuid) -> StoreResult<bool>;

    /// Insert with `completed = false` and the next ticket number
    async fn create(&self, input: CreateNote) -> StoreResult<Note>;

    /// Persist owner, title, text and completion.
    /// Returns `None` when the note no longer exists.
    async fn update(&self, note: &Note) -> StoreResult<Option<Note>>;

    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
}
