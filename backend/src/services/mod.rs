//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! the stores and the token machinery. Handlers stay thin.

pub mod auth;
pub mod note;
pub mod user;

pub use auth::{AuthService, IssuedTokens};
pub use note::NoteService;
pub use user::UserService;
