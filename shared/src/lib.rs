//! Technotes Shared Library
//!
//! This crate contains the request/response types, models and input
//! validation shared by the backend and its API clients.

pub mod errors;
pub mod models;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use errors::*;
pub use models::{Note, User, UserSummary};
pub use types::*;
