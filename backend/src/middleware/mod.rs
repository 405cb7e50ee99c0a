//! Request middleware

pub mod rate_limit;

pub use rate_limit::{login_rate_limit, LoginRateLimiter};
