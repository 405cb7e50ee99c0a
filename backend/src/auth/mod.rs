//! Authentication module
//!
//! JWT access/refresh tokens, argon2 password hashing and the refresh
//! token cookie.

mod jwt;
mod middleware;
mod password;
mod session_cookie;

pub use jwt::{AccessClaims, JwtService, RefreshClaims, TokenError, UserInfo};
pub use middleware::AuthUser;
pub use password::PasswordService;
pub use session_cookie::{RefreshCookie, REFRESH_COOKIE_NAME};
