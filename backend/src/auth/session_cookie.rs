//! Refresh token cookie
//!
//! The refresh token lives in a `__Host-` prefixed, partitioned cookie so
//! browsers still send it when the frontend and the API sit on different
//! top-level sites. The prefix obliges `Secure`, `Path=/` and no `Domain`.
//!
//! A browser only drops a cookie when the removal carries the same name and
//! attributes it was set with, so issuing and clearing share one builder.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use ::cookie::CookieBuilder;
use time::{Duration, OffsetDateTime};

pub const REFRESH_COOKIE_NAME: &str = "__Host-jwt";

/// Builds the refresh cookie and its removal
#[derive(Debug, Clone)]
pub struct RefreshCookie {
    max_age: Duration,
}

impl RefreshCookie {
    pub fn new(max_age_secs: i64) -> Self {
        Self {
            max_age: Duration::seconds(max_age_secs),
        }
    }

    /// Cookie carrying a freshly issued refresh token
    pub fn issue(&self, refresh_token: String) -> Cookie<'static> {
        Self::with_attributes(refresh_token)
            .max_age(self.max_age)
            .build()
    }

    /// Cookie instructing the browser to drop the refresh token
    pub fn clear(&self) -> Cookie<'static> {
        Self::with_attributes(String::new())
            .max_age(Duration::ZERO)
            .expires(OffsetDateTime::UNIX_EPOCH)
            .build()
    }

    /// Refresh token sent by the client, if any
    pub fn read(jar: &CookieJar) -> Option<String> {
        jar.get(REFRESH_COOKIE_NAME)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty())
    }

    fn with_attributes(value: String) -> CookieBuilder<'static> {
        Cookie::build((REFRESH_COOKIE_NAME, value))
            .http_only(true)
            .secure(true)
            .same_site(SameSite::None)
            .path("/")
            .partitioned(true)
    }
}
