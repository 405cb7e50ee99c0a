//! Login rate limiting
//!
//! Fixed window per client address: at most `max_attempts` requests per
//! `window`, after which the client receives `429` until the window rolls
//! over. Applied as a route layer so it runs before credential checks.
//!
//! The client address is the socket peer. `X-Forwarded-For` and `X-Real-IP`
//! are only consulted when `trust_proxy_headers` is set, since clients can
//! send arbitrary values for them.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

pub const TOO_MANY_LOGINS: &str =
    "Too many login attempts from this IP, please try again after a 60 second pause";

/// Counter for one client in the current window
#[derive(Debug)]
struct Window {
    requests: u32,
    started: Instant,
}

/// Outcome of counting one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Seconds until the window resets
    pub reset_secs: u64,
}

#[derive(Debug, Clone)]
pub struct LoginRateLimiter {
    windows: Arc<DashMap<String, Window>>,
    max_attempts: u32,
    window: Duration,
    trust_proxy_headers: bool,
}

impl LoginRateLimiter {
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            windows: Arc::new(DashMap::new()),
            max_attempts,
            window,
            trust_proxy_headers: false,
        }
    }

    /// Key clients on forwarding headers set by a reverse proxy
    pub fn trusting_proxy_headers(mut self, trust: bool) -> Self {
        self.trust_proxy_headers = trust;
        self
    }

    /// Count a request from `client` and decide whether it may proceed
    pub fn check(&self, client: &str) -> Decision {
        self.check_at(client, Instant::now())
    }

    fn check_at(&self, client: &str, now: Instant) -> Decision {
        let mut entry = self
            .windows
            .entry(client.to_string())
            .or_insert_with(|| Window {
                requests: 0,
                started: now,
            });

        if now.duration_since(entry.started) >= self.window {
            entry.requests = 0;
            entry.started = now;
        }

        let allowed = entry.requests < self.max_attempts;
        if allowed {
            entry.requests += 1;
        }

        let elapsed = now.duration_since(entry.started);
        Decision {
            allowed,
            limit: self.max_attempts,
            remaining: self.max_attempts.saturating_sub(entry.requests),
            reset_secs: self.window.saturating_sub(elapsed).as_secs(),
        }
    }

    /// Drop windows that have already expired
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.windows
            .retain(|_, w| now.duration_since(w.started) < self.window);
    }
}

/// Client address: the socket peer, or with `trust_proxy_headers` the first
/// `X-Forwarded-For` hop, then `X-Real-IP`, then the peer
pub fn client_key(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trust_proxy_headers: bool,
) -> String {
    let forwarded = if trust_proxy_headers {
        forwarded_client(headers)
    } else {
        None
    };

    forwarded
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

fn forwarded_client(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        })
}

/// Middleware limiting login attempts
pub async fn login_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);
    let client = client_key(
        request.headers(),
        peer,
        state.login_limiter.trust_proxy_headers,
    );
    let decision = state.login_limiter.check(&client);

    let mut response = if decision.allowed {
        next.run(request).await
    } else {
        warn!(
            client = %client,
            method = %request.method(),
            uri = %request.uri(),
            "Too many login requests"
        );
        ApiError::TooManyRequests(TOO_MANY_LOGINS.to_string()).into_response()
    };

    let headers = response.headers_mut();
    for (name, value) in [
        ("ratelimit-limit", decision.limit as u64),
        ("ratelimit-remaining", decision.remaining as u64),
        ("ratelimit-reset", decision.reset_secs),
    ] {
        headers.insert(HeaderName::from_static(name), HeaderValue::from(value));
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_up_to_limit_then_blocks() {
        let limiter = LoginRateLimiter::new(5, Duration::from_secs(60));
        let now = Instant::now();

        for i in 0..5 {
            let decision = limiter.check_at("1.2.3.4", now);
            assert!(decision.allowed, "attempt {} should pass", i + 1);
            assert_eq!(decision.remaining, 4 - i);
        }
        assert!(!limiter.check_at("1.2.3.4", now).allowed);
    }

    #[test]
    fn test_clients_are_counted_separately() {
        let limiter = LoginRateLimiter::new(1, Duration::from_secs(60));
        let now = Instant::now();

        assert!(limiter.check_at("1.1.1.1", now).allowed);
        assert!(!limiter.check_at("1.1.1.1", now).allowed);
        assert!(limiter.check_at("2.2.2.2", now).allowed);
    }

    #[test]
    fn test_window_resets() {
        let limiter = LoginRateLimiter::new(1, Duration::from_secs(60));
        let now = Instant::now();

        assert!(limiter.check_at("1.1.1.1", now).allowed);
        assert!(!limiter.check_at("1.1.1.1", now + Duration::from_secs(30)).allowed);
        assert!(limiter.check_at("1.1.1.1", now + Duration::from_secs(60)).allowed);
    }

    #[test]
    fn test_client_key_ignores_forwarding_headers_by_default() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("9.9.9.9"));
        headers.insert("x-real-ip", HeaderValue::from_static("8.8.8.8"));
        let peer: SocketAddr = "127.0.0.1:4000".parse().unwrap();

        assert_eq!(client_key(&headers, Some(peer), false), "127.0.0.1");
        assert_eq!(client_key(&headers, None, false), "unknown");
    }

    #[test]
    fn test_client_key_behind_trusted_proxy() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("9.9.9.9, 10.0.0.1"));
        headers.insert("x-real-ip", HeaderValue::from_static("8.8.8.8"));
        let peer: SocketAddr = "127.0.0.1:4000".parse().unwrap();

        assert_eq!(client_key(&headers, Some(peer), true), "9.9.9.9");
        headers.remove("x-forwarded-for");
        assert_eq!(client_key(&headers, Some(peer), true), "8.8.8.8");
        headers.remove("x-real-ip");
        assert_eq!(client_key(&headers, Some(peer), true), "127.0.0.1");
    }
}
