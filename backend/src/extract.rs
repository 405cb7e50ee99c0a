//! Request body extraction
//!
//! `ApiJson` replaces `axum::Json` on handlers that read a body so that a
//! missing content type, malformed JSON or a mistyped field comes back as a
//! `400` in the usual error shape instead of axum's plain-text rejection.

use crate::error::ApiError;
use axum::extract::FromRequest;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
