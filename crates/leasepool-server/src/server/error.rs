//! Error types for the lease service.
//!
//! [`Error`] covers every way a request can fail before or instead of reaching
//! the pool. It implements [`IntoResponse`] so handlers can return it
//! directly; the body is the plain-text message clients of the service have
//! always received.
//!
//! ## Error Cases
//! - `InvalidRequest`: `amount` or `duration` was missing, non-numeric or out
//!   of range.
//! - `MalformedUrl`: the request targeted an unknown path.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

pub type Result<T> = core::result::Result<T, Error>;

/// Body sent for every rejected lease request.
pub const INVALID_REQUEST_BODY: &str = "ERROR: request may contain incorrect 'amount' and \
     'duration' values. Must be only numbers and 'amount' must be less or equal to available \
     IPs in the pool";

/// Body sent for requests to unknown paths.
pub const MALFORMED_URL_BODY: &str = "ERROR: url request is malformed";

/// Unified error type for the lease service.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// The client request was invalid or exceeded constraints.
    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// The client requested a path the service does not serve.
    #[error("Malformed URL: {path}")]
    MalformedUrl { path: String },
}

impl Error {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::debug!("rejecting request: {self}");
        match self {
            Error::InvalidRequest { .. } => {
                (StatusCode::BAD_REQUEST, INVALID_REQUEST_BODY).into_response()
            }
            Error::MalformedUrl { .. } => {
                (StatusCode::NOT_FOUND, MALFORMED_URL_BODY).into_response()
            }
        }
    }
}
