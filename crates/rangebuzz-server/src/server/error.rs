//! HTTP-facing error type.
//!
//! [`ApiError`] wraps the library's validation [`rangebuzz::Error`] and adds
//! the service-level failure of a request arriving during shutdown. It
//! implements [`IntoResponse`] so handlers can return it directly:
//!
//! - validation errors map to `400 Bad Request` with the validation message as
//!   the body,
//! - `ServiceShutdown` maps to `503 Service Unavailable`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The client's range failed validation.
    #[error(transparent)]
    InvalidRange(#[from] rangebuzz::Error),

    /// The service is in the process of shutting down.
    #[error("Service is shutting down")]
    ServiceShutdown,
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRange(_) => StatusCode::BAD_REQUEST,
            Self::ServiceShutdown => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
