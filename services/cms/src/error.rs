//! services/cms/src/error.rs
//!
//! Defines the primary error type for the entire CMS service.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use cms_core::ports::PortError;
use tracing::error;

use crate::config::ConfigError;

/// The primary error type for the `cms` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// Anything that reaches the HTTP layer as an `ApiError` is a server fault.
/// User-facing conditions are turned into flashes before they get here.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("Request failed: {}", self);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain")],
            "Internal Server Error",
        )
            .into_response()
    }
}
