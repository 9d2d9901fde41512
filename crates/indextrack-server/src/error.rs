use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use indextrack_core::{FetchFailure, ValidationError};
use serde_json::json;
use thiserror::Error;

/// Request-level errors, rendered as `{"error": "..."}`. Upstream failures
/// share one message; their cause is only logged.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    InvalidSymbol(#[from] ValidationError),

    #[error("invalid period1 '{value}'")]
    InvalidPeriod1 { value: String },

    #[error("Failed to fetch stock data")]
    Upstream(FetchFailure),
}

impl ServerError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidSymbol(_) | Self::InvalidPeriod1 { .. } => StatusCode::BAD_REQUEST,
            Self::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}

/// Startup failures of the server binary, mapped to process exit codes.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server stopped: {0}")]
    Serve(#[source] std::io::Error),
}

impl LaunchError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Bind { .. } => 10,
            Self::Serve(_) => 1,
        }
    }
}
