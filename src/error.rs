// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error types for the bot verdict service.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Startup configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid User-Agent pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid bind address: {0}")]
    InvalidBindAddr(String),

    #[error("Invalid allowed origin: {0}")]
    InvalidOrigin(String),

    #[error("Invalid resolver URL {url}: {source}")]
    InvalidResolverUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("Failed to register metrics: {0}")]
    Metrics(#[from] prometheus::Error),
}

/// Failures of a network-identity lookup.
///
/// These never reach a caller of the classifier; the reputation adapter
/// absorbs them.
#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("Not an IP address: {0}")]
    InvalidAddress(String),

    #[error("Lookup transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Lookup service returned status {0}")]
    Status(u16),

    #[error("Malformed lookup response: {0}")]
    Decode(String),
}

/// Caller errors rejected before classification.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

/// HTTP-facing error.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Internal server error")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<ClassifyError> for AppError {
    fn from(_: ClassifyError) -> Self {
        AppError::InvalidRequest("Missing user_agent or IP.".to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Internal(detail) => {
                tracing::error!(detail = %detail, "Internal fault while classifying");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
