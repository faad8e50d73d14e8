// ==============================================================================
// error.rs - Application Error
// ==============================================================================
// Description: The one failure type handlers return; every variant is
//              resolved to an ErrorCode by the error mapper
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================

use axum::extract::path::ErrorKind;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::error_code::ErrorCode;
use crate::failure::Failure;
use crate::mapper::PendingFailure;

/// Convenient result alias for handlers
pub type AppResult<T> = Result<T, AppError>;

/// Any failure surfacing from a handler or extractor
///
/// `IntoResponse` resolves the ErrorCode and sets the status; the body is
/// written by [`crate::mapper::map_errors`], which knows the request path.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Failure(#[from] Failure),

    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter value{}", param_suffix(.0))]
    InvalidParameter(Option<String>),

    #[error("Unreadable request body: {0}")]
    UnreadableBody(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("No route matches the request path")]
    RouteNotFound,

    #[error("Handler panicked: {0}")]
    Panic(String),

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

fn param_suffix(name: &Option<String>) -> String {
    match name {
        Some(name) => format!(": {}", name),
        None => String::new(),
    }
}

impl AppError {
    /// Shorthand for a business failure
    pub fn business(code: ErrorCode) -> Self {
        AppError::Failure(Failure::business(code))
    }

    /// Shorthand for an internal failure
    pub fn internal(code: ErrorCode) -> Self {
        AppError::Failure(Failure::internal(code))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let pending = PendingFailure::from_error(&self);
        let mut response = pending.resolution.code.http_status().into_response();
        response.extensions_mut().insert(pending);
        response
    }
}

// ==============================================================================
// EXTRACTOR REJECTIONS
// ==============================================================================

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(r) => {
                AppError::UnsupportedMediaType(r.body_text())
            }
            JsonRejection::JsonDataError(r) => AppError::UnreadableBody(r.body_text()),
            JsonRejection::JsonSyntaxError(r) => AppError::UnreadableBody(r.body_text()),
            other => AppError::UnreadableBody(other.body_text()),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        let text = rejection.body_text();
        match missing_field(&text) {
            Some(field) => AppError::MissingParameter(field),
            None => AppError::InvalidParameter(None),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        match rejection {
            PathRejection::FailedToDeserializePathParams(err) => match err.kind() {
                ErrorKind::ParseErrorAtKey { key, .. }
                | ErrorKind::DeserializeError { key, .. }
                | ErrorKind::InvalidUtf8InPathParam { key } => {
                    AppError::InvalidParameter(Some(key.clone()))
                }
                _ => AppError::InvalidParameter(None),
            },
            // Route and extractor disagree: a server bug, not a client error
            other => AppError::Unexpected(anyhow::anyhow!(other.body_text())),
        }
    }
}

/// Pull the field name out of serde's "missing field `name`" message
fn missing_field(text: &str) -> Option<String> {
    let start = text.find("missing field `")? + "missing field `".len();
    let rest = &text[start..];
    let end = rest.find('`')?;
    Some(rest[..end].to_string())
}
