// ==============================================================================
// mapper.rs - Error Response Mapper
// ==============================================================================
// Description: Resolves failures to ErrorCodes and writes the canonical body
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
//
// Entry points:
//   unauthenticated()  no principal where one is required, bad gateway token
//   forbidden()        principal present but lacking the required role
//   map_errors         any AppError returned by handlers or extractors
//
// Bodies never contain stack traces, type names or rejected values; those
// are logged here and only here.
//
// ==============================================================================

use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::error::Error as StdError;
use tracing::{error, warn};

use crate::error::AppError;
use crate::error_code::ErrorCode;
use crate::failure::Failure;
use crate::models::{ErrorResponse, JSON_UTF8};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Written when the canonical body itself cannot be serialized
const FALLBACK_BODY: &str = concat!(
    r#"{"status":500,"code":"SYS000","message":"An internal server error occurred.","#,
    r#""service":"GLOBAL","path":""}"#
);

/// Fixed message for bodies that are not valid JSON
const MALFORMED_JSON_MESSAGE: &str = "Malformed JSON request body.";

// ==============================================================================
// RESOLUTION
// ==============================================================================

/// ErrorCode and client-facing message chosen for a failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub code: ErrorCode,
    pub message: String,
    /// Internal failures log at error level, the rest at warn
    pub internal: bool,
}

impl Resolution {
    fn business(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.message().to_string(),
            internal: false,
        }
    }

    fn internal(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.message().to_string(),
            internal: true,
        }
    }

    fn with_summary(code: ErrorCode, summary: &str) -> Self {
        let message = if summary.is_empty() {
            code.message().to_string()
        } else {
            format!("{}: {}", code.message(), summary)
        };
        Self {
            code,
            message,
            internal: false,
        }
    }

    fn from_failure(failure: &Failure) -> Self {
        if failure.is_internal() {
            Self::internal(failure.error_code())
        } else {
            Self::business(failure.error_code())
        }
    }
}

/// Classify a failure; the first matching rule wins
pub fn resolve(err: &AppError) -> Resolution {
    match err {
        AppError::Failure(failure) => Resolution::from_failure(failure),
        AppError::Validation(errors) => {
            Resolution::with_summary(ErrorCode::InvalidInputValue, &validation_summary(errors))
        }
        AppError::MissingParameter(name) => {
            Resolution::with_summary(ErrorCode::MissingRequiredParameter, name)
        }
        AppError::InvalidParameter(name) => {
            let name = name.as_deref().unwrap_or_default();
            Resolution::with_summary(ErrorCode::InvalidInputValue, name)
        }
        AppError::UnreadableBody(_) => Resolution {
            code: ErrorCode::InvalidInputValue,
            message: MALFORMED_JSON_MESSAGE.to_string(),
            internal: false,
        },
        AppError::UnsupportedMediaType(_) => Resolution::business(ErrorCode::UnsupportedMediaType),
        AppError::MethodNotAllowed => Resolution::business(ErrorCode::MethodNotAllowed),
        AppError::RouteNotFound => Resolution::business(ErrorCode::ResourceNotFound),
        AppError::Panic(_) => Resolution::internal(ErrorCode::InternalServerError),
        AppError::Unexpected(err) => {
            if let Some(failure) = err.downcast_ref::<Failure>() {
                Resolution::from_failure(failure)
            } else if let Some(errors) = err.downcast_ref::<validator::ValidationErrors>() {
                Resolution::with_summary(ErrorCode::InvalidInputValue, &validation_summary(errors))
            } else {
                Resolution::internal(ErrorCode::InternalServerError)
            }
        }
    }
}

/// `field: message` pairs sorted by field; rejected values are never echoed
pub fn validation_summary(errors: &validator::ValidationErrors) -> String {
    let mut fields: Vec<(String, String)> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let reasons: Vec<String> = errs
                .iter()
                .map(|e| match &e.message {
                    Some(message) => message.to_string(),
                    None => e.code.to_string(),
                })
                .collect();
            (field.to_string(), reasons.join("; "))
        })
        .collect();
    fields.sort();

    fields
        .iter()
        .map(|(field, reasons)| format!("{}: {}", field, reasons))
        .collect::<Vec<_>>()
        .join(", ")
}

// ==============================================================================
// REQUEST CONTEXT
// ==============================================================================

/// What the mapper needs to know about the request being answered
#[derive(Debug, Clone)]
pub struct RequestInfo {
    pub method: Method,
    pub path: String,
    pub request_id: Option<String>,
}

impl RequestInfo {
    pub fn from_request<B>(req: &axum::http::Request<B>) -> Self {
        Self {
            method: req.method().clone(),
            path: req.uri().path().to_string(),
            request_id: req
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        }
    }
}

/// Resolved failure waiting for its body, carried in response extensions
#[derive(Debug, Clone)]
pub struct PendingFailure {
    pub resolution: Resolution,
    /// Full cause chain, for logs only
    pub diagnostic: String,
}

impl PendingFailure {
    pub fn from_error(err: &AppError) -> Self {
        Self {
            resolution: resolve(err),
            diagnostic: cause_chain(err),
        }
    }
}

fn cause_chain(err: &(dyn StdError + 'static)) -> String {
    let mut chain = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push_str(": ");
        chain.push_str(&cause.to_string());
        source = cause.source();
    }
    chain
}

// ==============================================================================
// RENDERING
// ==============================================================================

/// Serialize the canonical body for a resolution
pub fn render_body(resolution: &Resolution, path: &str) -> Vec<u8> {
    let body = ErrorResponse::with_message(resolution.code, resolution.message.clone(), path);
    match serde_json::to_vec(&body) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!(error = %e, "Failed to serialize error body");
            FALLBACK_BODY.as_bytes().to_vec()
        }
    }
}

/// Build the full response for a resolution
pub fn render(resolution: &Resolution, path: &str) -> Response {
    let status = resolution.code.http_status();
    let bytes = render_body(resolution, path);
    (
        status,
        [(header::CONTENT_TYPE, HeaderValue::from_static(JSON_UTF8))],
        bytes,
    )
        .into_response()
}

fn log_failure(info: &RequestInfo, resolution: &Resolution, diagnostic: &str) {
    let request_id = info.request_id.as_deref().unwrap_or("-");
    if resolution.internal {
        error!(
            service = resolution.code.service().as_str(),
            code = resolution.code.code(),
            method = %info.method,
            path = %info.path,
            request_id,
            cause = diagnostic,
            "{}",
            resolution.code.message()
        );
    } else {
        warn!(
            service = resolution.code.service().as_str(),
            code = resolution.code.code(),
            method = %info.method,
            path = %info.path,
            request_id,
            cause = diagnostic,
            "{}",
            resolution.code.message()
        );
    }
}

// ==============================================================================
// ENTRY POINTS
// ==============================================================================

/// No usable principal, or a rejected gateway token
///
/// Uses the upstream failure's code when one was raised, otherwise
/// `AUTH_TOKEN_INVALID`.
pub fn unauthenticated(info: &RequestInfo, upstream: Option<&Failure>) -> Response {
    let (resolution, diagnostic) = match upstream {
        Some(failure) => (Resolution::from_failure(failure), cause_chain(failure)),
        None => (
            Resolution::business(ErrorCode::AuthTokenInvalid),
            "authentication required".to_string(),
        ),
    };
    log_failure(info, &resolution, &diagnostic);
    render(&resolution, &info.path)
}

/// Principal present but not allowed; the denied rule is never echoed
pub fn forbidden(info: &RequestInfo) -> Response {
    let resolution = Resolution::business(ErrorCode::AccessDenied);
    log_failure(info, &resolution, "access denied by path rule");
    render(&resolution, &info.path)
}

/// Any failure surfacing from business logic
pub fn uncaught(info: &RequestInfo, err: &AppError) -> Response {
    let pending = PendingFailure::from_error(err);
    log_failure(info, &pending.resolution, &pending.diagnostic);
    render(&pending.resolution, &info.path)
}

/// Middleware writing canonical bodies for responses produced from `AppError`
pub async fn map_errors(req: Request, next: Next) -> Response {
    let info = RequestInfo::from_request(&req);
    let mut response = next.run(req).await;

    if let Some(pending) = response.extensions_mut().remove::<PendingFailure>() {
        log_failure(&info, &pending.resolution, &pending.diagnostic);
        let bytes = render_body(&pending.resolution, &info.path);
        let headers = response.headers_mut();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(JSON_UTF8));
        headers.remove(header::CONTENT_LENGTH);
        *response.body_mut() = Body::from(bytes);
    }

    response
}

/// Router fallback for unknown paths
pub async fn route_not_found() -> AppError {
    AppError::RouteNotFound
}

/// Router fallback for known paths hit with the wrong method
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

/// `CatchPanicLayer` handler: the payload is logged, never returned
pub fn panic_response(payload: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    AppError::Panic(detail).into_response()
}
