// ==============================================================================
// error_code.rs - ErrorCode Registry
// ==============================================================================
// Description: Closed catalog of failure kinds with stable wire codes
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
//
// Clients branch on `code`, never on `message`. Codes are stable across
// releases: never renumber an entry, only append new ones.
//
// ==============================================================================

use axum::http::StatusCode;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;

/// Subsystem that owns a failure kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ServiceTag {
    Global,
    Security,
}

impl ServiceTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceTag::Global => "GLOBAL",
            ServiceTag::Security => "SECURITY",
        }
    }
}

/// Failure kinds known to every service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // System / infrastructure (SYS***)
    InternalServerError,
    DatabaseError,
    RedisConnectionError,
    FileUploadFailed,
    EmailServiceDown,

    // Authentication / authorization (AUTH***)
    AuthHeaderMissing,
    AuthTokenMalformed,
    AuthTokenExpired,
    AuthTokenInvalid,
    AuthTokenLoggedOut,
    AuthUserNotFound,
    AuthRedisError,
    AuthSecurityContextError,
    AuthInternal,
    AccessDenied,

    // Client input (CLT***)
    InvalidInputValue,
    MissingRequiredParameter,
    UnsupportedMediaType,
    ResourceNotFound,
    MethodNotAllowed,

    // External APIs (EXT***)
    ExternalApiConnectionError,
    ExternalApiRateLimit,
    ExternalApiTimeout,
}

impl ErrorCode {
    /// Every registered code, in catalog order
    pub const ALL: [ErrorCode; 23] = [
        ErrorCode::InternalServerError,
        ErrorCode::DatabaseError,
        ErrorCode::RedisConnectionError,
        ErrorCode::FileUploadFailed,
        ErrorCode::EmailServiceDown,
        ErrorCode::AuthHeaderMissing,
        ErrorCode::AuthTokenMalformed,
        ErrorCode::AuthTokenExpired,
        ErrorCode::AuthTokenInvalid,
        ErrorCode::AuthTokenLoggedOut,
        ErrorCode::AuthUserNotFound,
        ErrorCode::AuthRedisError,
        ErrorCode::AuthSecurityContextError,
        ErrorCode::AuthInternal,
        ErrorCode::AccessDenied,
        ErrorCode::InvalidInputValue,
        ErrorCode::MissingRequiredParameter,
        ErrorCode::UnsupportedMediaType,
        ErrorCode::ResourceNotFound,
        ErrorCode::MethodNotAllowed,
        ErrorCode::ExternalApiConnectionError,
        ErrorCode::ExternalApiRateLimit,
        ErrorCode::ExternalApiTimeout,
    ];

    /// HTTP status as a plain integer
    pub fn status(&self) -> u16 {
        match self {
            ErrorCode::InternalServerError
            | ErrorCode::DatabaseError
            | ErrorCode::RedisConnectionError
            | ErrorCode::FileUploadFailed
            | ErrorCode::AuthSecurityContextError
            | ErrorCode::AuthInternal => 500,
            ErrorCode::EmailServiceDown
            | ErrorCode::AuthRedisError
            | ErrorCode::ExternalApiConnectionError => 503,
            ErrorCode::AuthHeaderMissing
            | ErrorCode::AuthTokenExpired
            | ErrorCode::AuthTokenInvalid
            | ErrorCode::AuthTokenLoggedOut
            | ErrorCode::AuthUserNotFound => 401,
            ErrorCode::AuthTokenMalformed
            | ErrorCode::InvalidInputValue
            | ErrorCode::MissingRequiredParameter => 400,
            ErrorCode::AccessDenied => 403,
            ErrorCode::UnsupportedMediaType => 415,
            ErrorCode::ResourceNotFound => 404,
            ErrorCode::MethodNotAllowed => 405,
            ErrorCode::ExternalApiRateLimit => 429,
            ErrorCode::ExternalApiTimeout => 504,
        }
    }

    /// HTTP status for the response line
    pub fn http_status(&self) -> StatusCode {
        StatusCode::from_u16(self.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Stable wire code
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::InternalServerError => "SYS000",
            ErrorCode::DatabaseError => "SYS001",
            ErrorCode::RedisConnectionError => "SYS002",
            ErrorCode::FileUploadFailed => "SYS003",
            ErrorCode::EmailServiceDown => "SYS004",
            ErrorCode::AuthHeaderMissing => "AUTH001",
            ErrorCode::AuthTokenMalformed => "AUTH002",
            ErrorCode::AuthTokenExpired => "AUTH003",
            ErrorCode::AuthTokenInvalid => "AUTH004",
            ErrorCode::AuthTokenLoggedOut => "AUTH005",
            ErrorCode::AuthUserNotFound => "AUTH006",
            ErrorCode::AuthRedisError => "AUTH007",
            ErrorCode::AuthSecurityContextError => "AUTH008",
            ErrorCode::AuthInternal => "AUTH009",
            ErrorCode::AccessDenied => "AUTH010",
            ErrorCode::InvalidInputValue => "CLT001",
            ErrorCode::MissingRequiredParameter => "CLT002",
            ErrorCode::UnsupportedMediaType => "CLT003",
            ErrorCode::ResourceNotFound => "CLT004",
            ErrorCode::MethodNotAllowed => "CLT005",
            ErrorCode::ExternalApiConnectionError => "EXT000",
            ErrorCode::ExternalApiRateLimit => "EXT001",
            ErrorCode::ExternalApiTimeout => "EXT002",
        }
    }

    /// Human readable message (safe to return to clients)
    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::InternalServerError => "An internal server error occurred.",
            ErrorCode::DatabaseError => "A database error occurred while processing the request.",
            ErrorCode::RedisConnectionError => "Failed to connect to the cache server.",
            ErrorCode::FileUploadFailed => "File upload failed.",
            ErrorCode::EmailServiceDown => "The email service is currently unavailable.",
            ErrorCode::AuthHeaderMissing => "Authentication token is missing.",
            ErrorCode::AuthTokenMalformed => "Token format is invalid.",
            ErrorCode::AuthTokenExpired => "Access token has expired.",
            ErrorCode::AuthTokenInvalid => "Access token is invalid.",
            ErrorCode::AuthTokenLoggedOut => "Token has already been logged out.",
            ErrorCode::AuthUserNotFound => "Authenticated user could not be found.",
            ErrorCode::AuthRedisError => "A cache server error occurred during session validation.",
            ErrorCode::AuthSecurityContextError => "Failed to establish the security context.",
            ErrorCode::AuthInternal => "An internal error occurred during authentication.",
            ErrorCode::AccessDenied => "Access denied.",
            ErrorCode::InvalidInputValue => "Invalid input value.",
            ErrorCode::MissingRequiredParameter => "A required parameter is missing.",
            ErrorCode::UnsupportedMediaType => "Unsupported media type.",
            ErrorCode::ResourceNotFound => "The requested resource was not found.",
            ErrorCode::MethodNotAllowed => "HTTP method not allowed.",
            ErrorCode::ExternalApiConnectionError => "Failed to connect to an external API.",
            ErrorCode::ExternalApiRateLimit => "External API rate limit exceeded.",
            ErrorCode::ExternalApiTimeout => "External API request timed out.",
        }
    }

    /// Owning subsystem
    pub fn service(&self) -> ServiceTag {
        match self {
            ErrorCode::AuthHeaderMissing
            | ErrorCode::AuthTokenMalformed
            | ErrorCode::AuthTokenExpired
            | ErrorCode::AuthTokenInvalid
            | ErrorCode::AuthTokenLoggedOut
            | ErrorCode::AuthUserNotFound
            | ErrorCode::AuthRedisError
            | ErrorCode::AuthSecurityContextError
            | ErrorCode::AuthInternal
            | ErrorCode::AccessDenied => ServiceTag::Security,
            _ => ServiceTag::Global,
        }
    }

    /// Look up a registered code by its stable wire code
    pub fn from_code(code: &str) -> Option<ErrorCode> {
        ErrorCode::ALL.iter().copied().find(|c| c.code() == code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.message())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ErrorCode", 4)?;
        state.serialize_field("status", &self.status())?;
        state.serialize_field("code", self.code())?;
        state.serialize_field("message", self.message())?;
        state.serialize_field("service", &self.service())?;
        state.end()
    }
}
