// ==============================================================================
// models.rs - Wire Models
// ==============================================================================
// Description: Canonical error body shared by every service
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================

use serde::{Deserialize, Serialize};

use crate::error_code::ErrorCode;

/// Content type of every error body
pub const JSON_UTF8: &str = "application/json; charset=utf-8";

/// Error response
///
/// Field order is part of the wire contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub code: String,
    pub message: String,
    pub service: String,
    pub path: String,
}

impl ErrorResponse {
    /// Body carrying the code's own message
    pub fn from_code(code: ErrorCode, path: impl Into<String>) -> Self {
        Self::with_message(code, code.message(), path)
    }

    /// Body with an overridden message (validation summaries)
    pub fn with_message(
        code: ErrorCode,
        message: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            status: code.status(),
            code: code.code().to_string(),
            message: message.into(),
            service: code.service().as_str().to_string(),
            path: path.into(),
        }
    }
}
