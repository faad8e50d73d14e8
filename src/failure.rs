// ==============================================================================
// failure.rs - Structured Failures
// ==============================================================================
// Description: Business and internal failures carrying a registered ErrorCode
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
//
// A Failure is built where the problem is detected, travels up unmodified and
// is consumed once by the error mapper. The detail text and any wrapped cause
// are for logs only; the response carries the ErrorCode's own message.
//
// ==============================================================================

use thiserror::Error;

use crate::error_code::ErrorCode;

type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum Failure {
    /// Caller or domain attributable failure
    #[error("{}{}", .code.message(), detail_suffix(.detail))]
    Business {
        code: ErrorCode,
        detail: Option<String>,
    },

    /// Server or infrastructure failure
    #[error("{}{}", .code.message(), detail_suffix(.detail))]
    Internal {
        code: ErrorCode,
        detail: Option<String>,
        #[source]
        cause: Option<Cause>,
    },
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(detail) => format!(": {}", detail),
        None => String::new(),
    }
}

impl Failure {
    pub fn business(code: ErrorCode) -> Self {
        Failure::Business { code, detail: None }
    }

    pub fn internal(code: ErrorCode) -> Self {
        Failure::Internal {
            code,
            detail: None,
            cause: None,
        }
    }

    /// Internal failure wrapping the underlying error for diagnostics
    pub fn internal_caused_by(code: ErrorCode, cause: impl Into<Cause>) -> Self {
        Failure::Internal {
            code,
            detail: None,
            cause: Some(cause.into()),
        }
    }

    /// Attach detail text (replaces any existing detail)
    pub fn with_detail(self, text: impl Into<String>) -> Self {
        let text = Some(text.into());
        match self {
            Failure::Business { code, .. } => Failure::Business { code, detail: text },
            Failure::Internal { code, cause, .. } => Failure::Internal {
                code,
                detail: text,
                cause,
            },
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            Failure::Business { code, .. } | Failure::Internal { code, .. } => *code,
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            Failure::Business { detail, .. } | Failure::Internal { detail, .. } => {
                detail.as_deref()
            }
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, Failure::Internal { .. })
    }

    /// HTTP status of the carried code
    pub fn status(&self) -> u16 {
        self.error_code().status()
    }
}
