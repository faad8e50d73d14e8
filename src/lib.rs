// ==============================================================================
// lib.rs - Gateway Trust Security Layer
// ==============================================================================
// Description: Trusts identity headers injected by an upstream gateway,
//              enforces path access rules and renders every failure as one
//              canonical JSON error body
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================

pub mod config;
pub mod error;
pub mod error_code;
pub mod failure;
pub mod mapper;
pub mod middleware;
pub mod models;
pub mod path_pattern;
pub mod principal;
pub mod router;
pub mod rules;
pub mod security;
pub mod state;

pub use config::{ConfigError, GatewayTrustConfig};
pub use error::{AppError, AppResult};
pub use error_code::{ErrorCode, ServiceTag};
pub use failure::Failure;
pub use middleware::CurrentUser;
pub use models::ErrorResponse;
pub use principal::Principal;
pub use router::secure;
pub use rules::{AccessRules, Decision, Requirement};
pub use state::SecurityState;
