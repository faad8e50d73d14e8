// ==============================================================================
// middleware/mod.rs - Request Filter Chain
// ==============================================================================
// Description: Gateway trust, access rules and response hardening
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================

pub mod auth;
pub mod headers;

pub use auth::{authenticate, enforce_access_rules, gateway_trust, CurrentUser};
