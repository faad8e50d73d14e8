// ==============================================================================
// middleware/auth.rs - Gateway Trust Filter
// ==============================================================================
// Description: Verify the gateway token, materialize the principal from
//              identity headers and enforce path access rules
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
//
// Security: only the upstream gateway may assert identity. When a shared
// secret is configured, requests without a matching X-Gateway-Token are
// rejected with 401 before any identity header is read.
//
// The principal lives in the request extensions for the lifetime of the
// request. Handlers receive it explicitly through the `CurrentUser`
// extractor.
//
// ==============================================================================

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts, Request, State},
    http::{request::Parts, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::convert::Infallible;
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::error_code::ErrorCode;
use crate::failure::Failure;
use crate::mapper::{self, RequestInfo};
use crate::principal::Principal;
use crate::rules::Decision;
use crate::security::verify_gateway_token;
use crate::state::SecurityState;

// Headers set by the gateway
pub const HEADER_USER_ID: &str = "x-user-id";
pub const HEADER_USERNAME: &str = "x-username";
pub const HEADER_EMAIL: &str = "x-user-email";
pub const HEADER_ROLES: &str = "x-user-roles";
pub const HEADER_ENABLED: &str = "x-user-enabled";

// Proves the headers above came from the gateway
pub const HEADER_GATEWAY_TOKEN: &str = "x-gateway-token";

/// Header values that cannot be read as text
#[derive(Error, Debug)]
pub enum HeaderError {
    #[error("Header {0} is not valid UTF-8")]
    InvalidUtf8(&'static str),
}

// ==============================================================================
// TRUST DECISION
// ==============================================================================

/// Decide who the request is acting as
///
/// `Ok(None)` means no identity was asserted. Errors are business failures
/// for trust problems and `AUTH_INTERNAL` for anything unexpected.
pub fn authenticate(
    state: &SecurityState,
    headers: &HeaderMap,
) -> Result<Option<Principal>, Failure> {
    if let Some(expected) = state.gateway_token() {
        let presented = headers
            .get(HEADER_GATEWAY_TOKEN)
            .and_then(|v| v.to_str().ok());
        if !verify_gateway_token(expected, presented) {
            return Err(Failure::business(ErrorCode::AuthTokenInvalid));
        }
    }

    principal_from_headers(headers)
}

/// Build the principal from identity headers; all or nothing
pub fn principal_from_headers(headers: &HeaderMap) -> Result<Option<Principal>, Failure> {
    let user_id = match header_text(headers, HEADER_USER_ID)? {
        Some(id) if !id.trim().is_empty() => id,
        _ => return Ok(None),
    };

    let mut roles: Vec<&str> = Vec::new();
    for value in headers.get_all(HEADER_ROLES) {
        roles.extend(decode(value, HEADER_ROLES)?.split(','));
    }

    let principal = Principal::new(user_id)?
        .with_username(header_text(headers, HEADER_USERNAME)?)
        .with_email(header_text(headers, HEADER_EMAIL)?)
        .with_roles(roles)
        .with_enabled(parse_enabled(header_text(headers, HEADER_ENABLED)?));

    Ok(Some(principal))
}

fn header_text<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<Option<&'a str>, Failure> {
    headers.get(name).map(|value| decode(value, name)).transpose()
}

/// Gateways forward display names as raw UTF-8, not only visible ASCII
fn decode<'a>(value: &'a HeaderValue, name: &'static str) -> Result<&'a str, Failure> {
    std::str::from_utf8(value.as_bytes()).map_err(|_| {
        Failure::internal_caused_by(ErrorCode::AuthInternal, HeaderError::InvalidUtf8(name))
    })
}

/// Absent or unparseable values mean enabled
fn parse_enabled(value: Option<&str>) -> bool {
    match value.map(|v| v.trim().to_ascii_lowercase()) {
        Some(v) if v == "false" => false,
        Some(v) if v == "true" || v.is_empty() => true,
        Some(v) => {
            debug!(value = %v, "Unparseable {} header, treating as enabled", HEADER_ENABLED);
            true
        }
        None => true,
    }
}

/// First X-Forwarded-For hop, then X-Real-IP
fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
        })
        .unwrap_or("unknown")
        .to_string()
}

// ==============================================================================
// MIDDLEWARE
// ==============================================================================

/// Gateway trust filter
///
/// Installs the principal, or clears any stale one, then runs the rest of the
/// chain exactly once. Trust failures are answered here and never reach
/// handlers.
pub async fn gateway_trust(
    State(state): State<SecurityState>,
    mut req: Request,
    next: Next,
) -> Response {
    req.extensions_mut().remove::<Principal>();

    if !state.is_enabled() {
        return next.run(req).await;
    }

    match authenticate(&state, req.headers()) {
        Ok(Some(principal)) => {
            debug!(
                user = principal.username(),
                roles = ?principal.roles(),
                "Authenticated user"
            );
            req.extensions_mut().insert(principal);
        }
        Ok(None) => {
            debug!("No user authentication found in headers");
        }
        Err(failure) => {
            let info = RequestInfo::from_request(&req);
            if failure.error_code() == ErrorCode::AuthTokenInvalid {
                warn!(
                    client_ip = %client_ip(req.headers()),
                    path = %info.path,
                    "Invalid gateway token"
                );
            }
            return reject(&info, failure);
        }
    }

    next.run(req).await
}

/// Authorization rule evaluator
pub async fn enforce_access_rules(
    State(state): State<SecurityState>,
    req: Request,
    next: Next,
) -> Response {
    if !state.is_enabled() {
        return next.run(req).await;
    }

    let decision = state
        .rules()
        .evaluate(req.uri().path(), req.extensions().get::<Principal>());

    match decision {
        Decision::Allow => next.run(req).await,
        Decision::Unauthenticated => {
            mapper::unauthenticated(&RequestInfo::from_request(&req), None)
        }
        Decision::Forbidden => mapper::forbidden(&RequestInfo::from_request(&req)),
    }
}

fn reject(info: &RequestInfo, failure: Failure) -> Response {
    if failure.is_internal() {
        mapper::uncaught(info, &AppError::Failure(failure))
    } else {
        mapper::unauthenticated(info, Some(&failure))
    }
}

// ==============================================================================
// EXTRACTOR
// ==============================================================================

/// Principal installed by the gateway trust filter
///
/// # Example
/// ```rust,ignore
/// async fn me(CurrentUser(user): CurrentUser) -> String {
///     format!("Hello, {}!", user.username())
/// }
/// ```
///
/// Use `Option<CurrentUser>` on public routes.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Principal);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| AppError::business(ErrorCode::AuthTokenInvalid))
    }
}

impl<S> OptionalFromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<Principal>().cloned().map(CurrentUser))
    }
}
