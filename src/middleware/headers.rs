// ==============================================================================
// middleware/headers.rs - Response Hardening & Request Ids
// ==============================================================================
// Description: Security response headers and short per-request ids
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================

use axum::{
    http::{header, HeaderName, HeaderValue, Request},
    Router,
};
use tower_http::{
    request_id::{MakeRequestId, RequestId},
    set_header::SetResponseHeaderLayer,
};
use uuid::Uuid;

const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; \
    script-src 'self' 'unsafe-inline'; \
    style-src 'self' 'unsafe-inline'; \
    img-src 'self' data: https:; \
    font-src 'self' https:; \
    connect-src 'self' https:; \
    media-src 'self'; \
    object-src 'none'; \
    frame-ancestors 'none';";

const PERMISSIONS_POLICY: &str = "geolocation=(self), microphone=(), camera=(), payment=(), usb=()";

/// Header/value pairs added to every response that does not already set them
pub fn security_header_values() -> [(HeaderName, HeaderValue); 6] {
    [
        (header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
        (header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY")),
        (header::X_XSS_PROTECTION, HeaderValue::from_static("1; mode=block")),
        (
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ),
        (
            HeaderName::from_static("permissions-policy"),
            HeaderValue::from_static(PERMISSIONS_POLICY),
        ),
        (
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static(CONTENT_SECURITY_POLICY),
        ),
    ]
}

/// Layer the hardening headers onto a router
pub fn security_headers(router: Router) -> Router {
    security_header_values()
        .into_iter()
        .fold(router, |router, (name, value)| {
            router.layer(SetResponseHeaderLayer::if_not_present(name, value))
        })
}

/// Eight hex characters taken from a v4 UUID
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortRequestId;

impl MakeRequestId for ShortRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().simple().to_string();
        let short = id.get(..8)?;
        HeaderValue::from_str(short).ok().map(RequestId::new)
    }
}
