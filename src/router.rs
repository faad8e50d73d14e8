// ==============================================================================
// router.rs - Filter Chain Assembly
// ==============================================================================
// Description: Wraps a service router in the trust filter, access rules,
//              error mapper and ambient layers, in a fixed order
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
//
// Request order (outermost first):
//   set request id -> propagate request id -> trace -> security headers
//   -> map_errors -> gateway_trust -> enforce_access_rules -> catch panic
//   -> handler / fallbacks
//
// ==============================================================================

use axum::{
    extract::Request,
    middleware::{from_fn, from_fn_with_state},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info_span, Span};

use crate::mapper::{self, REQUEST_ID_HEADER};
use crate::middleware::{
    enforce_access_rules, gateway_trust,
    headers::{security_headers, ShortRequestId},
};
use crate::state::SecurityState;

/// Install the full chain around `router`
///
/// Call after every route is registered and state is attached.
pub fn secure(router: Router, state: SecurityState) -> Router {
    let router = router
        .fallback(mapper::route_not_found)
        .method_not_allowed_fallback(mapper::method_not_allowed)
        .layer(CatchPanicLayer::custom(mapper::panic_response))
        .layer(from_fn_with_state(state.clone(), enforce_access_rules))
        .layer(from_fn_with_state(state.clone(), gateway_trust))
        .layer(from_fn(mapper::map_errors));

    let router = if state.config().security_headers {
        security_headers(router)
    } else {
        router
    };

    router.layer(
        ServiceBuilder::new()
            // Request id first so the trace span can record it
            .layer(SetRequestIdLayer::x_request_id(ShortRequestId))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(request_span)),
    )
}

fn request_span(req: &Request) -> Span {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    info_span!(
        "request",
        method = %req.method(),
        path = %req.uri().path(),
        request_id
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewayTrustConfig;
    use crate::error::{AppError, AppResult};
    use crate::error_code::ErrorCode;
    use crate::middleware::CurrentUser;
    use crate::models::ErrorResponse;
    use crate::principal::Principal;
    use axum::{
        body::{to_bytes, Body},
        extract::Path,
        extract::Query,
        http::{header, HeaderMap, HeaderValue, Method, StatusCode},
        middleware::Next,
        routing::{get, post},
        Json,
    };
    use axum_extra::extract::WithRejection;
    use serde::Deserialize;
    use tower::ServiceExt;
    use validator::Validate;

    #[derive(Debug, Deserialize, Validate)]
    struct NewOrder {
        #[validate(length(min = 1, message = "must not be blank"))]
        name: String,
        #[validate(range(min = 1, max = 99))]
        quantity: u32,
    }

    #[derive(Debug, Deserialize)]
    struct Paging {
        page: u32,
    }

    async fn create_order(
        WithRejection(Json(order), _): WithRejection<Json<NewOrder>, AppError>,
    ) -> AppResult<String> {
        order.validate()?;
        Ok(format!("{} x{}", order.name, order.quantity))
    }

    async fn get_item(WithRejection(Path(id), _): WithRejection<Path<u32>, AppError>) -> String {
        id.to_string()
    }

    async fn list_items(
        WithRejection(Query(paging), _): WithRejection<Query<Paging>, AppError>,
    ) -> String {
        paging.page.to_string()
    }

    async fn me(CurrentUser(user): CurrentUser) -> String {
        format!("{}:{}", user.user_id(), user.roles().join(","))
    }

    async fn whoami(CurrentUser(user): CurrentUser) -> String {
        user.username().to_string()
    }

    async fn boom() -> AppResult<String> {
        let cause = "java.lang.IllegalStateException: pool exhausted at Repo.java:42";
        Err(anyhow::anyhow!(cause).into())
    }

    async fn lost_database() -> AppResult<String> {
        Err(AppError::internal(ErrorCode::DatabaseError))
    }

    async fn explode() -> String {
        panic!("index out of bounds: the len is 0")
    }

    fn app(config: GatewayTrustConfig) -> Router {
        let state = SecurityState::new(config).unwrap();
        let routes = Router::new()
            .route("/api/public/health", get(|| async { "ok" }))
            .route("/api/admin/x", get(|| async { "admin" }))
            .route("/api/me", get(me))
            .route("/api/whoami", get(whoami))
            .route("/api/orders", post(create_order))
            .route("/api/items", get(list_items))
            .route("/api/items/{id}", get(get_item))
            .route("/api/boom", get(boom))
            .route("/api/db", get(lost_database))
            .route("/api/panic", get(explode));
        secure(routes, state)
    }

    fn request(method: Method, uri: &str, headers: &[(&str, &str)]) -> Request {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn send(app: Router, req: Request) -> (StatusCode, HeaderMap, Vec<u8>) {
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, body.to_vec())
    }

    fn error_body(bytes: &[u8]) -> ErrorResponse {
        serde_json::from_slice(bytes).unwrap()
    }

    #[tokio::test]
    async fn test_scenario_admin_path_without_admin_role_is_forbidden() {
        let req = request(
            Method::GET,
            "/api/admin/x",
            &[("X-User-Id", "u1"), ("X-User-Roles", "USER")],
        );
        let (status, headers, body) = send(app(GatewayTrustConfig::default()), req).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(
            headers.get(header::CONTENT_TYPE).unwrap(),
            "application/json; charset=utf-8"
        );
        let body = error_body(&body);
        assert_eq!(body.status, 403);
        assert_eq!(body.code, "AUTH010");
        assert!(!body.message.contains("ADMIN"));
    }

    #[tokio::test]
    async fn test_scenario_public_path_without_identity() {
        let req = request(Method::GET, "/api/public/health", &[]);
        let (status, _, body) = send(app(GatewayTrustConfig::default()), req).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"ok");
    }

    #[tokio::test]
    async fn test_scenario_wrong_gateway_token() {
        let config = GatewayTrustConfig {
            gateway_token: Some("s3cret".to_string()),
            ..Default::default()
        };
        let req = request(
            Method::GET,
            "/api/public/health",
            &[("X-Gateway-Token", "wrong"), ("X-User-Id", "u1")],
        );
        let (status, _, body) = send(app(config), req).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let body = error_body(&body);
        assert_eq!(body.code, "AUTH004");
        assert_eq!(body.path, "/api/public/health");
    }

    #[tokio::test]
    async fn test_scenario_unexpected_failure_hides_internals() {
        let req = request(Method::GET, "/api/boom", &[("X-User-Id", "u1")]);
        let (status, _, body) = send(app(GatewayTrustConfig::default()), req).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let text = String::from_utf8(body.clone()).unwrap();
        assert!(!text.contains("IllegalStateException"));
        assert!(!text.contains("Repo.java"));
        assert!(!text.contains("anyhow"));

        let body = error_body(&body);
        assert_eq!(body.code, "SYS000");
        assert_eq!(body.path, "/api/boom");
    }

    #[tokio::test]
    async fn test_internal_code_keeps_its_own_status_and_message() {
        let req = request(Method::GET, "/api/db", &[("X-User-Id", "u1")]);
        let (status, _, body) = send(app(GatewayTrustConfig::default()), req).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let body = error_body(&body);
        assert_eq!(body.code, "SYS001");
        assert_eq!(body.message, ErrorCode::DatabaseError.message());
        assert_eq!(body.service, "GLOBAL");
    }

    #[tokio::test]
    async fn test_utf8_username_is_accepted() {
        let req = Request::builder()
            .uri("/api/whoami")
            .header("X-User-Id", "u1")
            .header("X-Username", HeaderValue::from_bytes("김철수".as_bytes()).unwrap())
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = send(app(GatewayTrustConfig::default()), req).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(String::from_utf8(body).unwrap(), "김철수");
    }

    #[tokio::test]
    async fn test_wrong_token_rejected_before_headers_are_read() {
        let config = GatewayTrustConfig {
            gateway_token: Some("s3cret".to_string()),
            ..Default::default()
        };
        let req = Request::builder()
            .uri("/api/me")
            .header("X-Gateway-Token", "wrong")
            .header("X-User-Id", "u1")
            .header("X-Username", HeaderValue::from_bytes(b"caf\xe9").unwrap())
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = send(app(config), req).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(error_body(&body).code, "AUTH004");
    }

    #[tokio::test]
    async fn test_configured_secret_must_match_exactly() {
        let config = GatewayTrustConfig {
            gateway_token: Some(" s3cret ".to_string()),
            ..Default::default()
        };
        let req = request(
            Method::GET,
            "/api/me",
            &[("X-Gateway-Token", "s3cret"), ("X-User-Id", "u1")],
        );
        let (status, _, body) = send(app(config), req).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(error_body(&body).code, "AUTH004");
    }

    #[tokio::test]
    async fn test_correct_gateway_token_passes() {
        let config = GatewayTrustConfig {
            gateway_token: Some("s3cret".to_string()),
            ..Default::default()
        };
        let req = request(
            Method::GET,
            "/api/me",
            &[
                ("X-Gateway-Token", "s3cret"),
                ("X-User-Id", "u1"),
                ("X-User-Roles", "user, guide"),
            ],
        );
        let (status, _, body) = send(app(config), req).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"u1:user,guide");
    }

    #[tokio::test]
    async fn test_authenticated_path_without_identity() {
        let req = request(Method::GET, "/api/me", &[]);
        let (status, _, body) = send(app(GatewayTrustConfig::default()), req).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(error_body(&body).code, "AUTH004");
    }

    #[tokio::test]
    async fn test_disabled_user_is_unauthenticated() {
        let headers = [("X-User-Id", "u1"), ("X-User-Enabled", "false")];
        let req = request(Method::GET, "/api/me", &headers);
        let (status, _, _) = send(app(GatewayTrustConfig::default()), req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_role_matches_case_insensitively() {
        let headers = [("X-User-Id", "u1"), ("X-User-Roles", "admin")];
        let req = request(Method::GET, "/api/admin/x", &headers);
        let (status, _, body) = send(app(GatewayTrustConfig::default()), req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"admin");
    }

    #[tokio::test]
    async fn test_stale_principal_is_cleared() {
        // An outer layer smuggles a principal in; no identity header is sent
        let smuggle = axum::middleware::from_fn(|mut req: Request, next: Next| async move {
            let intruder = Principal::new("intruder").unwrap().with_roles(["ADMIN"]);
            req.extensions_mut().insert(intruder);
            next.run(req).await
        });
        let app = app(GatewayTrustConfig::default()).layer(smuggle);

        let (status, _, _) = send(app, request(Method::GET, "/api/admin/x", &[])).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_auth_disabled_passes_everything() {
        let config = GatewayTrustConfig {
            enabled: false,
            ..Default::default()
        };
        let (status, _, _) = send(app(config), request(Method::GET, "/api/admin/x", &[])).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_panic_maps_to_internal_error() {
        let req = request(Method::GET, "/api/panic", &[("X-User-Id", "u1")]);
        let (status, _, body) = send(app(GatewayTrustConfig::default()), req).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let text = String::from_utf8(body.clone()).unwrap();
        assert!(!text.contains("index out of bounds"));
        assert_eq!(error_body(&body).code, "SYS000");
    }

    #[tokio::test]
    async fn test_unknown_route_and_wrong_method() {
        let user = [("X-User-Id", "u1")];

        let (status, _, body) = send(
            app(GatewayTrustConfig::default()),
            request(Method::GET, "/api/nowhere", &user),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(error_body(&body).code, "CLT004");

        let (status, _, body) = send(
            app(GatewayTrustConfig::default()),
            request(Method::DELETE, "/api/me", &user),
        )
        .await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        let body = error_body(&body);
        assert_eq!(body.code, "CLT005");
        assert_eq!(body.path, "/api/me");
    }

    #[tokio::test]
    async fn test_validation_failure_summarizes_fields() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/orders")
            .header("X-User-Id", "u1")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"name":"","quantity":500}"#))
            .unwrap();
        let (status, _, body) = send(app(GatewayTrustConfig::default()), req).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body = error_body(&body);
        assert_eq!(body.code, "CLT001");
        assert!(body.message.contains("name: must not be blank"));
        assert!(body.message.contains("quantity: range"));
        assert!(!body.message.contains("500"));
    }

    #[tokio::test]
    async fn test_valid_order() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/orders")
            .header("X-User-Id", "u1")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"name":"tour","quantity":2}"#))
            .unwrap();
        let (status, _, body) = send(app(GatewayTrustConfig::default()), req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"tour x2");
    }

    #[tokio::test]
    async fn test_body_rejections() {
        let malformed = Request::builder()
            .method(Method::POST)
            .uri("/api/orders")
            .header("X-User-Id", "u1")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, _, body) = send(app(GatewayTrustConfig::default()), malformed).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body = error_body(&body);
        assert_eq!(body.code, "CLT001");
        assert_eq!(body.message, "Malformed JSON request body.");

        let plain = Request::builder()
            .method(Method::POST)
            .uri("/api/orders")
            .header("X-User-Id", "u1")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("hello"))
            .unwrap();
        let (status, _, body) = send(app(GatewayTrustConfig::default()), plain).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(error_body(&body).code, "CLT003");
    }

    #[tokio::test]
    async fn test_parameter_rejections() {
        let user = [("X-User-Id", "u1")];

        let (status, _, body) = send(
            app(GatewayTrustConfig::default()),
            request(Method::GET, "/api/items/abc", &user),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body = error_body(&body);
        assert_eq!(body.code, "CLT001");

        let (status, _, body) = send(
            app(GatewayTrustConfig::default()),
            request(Method::GET, "/api/items", &user),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body = error_body(&body);
        assert_eq!(body.code, "CLT002");
        assert!(body.message.ends_with(": page"));
    }

    #[tokio::test]
    async fn test_error_bodies_are_stable_across_requests() {
        let first = send(
            app(GatewayTrustConfig::default()),
            request(Method::GET, "/api/admin/x", &[("X-User-Id", "u1")]),
        )
        .await;
        let second = send(
            app(GatewayTrustConfig::default()),
            request(Method::GET, "/api/admin/x", &[("X-User-Id", "u1")]),
        )
        .await;
        assert_eq!(first.2, second.2);
    }

    #[tokio::test]
    async fn test_ambient_headers() {
        let (_, headers, _) = send(
            app(GatewayTrustConfig::default()),
            request(Method::GET, "/api/public/health", &[]),
        )
        .await;
        assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
        assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
        assert_eq!(headers.get("x-request-id").unwrap().len(), 8);

        let (_, headers, _) = send(
            app(GatewayTrustConfig::default()),
            request(Method::GET, "/api/public/health", &[("x-request-id", "abc12345")]),
        )
        .await;
        assert_eq!(headers.get("x-request-id").unwrap(), "abc12345");

        let config = GatewayTrustConfig {
            security_headers: false,
            ..Default::default()
        };
        let req = request(Method::GET, "/api/public/health", &[]);
        let (_, headers, _) = send(app(config), req).await;
        assert!(headers.get("x-frame-options").is_none());
    }
}
