// ==============================================================================
// handlers.rs - Reference Service Handlers
// ==============================================================================
// Description: Small service surface exercising the security layer
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================

use axum::{extract::Path, Json};
use axum_extra::extract::WithRejection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use gateway_trust::{AppError, AppResult, CurrentUser, ErrorCode};

// ==============================================================================
// RESPONSE TYPES
// ==============================================================================

/// API information response
#[derive(Debug, Serialize)]
pub struct ApiInfoResponse {
    pub service: &'static str,
    pub version: &'static str,
    pub endpoints: Vec<&'static str>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// The caller as seen by the service
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user_id: String,
    pub username: String,
    pub email: Option<String>,
    pub roles: Vec<String>,
    pub authorities: Vec<String>,
    pub admin: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ProfileRequest {
    #[validate(length(min = 1, max = 50, message = "must be between 1 and 50 characters"))]
    pub display_name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(range(min = 13, max = 120))]
    pub age: Option<u8>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user_id: String,
    pub display_name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct ResourceResponse {
    pub owner_id: String,
    pub accessed_by: String,
}

// ==============================================================================
// HANDLERS
// ==============================================================================

/// API root: lists the reference endpoints
pub async fn root() -> Json<ApiInfoResponse> {
    Json(ApiInfoResponse {
        service: "Gateway Trust Reference Service",
        version: "1.0.0",
        endpoints: vec![
            "/health - Health check",
            "/api/public/health - Public health check",
            "/api/me - Current principal (GET)",
            "/api/profile - Update profile (POST)",
            "/api/resources/{owner_id} - Owner or admin access (GET)",
            "/api/admin/error-codes - Error code catalog (GET, admin)",
        ],
    })
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: "1.0.0",
        timestamp: Utc::now(),
    })
}

pub async fn me(CurrentUser(user): CurrentUser) -> Json<MeResponse> {
    Json(MeResponse {
        user_id: user.user_id().to_string(),
        username: user.username().to_string(),
        email: user.email().map(str::to_string),
        roles: user.roles().to_vec(),
        authorities: user.authorities(),
        admin: user.is_admin(),
    })
}

/// Validate and echo a profile update
pub async fn update_profile(
    CurrentUser(user): CurrentUser,
    WithRejection(Json(request), _): WithRejection<Json<ProfileRequest>, AppError>,
) -> AppResult<Json<ProfileResponse>> {
    request.validate()?;

    info!(user_id = user.user_id(), "Profile updated");

    Ok(Json(ProfileResponse {
        user_id: user.user_id().to_string(),
        display_name: request.display_name,
        email: request.email,
    }))
}

/// Resource readable by its owner or an admin
pub async fn get_resource(
    CurrentUser(user): CurrentUser,
    WithRejection(Path(owner_id), _): WithRejection<Path<String>, AppError>,
) -> AppResult<Json<ResourceResponse>> {
    if !user.can_access(&owner_id) {
        return Err(AppError::business(ErrorCode::AccessDenied));
    }

    Ok(Json(ResourceResponse {
        owner_id,
        accessed_by: user.user_id().to_string(),
    }))
}

/// Full error code catalog
pub async fn list_error_codes() -> Json<Vec<ErrorCode>> {
    Json(ErrorCode::ALL.to_vec())
}
