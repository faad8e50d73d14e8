// ==============================================================================
// principal.rs - Authenticated Principal
// ==============================================================================
// Description: Per-request identity materialized from gateway headers
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================

use serde::Serialize;

use crate::error_code::ErrorCode;
use crate::failure::Failure;

/// Role assigned when the gateway sends none
pub const DEFAULT_ROLE: &str = "USER";

/// Role required on admin paths
pub const ADMIN_ROLE: &str = "ADMIN";

/// Authenticated user for the duration of one request
///
/// Immutable once built. Role comparisons ignore ASCII case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    user_id: String,
    username: String,
    email: Option<String>,
    roles: Vec<String>,
    enabled: bool,
}

impl Principal {
    /// Build a principal with default username, roles and enabled flag
    ///
    /// Fails with `AUTH_USER_NOT_FOUND` when `user_id` is blank.
    pub fn new(user_id: impl Into<String>) -> Result<Self, Failure> {
        let user_id = user_id.into();
        if user_id.trim().is_empty() {
            return Err(Failure::business(ErrorCode::AuthUserNotFound));
        }

        Ok(Self {
            username: user_id.clone(),
            user_id,
            email: None,
            roles: vec![DEFAULT_ROLE.to_string()],
            enabled: true,
        })
    }

    /// Blank usernames keep the user id
    pub fn with_username(mut self, username: Option<&str>) -> Self {
        if let Some(name) = username.filter(|n| !n.trim().is_empty()) {
            self.username = name.to_string();
        }
        self
    }

    pub fn with_email(mut self, email: Option<&str>) -> Self {
        self.email = email.filter(|e| !e.trim().is_empty()).map(str::to_string);
        self
    }

    /// Replace the role set; an empty set falls back to `USER`
    ///
    /// Roles are trimmed, blanks dropped and duplicates (ignoring case)
    /// removed while keeping the first spelling.
    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed: Vec<String> = Vec::new();
        for role in roles {
            let role = role.as_ref().trim();
            if role.is_empty() || parsed.iter().any(|r| r.eq_ignore_ascii_case(role)) {
                continue;
            }
            parsed.push(role.to_string());
        }

        if parsed.is_empty() {
            parsed.push(DEFAULT_ROLE.to_string());
        }
        self.roles = parsed;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn has_role(&self, role: &str) -> bool {
        let role = role.trim();
        self.roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }

    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        roles.iter().any(|role| self.has_role(role))
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ADMIN_ROLE)
    }

    /// Granted authorities in `ROLE_<NAME>` form
    pub fn authorities(&self) -> Vec<String> {
        self.roles
            .iter()
            .map(|role| format!("ROLE_{}", role.to_ascii_uppercase()))
            .collect()
    }

    /// True when this principal owns the resource
    pub fn is_owner(&self, resource_owner_id: &str) -> bool {
        self.user_id == resource_owner_id
    }

    /// Owners and admins may access a resource
    pub fn can_access(&self, resource_owner_id: &str) -> bool {
        self.is_admin() || self.is_owner(resource_owner_id)
    }
}
