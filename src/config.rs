// ==============================================================================
// config.rs - Gateway Trust Configuration
// ==============================================================================
// Description: Process-wide settings read once at startup
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
//
// Environment variables:
//   GATEWAY_TRUST_ENABLED           true|false (default true)
//   GATEWAY_TRUST_TOKEN             shared secret expected in X-Gateway-Token
//   GATEWAY_TRUST_PUBLIC_PATHS      comma-separated patterns
//   GATEWAY_TRUST_ADMIN_PATHS       comma-separated patterns
//   GATEWAY_TRUST_SECURITY_HEADERS  true|false (default true)
//
// ==============================================================================

use std::fmt;
use thiserror::Error;

use crate::path_pattern::{PathPattern, PatternError};
use crate::principal::ADMIN_ROLE;
use crate::rules::AccessRules;

pub const ENV_ENABLED: &str = "GATEWAY_TRUST_ENABLED";
pub const ENV_TOKEN: &str = "GATEWAY_TRUST_TOKEN";
pub const ENV_PUBLIC_PATHS: &str = "GATEWAY_TRUST_PUBLIC_PATHS";
pub const ENV_ADMIN_PATHS: &str = "GATEWAY_TRUST_ADMIN_PATHS";
pub const ENV_SECURITY_HEADERS: &str = "GATEWAY_TRUST_SECURITY_HEADERS";

const DEFAULT_PUBLIC_PATHS: [&str; 5] = [
    "/actuator/**",
    "/health",
    "/api/public/**",
    "/swagger-ui/**",
    "/v3/api-docs/**",
];

const DEFAULT_ADMIN_PATHS: [&str; 2] = ["/api/admin/**", "/actuator/**"];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be 'true' or 'false', got '{value}'")]
    InvalidBool { key: &'static str, value: String },

    #[error("Invalid pattern in {key}: {source}")]
    InvalidPattern {
        key: &'static str,
        #[source]
        source: PatternError,
    },
}

#[derive(Clone, PartialEq, Eq)]
pub struct GatewayTrustConfig {
    /// When false, no trust filter or access rules run
    pub enabled: bool,

    /// Shared secret the gateway sends; `None` or blank disables the check
    pub gateway_token: Option<String>,

    /// Patterns open to everyone, checked first
    pub public_paths: Vec<String>,

    /// Patterns requiring the ADMIN role
    pub admin_paths: Vec<String>,

    /// Emit hardening response headers
    pub security_headers: bool,
}

impl Default for GatewayTrustConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            gateway_token: None,
            public_paths: DEFAULT_PUBLIC_PATHS.iter().map(|p| p.to_string()).collect(),
            admin_paths: DEFAULT_ADMIN_PATHS.iter().map(|p| p.to_string()).collect(),
            security_headers: true,
        }
    }
}

// Keeps the shared secret out of logs
impl fmt::Debug for GatewayTrustConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayTrustConfig")
            .field("enabled", &self.enabled)
            .field("gateway_token", &self.gateway_token.as_ref().map(|_| "<redacted>"))
            .field("public_paths", &self.public_paths)
            .field("admin_paths", &self.admin_paths)
            .field("security_headers", &self.security_headers)
            .finish()
    }
}

impl GatewayTrustConfig {
    /// Load from process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key lookup; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_ENABLED) {
            config.enabled = parse_bool(ENV_ENABLED, &value)?;
        }

        config.gateway_token = lookup(ENV_TOKEN)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        if let Some(value) = lookup(ENV_PUBLIC_PATHS) {
            config.public_paths = split_patterns(&value);
        }
        if let Some(value) = lookup(ENV_ADMIN_PATHS) {
            config.admin_paths = split_patterns(&value);
        }

        if let Some(value) = lookup(ENV_SECURITY_HEADERS) {
            config.security_headers = parse_bool(ENV_SECURITY_HEADERS, &value)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check every pattern compiles
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.access_rules().map(|_| ())
    }

    /// Public patterns first, then admin patterns requiring `ADMIN`
    pub fn access_rules(&self) -> Result<AccessRules, ConfigError> {
        let mut rules = AccessRules::new();
        for path in &self.public_paths {
            rules = rules.permit(compile(ENV_PUBLIC_PATHS, path)?);
        }
        for path in &self.admin_paths {
            rules = rules.require_role(compile(ENV_ADMIN_PATHS, path)?, ADMIN_ROLE);
        }
        Ok(rules)
    }

    /// True when a non-blank shared secret is configured
    pub fn requires_gateway_token(&self) -> bool {
        self.gateway_token
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty())
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            key,
            value: value.to_string(),
        }),
    }
}

fn compile(key: &'static str, path: &str) -> Result<PathPattern, ConfigError> {
    PathPattern::parse(path).map_err(|source| ConfigError::InvalidPattern { key, source })
}

fn split_patterns(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
