// ==============================================================================
// state.rs - Shared Security State
// ==============================================================================
// Description: Read-only trust settings shared by every request
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================

use std::sync::Arc;

use crate::config::{ConfigError, GatewayTrustConfig};
use crate::rules::AccessRules;
use crate::security::TokenDigest;

/// Shared security state
///
/// Built once at startup; cloning only bumps a reference count.
#[derive(Clone, Debug)]
pub struct SecurityState {
    inner: Arc<SecurityStateInner>,
}

#[derive(Debug)]
struct SecurityStateInner {
    /// Settings as loaded
    config: GatewayTrustConfig,

    /// Compiled access rules
    rules: AccessRules,

    /// Digest of the shared gateway secret, when one is configured
    gateway_token: Option<TokenDigest>,
}

impl SecurityState {
    /// Compile rules and digest the gateway secret
    pub fn new(config: GatewayTrustConfig) -> Result<Self, ConfigError> {
        let rules = config.access_rules()?;
        Ok(Self::build(config, rules))
    }

    /// Use a custom rule set instead of the configured path lists
    pub fn with_rules(config: GatewayTrustConfig, rules: AccessRules) -> Self {
        Self::build(config, rules)
    }

    fn build(config: GatewayTrustConfig, rules: AccessRules) -> Self {
        // The secret is hashed exactly as configured; `from_lookup` trims env input
        let gateway_token = if config.requires_gateway_token() {
            config.gateway_token.as_deref().map(TokenDigest::of)
        } else {
            None
        };

        Self {
            inner: Arc::new(SecurityStateInner {
                config,
                rules,
                gateway_token,
            }),
        }
    }

    /// Get configuration
    pub fn config(&self) -> &GatewayTrustConfig {
        &self.inner.config
    }

    /// Get access rules
    pub fn rules(&self) -> &AccessRules {
        &self.inner.rules
    }

    /// Get expected gateway token digest
    pub fn gateway_token(&self) -> Option<&TokenDigest> {
        self.inner.gateway_token.as_ref()
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.config.enabled
    }
}
