// ==============================================================================
// rules.rs - Authorization Rule Evaluator
// ==============================================================================
// Description: Ordered path rules evaluated against the request principal
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================

use crate::path_pattern::PathPattern;
use crate::principal::Principal;

/// What a matched path demands from the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    Public,
    Role(String),
    Authenticated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRule {
    pub pattern: PathPattern,
    pub requirement: Requirement,
}

/// Outcome of evaluating a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// No usable principal: answered by the unauthenticated entry point
    Unauthenticated,
    /// Principal present but not permitted: answered with 403
    Forbidden,
}

/// First-match-wins rule list; unmatched paths require authentication
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessRules {
    rules: Vec<AccessRule>,
}

impl AccessRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn permit(mut self, pattern: PathPattern) -> Self {
        self.rules.push(AccessRule {
            pattern,
            requirement: Requirement::Public,
        });
        self
    }

    pub fn require_role(mut self, pattern: PathPattern, role: &str) -> Self {
        self.rules.push(AccessRule {
            pattern,
            requirement: Requirement::Role(role.to_string()),
        });
        self
    }

    pub fn authenticated(mut self, pattern: PathPattern) -> Self {
        self.rules.push(AccessRule {
            pattern,
            requirement: Requirement::Authenticated,
        });
        self
    }

    pub fn rules(&self) -> &[AccessRule] {
        &self.rules
    }

    /// Requirement of the first rule matching `path`; `None` when no rule matches
    pub fn requirement_for(&self, path: &str) -> Option<&Requirement> {
        self.rules
            .iter()
            .find(|rule| rule.pattern.matches(path))
            .map(|rule| &rule.requirement)
    }

    pub fn evaluate(&self, path: &str, principal: Option<&Principal>) -> Decision {
        match (self.requirement_for(path), principal) {
            (Some(Requirement::Public), _) => Decision::Allow,
            (Some(Requirement::Role(_)), None) => Decision::Unauthenticated,
            (Some(Requirement::Role(role)), Some(principal)) => {
                if principal.is_enabled() && principal.has_role(role) {
                    Decision::Allow
                } else {
                    Decision::Forbidden
                }
            }
            (Some(Requirement::Authenticated) | None, Some(principal))
                if principal.is_enabled() =>
            {
                Decision::Allow
            }
            (Some(Requirement::Authenticated) | None, _) => Decision::Unauthenticated,
        }
    }
}
