// ==============================================================================
// security.rs - Gateway Token Verification
// ==============================================================================
// Description: SHA-256 digesting and constant-time comparison of the shared
//              gateway secret
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================

use sha2::{Digest, Sha256};

// ==============================================================================
// TOKEN DIGEST
// ==============================================================================

/// SHA-256 digest of a gateway token
///
/// Both sides are hashed before comparison so the check takes the same time
/// regardless of where, or whether, the presented token diverges.
#[derive(Clone)]
pub struct TokenDigest([u8; 32]);

impl TokenDigest {
    pub fn of(token: &str) -> Self {
        let digest = Sha256::digest(token.as_bytes());
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    /// Constant-time comparison (no early exit)
    pub fn constant_time_eq(&self, other: &Self) -> bool {
        let mut diff: u8 = 0;
        for (a, b) in self.0.iter().zip(other.0.iter()) {
            diff |= a ^ b;
        }
        diff == 0
    }
}

impl std::fmt::Debug for TokenDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TokenDigest(<redacted>)")
    }
}

// ==============================================================================
// VERIFICATION
// ==============================================================================

/// Check a presented header value against the expected digest
///
/// A missing header never verifies.
pub fn verify_gateway_token(expected: &TokenDigest, presented: Option<&str>) -> bool {
    match presented {
        Some(token) => expected.constant_time_eq(&TokenDigest::of(token)),
        None => false,
    }
}

// ==============================================================================
// TESTS
// ==============================================================================
