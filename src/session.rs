//! Explicit per-request session.
//!
//! There is no ambient authentication state: a [`Session`] is built from the
//! request's bearer token and passed to handlers, which run the capability
//! check themselves before touching protected data.

use subtle::ConstantTimeEq;

use crate::error::AppError;

/// Constant-time string comparison to prevent timing attacks.
/// Used for the admin token check.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    authenticated: bool,
}

impl Session {
    /// Session for a request that presented no (or a wrong) credential.
    pub fn anonymous() -> Self {
        Self {
            authenticated: false,
        }
    }

    /// Build a session from a presented bearer token. An empty configured
    /// token never authenticates.
    pub fn from_bearer_token(presented: Option<&str>, admin_token: &str) -> Self {
        let authenticated = match presented {
            Some(token) => !admin_token.is_empty() && constant_time_compare(token, admin_token),
            None => false,
        };
        Self { authenticated }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Capability check run at the top of every protected handler.
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.authenticated {
            Ok(())
        } else {
            Err(AppError::Unauthorized)
        }
    }
}
