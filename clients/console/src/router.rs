//! Navigation guard
//!
//! Intercepts a navigation before the destination renders. Unauthenticated
//! callers are sent to the login view carrying the originally requested path;
//! authenticated callers lacking the declared role/permissions are sent to
//! the unauthorized view with the missing requirements for display.

use common::policy::{AccessDecision, AccessRequirement};

use crate::cache::IdentityCache;
use crate::store::AuthStore;
use crate::transport::AuthTransport;

/// Access declaration attached to a route.
#[derive(Debug, Clone, Default)]
pub struct RouteSpec {
    pub requires_auth: bool,
    pub requirement: AccessRequirement,
}

impl RouteSpec {
    /// Route open to anyone, e.g. the login view itself.
    pub fn public() -> Self {
        RouteSpec::default()
    }

    /// Route requiring a session but no particular role or permission.
    pub fn authenticated() -> Self {
        RouteSpec {
            requires_auth: true,
            requirement: AccessRequirement::default(),
        }
    }

    /// Route requiring a session plus the given role/permission requirement.
    pub fn restricted(requirement: AccessRequirement) -> Self {
        RouteSpec {
            requires_auth: true,
            requirement,
        }
    }
}

/// Outcome of guarding a navigation.
#[derive(Debug, Clone, PartialEq)]
pub enum Navigation {
    Proceed,
    /// Go to the login view; `next` is the destination to return to after a
    /// successful login.
    RedirectToLogin { next: String },
    /// Go to the unauthorized view, showing what was missing.
    Denied { missing: Vec<String> },
}

/// Guard a navigation to `route`, initializing the store from its persisted
/// snapshot if this is the first navigation.
pub fn guard_navigation<T: AuthTransport, C: IdentityCache>(
    store: &mut AuthStore<T, C>,
    route: &RouteSpec,
    requested_path: &str,
) -> Navigation {
    if !route.requires_auth {
        return Navigation::Proceed;
    }

    store.initialize();

    let Some(identity) = store.identity() else {
        return Navigation::RedirectToLogin {
            next: requested_path.to_string(),
        };
    };

    match route.requirement.evaluate(identity) {
        AccessDecision::Granted => Navigation::Proceed,
        AccessDecision::Denied { missing } => Navigation::Denied { missing },
    }
}
