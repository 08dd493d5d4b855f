//! Access-policy evaluation
//!
//! One pure evaluator shared by the server-side request guard and the
//! client-side route guard. Role requirements match if the caller holds any
//! of the listed roles; permission requirements default to any-of and can be
//! tightened to all-of per requirement.

use serde::{Deserialize, Serialize};

use crate::identity::Identity;

/// Set-membership policy for permission requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PermissionPolicy {
    /// At least one required permission must be granted.
    #[default]
    AnyOf,
    /// Every required permission must be granted.
    AllOf,
}

/// Role/permission requirements declared by an endpoint or route.
///
/// Empty requirement lists always pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessRequirement {
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub policy: PermissionPolicy,
}

/// Outcome of evaluating a requirement against an identity.
#[derive(Debug, Clone, PartialEq)]
pub enum AccessDecision {
    Granted,
    /// The requirements the identity does not satisfy, for display on the
    /// unauthorized view and in the 403 envelope.
    Denied { missing: Vec<String> },
}

impl AccessRequirement {
    pub fn any_of<S: Into<String>, I: IntoIterator<Item = S>>(permissions: I) -> Self {
        AccessRequirement {
            permissions: permissions.into_iter().map(Into::into).collect(),
            policy: PermissionPolicy::AnyOf,
            ..Default::default()
        }
    }

    pub fn all_of<S: Into<String>, I: IntoIterator<Item = S>>(permissions: I) -> Self {
        AccessRequirement {
            permissions: permissions.into_iter().map(Into::into).collect(),
            policy: PermissionPolicy::AllOf,
            ..Default::default()
        }
    }

    pub fn role<S: Into<String>>(role: S) -> Self {
        AccessRequirement {
            roles: vec![role.into()],
            ..Default::default()
        }
    }

    pub fn with_roles<S: Into<String>, I: IntoIterator<Item = S>>(mut self, roles: I) -> Self {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty() && self.permissions.is_empty()
    }

    /// Evaluate this requirement against the granted identity.
    pub fn evaluate(&self, identity: &Identity) -> AccessDecision {
        let mut missing = Vec::new();

        if !self.roles.is_empty() && !self.roles.iter().any(|r| *r == identity.role) {
            missing.push(format!("role:{}", self.roles.join("|")));
        }

        match self.policy {
            PermissionPolicy::AnyOf => {
                if !self.permissions.is_empty()
                    && !self
                        .permissions
                        .iter()
                        .any(|p| identity.permissions.contains(p))
                {
                    missing.extend(self.permissions.iter().cloned());
                }
            }
            PermissionPolicy::AllOf => {
                missing.extend(
                    self.permissions
                        .iter()
                        .filter(|p| !identity.permissions.contains(p))
                        .cloned(),
                );
            }
        }

        if missing.is_empty() {
            AccessDecision::Granted
        } else {
            AccessDecision::Denied { missing }
        }
    }

    /// Convenience predicate over [`AccessRequirement::evaluate`].
    pub fn allows(&self, identity: &Identity) -> bool {
        matches!(self.evaluate(identity), AccessDecision::Granted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn granted(permissions: &[&str]) -> Identity {
        Identity {
            id: Uuid::new_v4(),
            username: "tester".to_string(),
            role: "admin".to_string(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn empty_requirement_always_passes() {
        let requirement = AccessRequirement::default();
        assert!(requirement.allows(&granted(&[])));
    }

    #[test]
    fn any_of_passes_with_one_overlap() {
        // granted {a, b} vs required any-of {b, c}
        let requirement = AccessRequirement::any_of(["b", "c"]);
        assert!(requirement.allows(&granted(&["a", "b"])));
    }

    #[test]
    fn all_of_fails_when_one_is_missing() {
        // granted {a, b} vs required all-of {a, c}
        let requirement = AccessRequirement::all_of(["a", "c"]);
        match requirement.evaluate(&granted(&["a", "b"])) {
            AccessDecision::Denied { missing } => assert_eq!(missing, vec!["c".to_string()]),
            AccessDecision::Granted => panic!("all-of must fail when c is missing"),
        }
    }

    #[test]
    fn all_of_passes_when_every_permission_is_granted() {
        let requirement = AccessRequirement::all_of(["a", "b"]);
        assert!(requirement.allows(&granted(&["a", "b", "c"])));
    }

    #[test]
    fn any_of_reports_full_required_set_when_none_overlap() {
        let requirement = AccessRequirement::any_of(["x", "y"]);
        match requirement.evaluate(&granted(&["a"])) {
            AccessDecision::Denied { missing } => {
                assert_eq!(missing, vec!["x".to_string(), "y".to_string()]);
            }
            AccessDecision::Granted => panic!("no overlap must deny"),
        }
    }

    #[test]
    fn role_requirement_matches_exactly_one_of() {
        let requirement = AccessRequirement::role("admin");
        assert!(requirement.allows(&granted(&[])));

        let requirement = AccessRequirement::role("supervisor");
        assert!(!requirement.allows(&granted(&[])));
    }

    #[test]
    fn role_and_permissions_combine() {
        let requirement = AccessRequirement::any_of(["user.read"]).with_roles(["supervisor"]);
        let decision = requirement.evaluate(&granted(&["user.read"]));
        match decision {
            AccessDecision::Denied { missing } => {
                assert_eq!(missing, vec!["role:supervisor".to_string()]);
            }
            AccessDecision::Granted => panic!("role mismatch must deny"),
        }
    }
}
