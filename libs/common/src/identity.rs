//! Identity and token claim shapes
//!
//! `Identity` is the resolved (subject, username, role, permissions) tuple
//! attached to authenticated requests and mirrored by the console client.
//! `Claims` is the JWT wire payload. Field names on both are fixed for
//! interoperability: user objects serialize the permission list as
//! `permission`, and claims use the standard `sub`/`iat`/`exp` names.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Resolved identity for an authenticated caller.
///
/// The permission list is a snapshot taken when the token was issued; it does
/// not track later role changes until a new token is issued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub username: String,
    pub role: String,
    #[serde(rename = "permission", default)]
    pub permissions: Vec<String>,
}

/// JWT payload.
///
/// `permission` is optional on the wire: older issuance paths omit it. An
/// absent field decodes to the empty set rather than a distinct code path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject id
    pub sub: Uuid,
    pub username: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission: Option<Vec<String>>,
    /// Issued at (seconds since epoch)
    pub iat: u64,
    /// Expiration time (seconds since epoch)
    pub exp: u64,
}

impl Claims {
    /// Build claims from an identity with the given timestamps.
    pub fn from_identity(identity: &Identity, iat: u64, exp: u64) -> Self {
        Claims {
            sub: identity.id,
            username: identity.username.clone(),
            role: identity.role.clone(),
            permission: Some(identity.permissions.clone()),
            iat,
            exp,
        }
    }

    /// Resolve the claims back into an identity.
    pub fn into_identity(self) -> Identity {
        Identity {
            id: self.sub,
            username: self.username,
            role: self.role,
            permissions: self.permission.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            id: Uuid::new_v4(),
            username: "admin".to_string(),
            role: "admin".to_string(),
            permissions: vec!["user.read".to_string(), "user.write".to_string()],
        }
    }

    #[test]
    fn claims_round_trip_preserves_identity() {
        let original = identity();
        let claims = Claims::from_identity(&original, 100, 200);
        assert_eq!(claims.iat, 100);
        assert_eq!(claims.exp, 200);
        assert_eq!(claims.into_identity(), original);
    }

    #[test]
    fn absent_permission_claim_decodes_to_empty_set() {
        let json = serde_json::json!({
            "sub": Uuid::new_v4(),
            "username": "admin",
            "role": "admin",
            "iat": 1,
            "exp": 2,
        });
        let claims: Claims = serde_json::from_value(json).unwrap();
        assert!(claims.into_identity().permissions.is_empty());
    }

    #[test]
    fn identity_serializes_permission_field_name() {
        let value = serde_json::to_value(identity()).unwrap();
        assert!(value.get("permission").is_some());
        assert!(value.get("permissions").is_none());
    }

    #[test]
    fn identity_deserializes_without_permission_field() {
        let json = serde_json::json!({
            "id": Uuid::new_v4(),
            "username": "viewer",
            "role": "user",
        });
        let parsed: Identity = serde_json::from_value(json).unwrap();
        assert!(parsed.permissions.is_empty());
    }
}
