//! Token issuance and verification
//!
//! Signed HS256 tokens carrying an identity snapshot. The signing secret is
//! injected once at startup through [`TokenConfig`]; it is never rotated at
//! runtime (rotation would invalidate every outstanding token).

use anyhow::Result;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

use common::identity::{Claims, Identity};

/// Token configuration
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Shared secret for signing and verifying tokens
    pub secret: String,
    /// Token lifetime in seconds (default: 24 hours)
    pub ttl_seconds: u64,
    /// Clock-skew tolerance applied during verification (default: 30 seconds)
    pub leeway_seconds: u64,
}

impl TokenConfig {
    /// Create a new TokenConfig from environment variables
    ///
    /// # Environment Variables
    /// - `TOKEN_SECRET`: shared signing secret (required)
    /// - `TOKEN_TTL_SECONDS`: token lifetime in seconds (default: 86400)
    /// - `TOKEN_LEEWAY_SECONDS`: verification clock-skew tolerance (default: 30)
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var("TOKEN_SECRET")
            .map_err(|_| anyhow::anyhow!("TOKEN_SECRET environment variable not set"))?;

        let ttl_seconds = std::env::var("TOKEN_TTL_SECONDS")
            .unwrap_or_else(|_| "86400".to_string()) // 24 hours
            .parse()
            .unwrap_or(86400);

        let leeway_seconds = std::env::var("TOKEN_LEEWAY_SECONDS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);

        Ok(TokenConfig {
            secret,
            ttl_seconds,
            leeway_seconds,
        })
    }
}

/// Why a token was rejected.
///
/// Callers collapse all three kinds into one unauthorized response; the kind
/// is only logged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("malformed token")]
    Malformed,
}

/// Token service
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_seconds: u64,
}

impl TokenService {
    /// Initialize a new token service
    pub fn new(config: &TokenConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = config.leeway_seconds;

        TokenService {
            encoding_key,
            decoding_key,
            validation,
            ttl_seconds: config.ttl_seconds,
        }
    }

    /// Issue a signed token for a resolved identity
    pub fn issue(&self, identity: &Identity) -> Result<String> {
        let now = unix_now()?;
        let claims = Claims::from_identity(identity, now, now + self.ttl_seconds);

        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Verify a token and return its claims
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature
                | jsonwebtoken::errors::ErrorKind::InvalidAlgorithm
                | jsonwebtoken::errors::ErrorKind::ImmatureSignature => {
                    TokenError::InvalidSignature
                }
                _ => TokenError::Malformed,
            })
    }

    /// Get the token lifetime in seconds
    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }
}

fn unix_now() -> Result<u64> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| anyhow::anyhow!("Failed to get current time: {}", e))?
        .as_secs();
    Ok(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn service() -> TokenService {
        TokenService::new(&TokenConfig {
            secret: "test-secret".to_string(),
            ttl_seconds: 3600,
            leeway_seconds: 0,
        })
    }

    fn identity(username: &str) -> Identity {
        Identity {
            id: Uuid::new_v4(),
            username: username.to_string(),
            role: "admin".to_string(),
            permissions: vec!["user.read".to_string(), "user.write".to_string()],
        }
    }

    #[test]
    fn issue_then_verify_round_trips_identity() {
        let service = service();
        let original = identity("admin");

        let token = service.issue(&original).unwrap();
        let claims = service.verify(&token).unwrap();

        assert!(claims.exp > claims.iat);
        assert_eq!(claims.into_identity(), original);
    }

    #[test]
    fn expired_token_is_rejected_despite_valid_signature() {
        let service = service();
        let now = unix_now().unwrap();
        let claims = Claims::from_identity(&identity("admin"), now - 7200, now - 3600);
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert_eq!(service.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn tampered_payload_fails_signature_check() {
        let service = service();
        let genuine = service.issue(&identity("admin")).unwrap();
        let other = service.issue(&identity("intruder")).unwrap();

        // Splice a different payload under the genuine signature
        let genuine: Vec<&str> = genuine.split('.').collect();
        let other: Vec<&str> = other.split('.').collect();
        let forged = format!("{}.{}.{}", genuine[0], other[1], genuine[2]);

        assert_eq!(service.verify(&forged), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn wrong_secret_fails_signature_check() {
        let issuer = TokenService::new(&TokenConfig {
            secret: "another-secret".to_string(),
            ttl_seconds: 3600,
            leeway_seconds: 0,
        });
        let token = issuer.issue(&identity("admin")).unwrap();

        assert_eq!(
            service().verify(&token),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn garbage_is_malformed() {
        assert_eq!(
            service().verify("not-a-token"),
            Err(TokenError::Malformed)
        );
    }

    #[test]
    fn token_without_permission_claim_verifies_to_empty_set() {
        let now = unix_now().unwrap();
        let claims = serde_json::json!({
            "sub": Uuid::new_v4(),
            "username": "legacy",
            "role": "user",
            "iat": now,
            "exp": now + 3600,
        });
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        let verified = service().verify(&token).unwrap();
        assert!(verified.into_identity().permissions.is_empty());
    }

    #[test]
    fn tokens_are_not_revoked_by_logout() {
        // Logout only clears the client-held cookie. A token replayed
        // directly against the server stays valid until its natural expiry.
        let service = service();
        let token = service.issue(&identity("admin")).unwrap();

        assert!(service.verify(&token).is_ok());
        assert!(service.verify(&token).is_ok());
    }

    #[test]
    fn leeway_tolerates_small_clock_skew() {
        let tolerant = TokenService::new(&TokenConfig {
            secret: "test-secret".to_string(),
            ttl_seconds: 3600,
            leeway_seconds: 120,
        });
        let now = unix_now().unwrap();
        let claims = Claims::from_identity(&identity("admin"), now - 3700, now - 60);
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert!(tolerant.verify(&token).is_ok());
        assert_eq!(service().verify(&token), Err(TokenError::Expired));
    }
}
