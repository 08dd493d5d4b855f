//! Local token inspection
//!
//! The client never verifies signatures; it only reads the payload of the
//! token the server handed back, to learn the expiry for its own bookkeeping.
//! The server remains the authority on token validity.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use common::identity::Claims;

/// Decode a token payload without verifying the signature or expiry.
pub fn decode_claims_unverified(token: &str) -> Option<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;

    decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        .ok()
        .map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::identity::Identity;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use uuid::Uuid;

    fn token(iat: u64, exp: u64) -> String {
        let identity = Identity {
            id: Uuid::new_v4(),
            username: "admin".to_string(),
            role: "admin".to_string(),
            permissions: vec!["user.read".to_string()],
        };
        encode(
            &Header::default(),
            &Claims::from_identity(&identity, iat, exp),
            &EncodingKey::from_secret(b"server-held-secret"),
        )
        .unwrap()
    }

    #[test]
    fn payload_is_readable_without_the_secret() {
        let claims = decode_claims_unverified(&token(100, 200)).unwrap();
        assert_eq!(claims.username, "admin");
        assert_eq!(claims.exp, 200);
    }

    #[test]
    fn expired_tokens_still_decode_locally() {
        // Expiry judgment is the caller's job; decoding must not fail.
        let claims = decode_claims_unverified(&token(1, 2)).unwrap();
        assert_eq!(claims.exp, 2);
    }

    #[test]
    fn garbage_decodes_to_none() {
        assert!(decode_claims_unverified("not-a-token").is_none());
    }
}
