use std::time::{SystemTime, UNIX_EPOCH};

use crate::models::Claims;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize
}

/// Issues a signed token embedding the verified identity. The TTL comes from
/// configuration (24 hours by default) and the expiry is fixed at issuance.
pub fn issue_token(employee_id: u64, email: &str, role_id: u8, secret: &str, ttl: usize) -> String {
    let claims = Claims {
        sub: employee_id,
        email: email.to_string(),
        role: role_id,
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

/// Validates a token string. Every failure cause — malformed, bad signature,
/// expired, wrong algorithm — collapses into `None`; callers never learn
/// which check failed.
pub fn verify_token(token: &str, secret: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-signing-key";

    #[test]
    fn issued_token_verifies_to_the_same_identity() {
        let token = issue_token(7, "jane@company.com", 2, SECRET, 86400);
        let claims = verify_token(&token, SECRET).unwrap();

        assert_eq!(claims.sub, 7);
        assert_eq!(claims.email, "jane@company.com");
        assert_eq!(claims.role, 2);
        assert!(claims.exp > now());
    }

    #[test]
    fn expired_token_is_invalid() {
        // Well past the default 60s validation leeway.
        let claims = Claims {
            sub: 7,
            email: "jane@company.com".to_string(),
            role: 2,
            exp: now() - 3600,
            jti: "test".to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(verify_token(&token, SECRET).is_none());
    }

    #[test]
    fn tampered_token_is_invalid() {
        let token = issue_token(7, "jane@company.com", 2, SECRET, 86400);
        let mut tampered = token.clone();
        tampered.pop();
        tampered.push('x');

        assert!(verify_token(&tampered, SECRET).is_none());
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let token = issue_token(7, "jane@company.com", 2, SECRET, 86400);
        assert!(verify_token(&token, "another-key").is_none());
    }

    #[test]
    fn garbage_is_invalid() {
        assert!(verify_token("", SECRET).is_none());
        assert!(verify_token("not.a.jwt", SECRET).is_none());
    }
}
