use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

use crate::utils::error::{Error, Result};

/// Stateless bearer-token codec over a process-wide HS256 secret.
/// No revocation list: rotating the secret invalidates everything outstanding.
#[derive(Clone)]
pub struct TokenService {
    enc_key: EncodingKey,
    dec_key: DecodingKey,
    ttl: Duration,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String, // user id
    pub iat: i64,    // issued at (unix)
    pub exp: i64,    // expires at (unix)
}

impl TokenService {
    pub fn new(secret: &str, ttl_seconds: i64) -> Self {
        Self {
            enc_key: EncodingKey::from_secret(secret.as_bytes()),
            dec_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::seconds(ttl_seconds),
        }
    }

    pub fn issue(&self, user_id: i64) -> Result<String> {
        self.issue_with_ttl(user_id, self.ttl)
    }

    pub(crate) fn issue_with_ttl(&self, user_id: i64, ttl: Duration) -> Result<String> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.enc_key)
            .map_err(|e| Error::Unexpected(format!("encode token: {e}")))
    }

    /// Fails closed: anything that is not a well-signed, unexpired token
    /// is rejected.
    pub fn verify(&self, token: &str) -> Result<i64> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let data = decode::<TokenClaims>(token, &self.dec_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => Error::TokenExpired,
                _ => Error::Unauthorized,
            }
        })?;
        data.claims.sub.parse::<i64>().map_err(|_| Error::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_then_verify_roundtrips_user_id() {
        let svc = TokenService::new("test-secret", 3600);
        let token = svc.issue(42).unwrap();
        assert_eq!(svc.verify(&token).unwrap(), 42);
    }

    #[test]
    fn expired_token_is_rejected_as_expired() {
        let svc = TokenService::new("test-secret", 3600);
        let token = svc.issue_with_ttl(42, Duration::seconds(-120)).unwrap();
        assert!(matches!(svc.verify(&token), Err(Error::TokenExpired)));
    }

    #[test]
    fn malformed_token_is_rejected() {
        let svc = TokenService::new("test-secret", 3600);
        assert!(matches!(svc.verify("not-a-jwt"), Err(Error::Unauthorized)));
        assert!(matches!(svc.verify(""), Err(Error::Unauthorized)));
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let issuer = TokenService::new("secret-a", 3600);
        let verifier = TokenService::new("secret-b", 3600);
        let token = issuer.issue(7).unwrap();
        assert!(matches!(verifier.verify(&token), Err(Error::Unauthorized)));
    }
}
