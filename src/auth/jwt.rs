//! JWT Token Codec
//! Mission: Issue and verify short-lived tenant-scoped tokens

use crate::auth::models::TokenClaims;
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Fixed token lifetime in seconds.
pub const TOKEN_TTL_SECS: i64 = 300;

/// Why a token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("token signature mismatch")]
    InvalidSignature,
    #[error("malformed token")]
    Malformed,
}

/// Signs and verifies HS256 tokens with a shared secret.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::seconds(TOKEN_TTL_SECS),
        }
    }

    /// Issue a token for `username` under tenant `customer`, valid from now.
    pub fn issue(&self, username: &str, customer: &str) -> Result<String> {
        self.issue_at(username, customer, Utc::now())
    }

    /// Issue a token as if it had been minted at `issued_at`.
    pub fn issue_at(
        &self,
        username: &str,
        customer: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String> {
        let expires_at = issued_at
            .checked_add_signed(self.ttl)
            .context("Invalid timestamp")?;

        let claims = TokenClaims {
            username: username.to_string(),
            customer: customer.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        debug!(
            username,
            customer,
            exp = claims.exp,
            "Issuing token"
        );

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .context("Failed to sign token")
    }

    /// Verify a token's signature and, unless `ignore_expiration`, its expiry.
    ///
    /// The signature is always checked first, so a tampered token reports
    /// `InvalidSignature` even when it is also past its expiry.
    pub fn verify(&self, token: &str, ignore_expiration: bool) -> Result<TokenClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = !ignore_expiration;

        decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-12345";

    #[test]
    fn test_issue_and_verify() {
        let codec = TokenCodec::new(SECRET);
        let token = codec.issue("alice", "tenantA").unwrap();
        assert!(!token.is_empty());

        let claims = codec.verify(&token, false).unwrap();
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.customer, "tenantA");
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_SECS);
    }

    #[test]
    fn test_expired_token() {
        let codec = TokenCodec::new(SECRET);
        let issued_at = Utc::now() - Duration::seconds(TOKEN_TTL_SECS + 10);
        let token = codec.issue_at("alice", "tenantA", issued_at).unwrap();

        assert_eq!(codec.verify(&token, false), Err(TokenError::Expired));

        // Identity is still recoverable for cleanup
        let claims = codec.verify(&token, true).unwrap();
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.customer, "tenantA");
    }

    #[test]
    fn test_different_secrets_reject() {
        let issuer = TokenCodec::new("secret1");
        let verifier = TokenCodec::new("secret2");

        let token = issuer.issue("alice", "tenantA").unwrap();
        assert_eq!(
            verifier.verify(&token, false),
            Err(TokenError::InvalidSignature)
        );
        assert_eq!(
            verifier.verify(&token, true),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_signature_checked_before_expiry() {
        let issuer = TokenCodec::new("secret1");
        let verifier = TokenCodec::new("secret2");
        let issued_at = Utc::now() - Duration::hours(1);

        let token = issuer.issue_at("alice", "tenantA", issued_at).unwrap();
        assert_eq!(
            verifier.verify(&token, false),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_malformed_token() {
        let codec = TokenCodec::new(SECRET);
        assert_eq!(codec.verify("not-a-token", false), Err(TokenError::Malformed));
        assert_eq!(codec.verify("", true), Err(TokenError::Malformed));
    }

    #[test]
    fn test_tokens_are_unique() {
        let codec = TokenCodec::new(SECRET);
        let now = Utc::now();
        let a = codec.issue_at("alice", "tenantA", now).unwrap();
        let b = codec.issue_at("alice", "tenantA", now).unwrap();
        assert_ne!(a, b);
    }
}
