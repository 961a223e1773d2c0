//! JWT token handling

use crate::auth::models::Role;
use crate::auth::AuthError;
use crate::error::Result;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// User role
    pub role: Role,
    /// Issued at
    pub iat: i64,
    /// Expiration time
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: i32, role: Role, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        let iat = issued_at.timestamp();
        Self {
            sub: user_id.to_string(),
            role,
            iat,
            exp: iat + ttl.num_seconds(),
        }
    }

    /// Numeric user id carried in `sub`
    pub fn user_id(&self) -> std::result::Result<i32, AuthError> {
        self.sub.parse().map_err(|_| AuthError::Invalid)
    }

    /// Check expiry against a given instant
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() > self.exp
    }

    /// Check if token is expired
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Signs and verifies bearer tokens with a process-wide HS256 key
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against an explicit clock in `verify_at`.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Create a token for a user, valid from now
    pub fn issue(&self, user_id: i32, role: Role) -> Result<String> {
        self.issue_at(user_id, role, Utc::now())
    }

    /// Create a token as if issued at `issued_at`
    pub fn issue_at(&self, user_id: i32, role: Role, issued_at: DateTime<Utc>) -> Result<String> {
        let claims = Claims::new(user_id, role, issued_at, self.ttl);
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Validate and decode a token
    pub fn verify(&self, token: &str) -> std::result::Result<Claims, AuthError> {
        self.verify_at(token, Utc::now())
    }

    /// Validate a token against the clock value `now`
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> std::result::Result<Claims, AuthError> {
        let claims = decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(kind = ?e.kind(), "token rejected");
                AuthError::Invalid
            })?;

        if claims.is_expired_at(now) {
            return Err(AuthError::Expired);
        }
        claims.user_id()?;

        Ok(claims)
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
