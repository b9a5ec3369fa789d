//! Bearer-token issuance and verification.
//!
//! Tokens are HS256-signed JWTs carrying the account email as their only
//! identity claim, valid for a configurable lifetime (one hour by default).

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::FountainError;

/// Claims embedded in every admin token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject -- the account email.
    pub sub: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
}

/// Signs and verifies admin tokens. Constructed once from [`Config`] and
/// shared through the router state.
#[derive(Clone)]
pub struct TokenService {
    secret: String,
    ttl_secs: i64,
}

impl TokenService {
    pub fn new(secret: impl Into<String>, ttl_secs: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl_secs,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.secret_key.clone(), cfg.token_ttl_secs)
    }

    /// Issue a token for the given account email.
    pub fn issue(&self, email: &str) -> Result<String, FountainError> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: email.to_string(),
            exp: now + self.ttl_secs,
            iat: now,
        };
        encode(
            &Header::default(), // HS256
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| FountainError::Internal(format!("token signing failed: {e}")))
    }

    /// Verify signature and expiry, returning the embedded claims.
    /// Any failure is reported as `Forbidden`; the caller decides between
    /// 401 (no token at all) and 403 (bad token).
    pub fn verify(&self, token: &str) -> Result<Claims, FountainError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(), // HS256, validates exp
        )
        .map_err(|_| FountainError::Forbidden)?;
        Ok(data.claims)
    }
}
