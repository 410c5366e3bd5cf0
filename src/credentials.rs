//! Bearer credential issuing and verification.
//!
//! Credentials are HS256 JWTs carrying the account id (`sub`), its role and an
//! expiry. Expiry is checked here rather than by `jsonwebtoken` so that a
//! credential is rejected from the exact second `now >= exp`.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Verified identity extracted from a credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub account_id: Uuid,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CredentialError {
    #[error("Token is malformed")]
    Malformed,
    #[error("Token expired")]
    Expired,
    #[error("Invalid token")]
    Invalid,
}

#[derive(Clone)]
pub struct CredentialKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for CredentialKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialKeys")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl CredentialKeys {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a credential valid for the configured window from now.
    pub fn sign(&self, account_id: Uuid, role: Role) -> anyhow::Result<(String, DateTime<Utc>)> {
        self.sign_at(account_id, role, Utc::now())
    }

    pub fn sign_at(
        &self,
        account_id: Uuid,
        role: Role,
        issued_at: DateTime<Utc>,
    ) -> anyhow::Result<(String, DateTime<Utc>)> {
        let expires_at = issued_at
            .checked_add_signed(self.ttl)
            .ok_or_else(|| anyhow::anyhow!("Failed to set expiration"))?;

        let claims = Claims {
            sub: account_id.to_string(),
            role,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| anyhow::anyhow!(e.to_string()))?;
        Ok((token, expires_at))
    }

    pub fn verify(&self, token: &str) -> Result<Claim, CredentialError> {
        self.verify_at(token, Utc::now())
    }

    /// Verifies signature, shape and expiry against `now`. No side effects.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claim, CredentialError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let decoded = decode::<Claims>(token, &self.decoding, &validation).map_err(|err| {
            match err.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    CredentialError::Invalid
                }
                ErrorKind::ExpiredSignature => CredentialError::Expired,
                _ => CredentialError::Malformed,
            }
        })?;
        let claims = decoded.claims;

        let expires_at =
            DateTime::<Utc>::from_timestamp(claims.exp, 0).ok_or(CredentialError::Malformed)?;
        if now >= expires_at {
            return Err(CredentialError::Expired);
        }

        let account_id = Uuid::parse_str(&claims.sub).map_err(|_| CredentialError::Malformed)?;

        Ok(Claim {
            account_id,
            role: claims.role,
            expires_at,
        })
    }
}
