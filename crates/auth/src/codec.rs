//! Stateless signing/verification of bearer tokens.
//!
//! Token format: `base64url(header) "." base64url(payload) "." base64url(sig)`
//! where `sig = HMAC-SHA256(secret, header "." payload)`. Tokens are
//! integrity-protected, not encrypted. There is no revocation list; logout is
//! purely client-side discard of the token.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use ring::hmac;
use serde::{Deserialize, Serialize};

use caseworks_core::TenantId;

use crate::{Claims, Role, TokenError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

impl Header {
    fn hs256() -> Self {
        Self {
            alg: "HS256".to_string(),
            typ: "JWT".to_string(),
        }
    }
}

/// Signs and verifies bearer tokens with a server-held shared secret.
///
/// The secret never leaves the process and is never transmitted to clients.
/// Issuance is deterministic given identical claims and timestamp.
pub struct TokenCodec {
    key: hmac::Key,
    ttl: Duration,
}

impl TokenCodec {
    /// Default token lifetime: 24 hours.
    pub fn default_ttl() -> Duration {
        Duration::hours(24)
    }

    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            key: hmac::Key::new(hmac::HMAC_SHA256, secret),
            ttl,
        }
    }

    pub fn with_default_ttl(secret: &[u8]) -> Self {
        Self::new(secret, Self::default_ttl())
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for the given principal claims, valid from now.
    ///
    /// Only fails if the claims cannot be serialized, which for this claims
    /// shape is a programmer error rather than a runtime condition.
    pub fn issue(
        &self,
        subject: &str,
        roles: &[Role],
        tenant_id: &TenantId,
    ) -> Result<String, serde_json::Error> {
        self.issue_at(subject, roles, tenant_id, Utc::now())
    }

    /// Issue a token with an explicit issued-at timestamp (tests, clock seams).
    pub fn issue_at(
        &self,
        subject: &str,
        roles: &[Role],
        tenant_id: &TenantId,
        issued_at: DateTime<Utc>,
    ) -> Result<String, serde_json::Error> {
        let claims = Claims {
            sub: subject.to_string(),
            roles: roles.to_vec(),
            tenant_id: tenant_id.clone(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };

        let header = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&Header::hs256())?);
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?);
        let signing_input = format!("{header}.{payload}");
        let tag = hmac::sign(&self.key, signing_input.as_bytes());

        Ok(format!(
            "{signing_input}.{}",
            URL_SAFE_NO_PAD.encode(tag.as_ref())
        ))
    }

    /// Verify a token against `now` and return its claims.
    ///
    /// Expiry is strict (`now > exp`, zero leeway) and is classified before
    /// the signature check, so an expired token reports [`TokenError::Expired`]
    /// regardless of signature validity.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let segments: Vec<&str> = token.split('.').collect();
        if segments.len() != 3 || segments.iter().any(|s| s.is_empty()) {
            return Err(TokenError::Malformed);
        }

        let header_bytes = URL_SAFE_NO_PAD
            .decode(segments[0])
            .map_err(|_| TokenError::Malformed)?;
        let header: Header =
            serde_json::from_slice(&header_bytes).map_err(|_| TokenError::Malformed)?;
        if header.alg != "HS256" {
            return Err(TokenError::Malformed);
        }

        let payload_bytes = URL_SAFE_NO_PAD
            .decode(segments[1])
            .map_err(|_| TokenError::Malformed)?;
        let claims: Claims =
            serde_json::from_slice(&payload_bytes).map_err(|_| TokenError::Malformed)?;

        if now.timestamp() > claims.exp {
            return Err(TokenError::Expired);
        }

        let signature = URL_SAFE_NO_PAD
            .decode(segments[2])
            .map_err(|_| TokenError::Malformed)?;
        let signing_input = format!("{}.{}", segments[0], segments[1]);

        // ring's verify is constant-time over the tag bytes.
        hmac::verify(&self.key, signing_input.as_bytes(), &signature)
            .map_err(|_| TokenError::InvalidSignature)?;

        Ok(claims)
    }
}
