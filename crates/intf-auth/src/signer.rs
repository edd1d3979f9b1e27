//! HMAC-SHA1 signer producing the `Authorization` / `TimeStamp` header pair.

use base64::{Engine, engine::general_purpose::STANDARD as B64};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::{AuthError, canonical_string, format_timestamp};

type HmacSha1 = Hmac<Sha1>;

/// Scheme prefix of the `Authorization` header value.
pub const AUTH_SCHEME: &str = "INTF";

/// Header values for one signed request. Recomputed per request, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeader {
    /// `INTF {public_key}:{base64 signature}`.
    pub authorization: String,
    /// Same string that was signed; sent as the `TimeStamp` header.
    pub timestamp: String,
}

/// Key pair used to sign requests. Immutable for the process lifetime.
#[derive(Clone)]
pub struct Signer {
    public_key: String,
    private_key: Vec<u8>,
}

impl Signer {
    pub fn new(public_key: impl Into<String>, private_key: impl Into<Vec<u8>>) -> Self {
        Self {
            public_key: public_key.into(),
            private_key: private_key.into(),
        }
    }

    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// Sign with the current UTC time.
    pub fn sign_now(&self, verb: &str, path_and_query: &str) -> Result<SignedHeader, AuthError> {
        self.sign_at(verb, path_and_query, Utc::now())
    }

    /// Sign for a fixed instant. Deterministic for fixed inputs.
    pub fn sign_at(
        &self,
        verb: &str,
        path_and_query: &str,
        at: DateTime<Utc>,
    ) -> Result<SignedHeader, AuthError> {
        let timestamp = format_timestamp(at);
        let signature = self.signature(verb, &timestamp, path_and_query)?;
        Ok(SignedHeader {
            authorization: format!("{AUTH_SCHEME} {}:{signature}", self.public_key),
            timestamp,
        })
    }

    /// Base64 HMAC-SHA1 of the canonical string.
    pub fn signature(
        &self,
        verb: &str,
        timestamp: &str,
        path_and_query: &str,
    ) -> Result<String, AuthError> {
        let mut mac =
            HmacSha1::new_from_slice(&self.private_key).map_err(|_| AuthError::InvalidKey)?;
        mac.update(canonical_string(verb, timestamp, path_and_query).as_bytes());
        Ok(B64.encode(mac.finalize().into_bytes()))
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signer({}, <redacted>)", self.public_key)
    }
}
