//! Signature verification for INTF-signed requests.

use base64::{Engine, engine::general_purpose::STANDARD as B64};
use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::{AUTH_SCHEME, AuthError, canonical_string};

/// Split `INTF {public_key}:{signature}` into its two parts.
pub fn parse_authorization(header: &str) -> Result<(&str, &str), AuthError> {
    let rest = header
        .strip_prefix(AUTH_SCHEME)
        .and_then(|r| r.strip_prefix(' '))
        .ok_or_else(|| AuthError::MalformedHeader(format!("expected '{AUTH_SCHEME} ' prefix")))?;
    let (public_key, signature) = rest
        .rsplit_once(':')
        .ok_or_else(|| AuthError::MalformedHeader("missing ':' separator".into()))?;
    if public_key.is_empty() || signature.is_empty() {
        return Err(AuthError::MalformedHeader("empty public key or signature".into()));
    }
    Ok((public_key, signature))
}

/// Recompute the MAC for the request and compare in constant time.
pub fn verify_signature(
    private_key: &[u8],
    expected_public_key: &str,
    verb: &str,
    timestamp: &str,
    path_and_query: &str,
    authorization: &str,
) -> Result<(), AuthError> {
    let (public_key, signature) = parse_authorization(authorization)?;
    if public_key != expected_public_key {
        return Err(AuthError::PublicKeyMismatch);
    }
    let signature = B64
        .decode(signature)
        .map_err(|e| AuthError::MalformedHeader(format!("signature is not base64: {e}")))?;

    let mut mac = Hmac::<Sha1>::new_from_slice(private_key).map_err(|_| AuthError::InvalidKey)?;
    mac.update(canonical_string(verb, timestamp, path_and_query).as_bytes());
    mac.verify_slice(&signature).map_err(|_| AuthError::SignatureInvalid)
}
