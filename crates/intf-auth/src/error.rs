/// Signing and verification error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    InvalidKey,
    MalformedHeader(String),
    PublicKeyMismatch,
    SignatureInvalid,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidKey => write!(f, "private key cannot be used for HMAC-SHA1"),
            Self::MalformedHeader(msg) => write!(f, "malformed authorization header: {msg}"),
            Self::PublicKeyMismatch => {
                write!(f, "authorization header names a different public key")
            }
            Self::SignatureInvalid => write!(f, "invalid request signature"),
        }
    }
}

impl std::error::Error for AuthError {}
