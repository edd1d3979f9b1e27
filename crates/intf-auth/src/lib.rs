//! INTF request signing shared by every Interfolio API variant.
//! Pure logic, no I/O: callers own the HTTP transport.

mod canonical;
mod error;
mod signer;
mod verify;

pub use canonical::{TIMESTAMP_FORMAT, canonical_string, format_timestamp};
pub use error::AuthError;
pub use signer::{AUTH_SCHEME, SignedHeader, Signer};
pub use verify::{parse_authorization, verify_signature};
