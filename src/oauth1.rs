//! OAuth 1.0a primitives: RFC 5849 encoding, RSA-SHA1 signing, and request assembly.
//!
//! The signer works on already-normalized inputs so it stays a pure function of the
//! request plus the loaded key. [`OAuthRequest`] is the usual entry point: it gathers the
//! protocol parameters, normalizes them with the query string, signs the resulting base
//! string, and renders the `Authorization` header consumed by the transport.

pub mod encode;
pub mod key;
pub mod request;
pub mod signer;

pub use encode::*;
pub use key::*;
pub use request::*;
pub use signer::*;
