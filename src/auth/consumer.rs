//! OAuth consumer identity registered with the Jira application link.

// self
use crate::{_prelude::*, auth::Secret};

/// Consumer key + secret pair supplied at startup.
///
/// RSA-SHA1 never uses the secret to sign; it only participates in the signing key string
/// built by [`SignatureMethod::signing_base`](crate::oauth1::SignatureMethod::signing_base),
/// so it defaults to empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Consumer {
	key: String,
	secret: Secret,
}
impl Consumer {
	/// Creates a consumer with an empty secret.
	pub fn new(key: impl Into<String>) -> Self {
		Self { key: key.into(), secret: Secret::default() }
	}

	/// Sets or replaces the consumer secret.
	pub fn with_secret(mut self, secret: impl Into<Secret>) -> Self {
		self.secret = secret.into();

		self
	}

	/// Consumer key sent as `oauth_consumer_key`.
	pub fn key(&self) -> &str {
		&self.key
	}

	/// Consumer secret (usually empty for RSA-SHA1).
	pub fn secret(&self) -> &str {
		self.secret.expose()
	}
}
