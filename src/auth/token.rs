//! Token pairs exchanged during the handshake.

// self
use crate::{_prelude::*, auth::Secret};

/// Temporary credentials returned by the request-token step and consumed by the
/// access-token step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestToken {
	/// Value of `oauth_token`.
	pub token: String,
	/// Value of `oauth_token_secret`.
	pub secret: Secret,
}
impl RequestToken {
	/// Creates a request token from its wire fields.
	pub fn new(token: impl Into<String>, secret: impl Into<Secret>) -> Self {
		Self { token: token.into(), secret: secret.into() }
	}

	/// Borrows the pair for signing.
	pub fn as_token_ref(&self) -> TokenRef<'_> {
		TokenRef { token: &self.token, secret: self.secret.expose() }
	}
}

/// Borrowed token + secret pair handed to signers.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TokenRef<'a> {
	/// Value sent as `oauth_token`.
	pub token: &'a str,
	/// Secret folded into the signing key string.
	pub secret: &'a str,
}
impl Debug for TokenRef<'_> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenRef")
			.field("token", &self.token)
			.field("secret", &"<redacted>")
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn token_ref_debug_hides_secret() {
		let token = RequestToken::new("RT1", "RTS1");
		let rendered = format!("{:?}", token.as_token_ref());

		assert!(rendered.contains("RT1"));
		assert!(!rendered.contains("RTS1"));
	}
}
