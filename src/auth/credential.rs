//! Long-lived access credential persisted after a successful handshake.

// self
use crate::{
	_prelude::*,
	auth::{Consumer, Secret, TokenRef},
};

/// Validation failure for [`AccessCredential`] fields.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum CredentialError {
	/// A required field was empty.
	#[error("Credential field `{field}` cannot be empty.")]
	EmptyField {
		/// Field name as written in the credential file.
		field: &'static str,
	},
}

/// Access token, its secret, the consumer key, and the PEM used to sign with them.
///
/// Serializes to the credential file layout
/// `{"access_token", "access_token_secret", "consumer_key", "key_cert"}`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessCredential {
	/// Long-lived `oauth_token`.
	pub access_token: String,
	/// Secret paired with the access token.
	pub access_token_secret: Secret,
	/// Consumer key the token was issued to.
	pub consumer_key: String,
	/// PEM text of the consumer's RSA private key.
	#[serde(rename = "key_cert")]
	pub private_key_pem: Secret,
}
impl AccessCredential {
	/// Builds a credential, rejecting empty fields.
	pub fn new(
		access_token: impl Into<String>,
		access_token_secret: impl Into<Secret>,
		consumer_key: impl Into<String>,
		private_key_pem: impl Into<Secret>,
	) -> Result<Self, CredentialError> {
		let credential = Self {
			access_token: access_token.into(),
			access_token_secret: access_token_secret.into(),
			consumer_key: consumer_key.into(),
			private_key_pem: private_key_pem.into(),
		};

		credential.validate()?;

		Ok(credential)
	}

	/// Checks that all four fields are populated.
	pub fn validate(&self) -> Result<(), CredentialError> {
		let fields = [
			("access_token", self.access_token.is_empty()),
			("access_token_secret", self.access_token_secret.is_empty()),
			("consumer_key", self.consumer_key.is_empty()),
			("key_cert", self.private_key_pem.expose().trim().is_empty()),
		];

		match fields.into_iter().find(|(_, empty)| *empty) {
			Some((field, _)) => Err(CredentialError::EmptyField { field }),
			None => Ok(()),
		}
	}

	/// Borrows the access token pair for signing.
	pub fn as_token_ref(&self) -> TokenRef<'_> {
		TokenRef { token: &self.access_token, secret: self.access_token_secret.expose() }
	}

	/// Consumer identity the credential belongs to.
	pub fn consumer(&self) -> Consumer {
		Consumer::new(self.consumer_key.clone())
	}
}
impl Debug for AccessCredential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessCredential")
			.field("access_token", &self.access_token)
			.field("access_token_secret", &self.access_token_secret)
			.field("consumer_key", &self.consumer_key)
			.field("key_cert", &self.private_key_pem)
			.finish()
	}
}
