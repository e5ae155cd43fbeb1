//! Signature methods that turn a normalized request into an `oauth_signature`.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use rsa::{
	pkcs1v15::{Signature, SigningKey, VerifyingKey},
	signature::{SignatureEncoding, Signer as _, Verifier as _},
};
use sha1::Sha1;
// self
use crate::{
	_prelude::*,
	auth::{Consumer, TokenRef},
	error::{ConfigError, CryptoError},
	oauth1::{PrivateKey, percent_encode},
};

/// Normalized request fields that make up the signature base string.
#[derive(Clone, Copy, Debug)]
pub struct SignatureInput<'a> {
	/// Uppercase HTTP method.
	pub method: &'a str,
	/// Base string URI from [`normalize_url`](crate::oauth1::normalize_url); required.
	pub normalized_url: Option<&'a str>,
	/// Output of [`normalize_parameters`](crate::oauth1::normalize_parameters).
	pub normalized_params: &'a str,
}

/// Material handed to a signature method.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningBase {
	/// `encode(consumer_secret)&encode(token_secret)`; keyed methods sign with it.
	pub key: String,
	/// UTF-8 bytes of `METHOD&encode(URL)&encode(PARAMS)`.
	pub message: Vec<u8>,
}
impl Debug for SigningBase {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SigningBase")
			.field("key", &"<redacted>")
			.field("message", &String::from_utf8_lossy(&self.message))
			.finish()
	}
}

/// OAuth 1.0a signature method contract.
///
/// [`signing_base`](SignatureMethod::signing_base) produces both the base string and the
/// secret-derived key string so keyed and asymmetric methods share one interface; RSA-SHA1
/// ignores the key.
pub trait SignatureMethod
where
	Self: Send + Sync,
{
	/// Value sent as `oauth_signature_method`.
	fn name(&self) -> &'static str;

	/// Builds the base string and key string for a request.
	fn signing_base(
		&self,
		input: &SignatureInput<'_>,
		consumer: &Consumer,
		token: Option<TokenRef<'_>>,
	) -> Result<SigningBase> {
		let url = input.normalized_url.ok_or(ConfigError::MissingRequestUrl)?;
		let message =
			signature_base_string(input.method, url, input.normalized_params).into_bytes();
		let mut key = format!("{}&", percent_encode(consumer.secret()));

		if let Some(token) = token {
			key.push_str(&percent_encode(token.secret));
		}

		Ok(SigningBase { key, message })
	}

	/// Returns the base64 `oauth_signature` value.
	fn sign(
		&self,
		input: &SignatureInput<'_>,
		consumer: &Consumer,
		token: Option<TokenRef<'_>>,
	) -> Result<String>;
}

/// RSA-SHA1 (PKCS#1 v1.5) signature method backed by the consumer's private key.
#[derive(Clone)]
pub struct RsaSha1 {
	key: PrivateKey,
	signing_key: SigningKey<Sha1>,
}
impl RsaSha1 {
	/// Method name registered in RFC 5849 §3.4.3.
	pub const NAME: &'static str = "RSA-SHA1";

	/// Wraps a parsed private key.
	pub fn new(key: PrivateKey) -> Self {
		let signing_key = SigningKey::<Sha1>::new(key.rsa().clone());

		Self { key, signing_key }
	}

	/// Private key backing this signer.
	pub fn private_key(&self) -> &PrivateKey {
		&self.key
	}

	/// Signs raw bytes and returns the base64 signature.
	pub fn sign_message(&self, message: &[u8]) -> Result<String, CryptoError> {
		let signature = self
			.signing_key
			.try_sign(message)
			.map_err(|e| CryptoError::Signing { message: e.to_string() })?;

		Ok(STANDARD.encode(signature.to_bytes()))
	}

	/// Verifies a base64 signature against the public half of the key.
	pub fn verify_message(&self, message: &[u8], signature: &str) -> Result<(), CryptoError> {
		let raw = STANDARD.decode(signature).map_err(|_| CryptoError::InvalidSignature)?;
		let signature =
			Signature::try_from(raw.as_slice()).map_err(|_| CryptoError::InvalidSignature)?;

		VerifyingKey::<Sha1>::new(self.key.public_key())
			.verify(message, &signature)
			.map_err(|_| CryptoError::InvalidSignature)
	}
}
impl SignatureMethod for RsaSha1 {
	fn name(&self) -> &'static str {
		Self::NAME
	}

	fn sign(
		&self,
		input: &SignatureInput<'_>,
		consumer: &Consumer,
		token: Option<TokenRef<'_>>,
	) -> Result<String> {
		let base = self.signing_base(input, consumer, token)?;

		Ok(self.sign_message(&base.message)?)
	}
}
impl Debug for RsaSha1 {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RsaSha1").field("key", &self.key).finish()
	}
}

/// Joins `METHOD&encode(URL)&encode(PARAMS)` (RFC 5849 §3.4.1.1).
pub fn signature_base_string(
	method: &str,
	normalized_url: &str,
	normalized_params: &str,
) -> String {
	[percent_encode(method), percent_encode(normalized_url), percent_encode(normalized_params)]
		.join("&")
}
