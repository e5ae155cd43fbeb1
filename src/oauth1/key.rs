//! RSA private key loading.

// std
use std::fs;
// crates.io
use rsa::{RsaPrivateKey, RsaPublicKey, pkcs1::DecodeRsaPrivateKey, pkcs8::DecodePrivateKey};
// self
use crate::{
	_prelude::*,
	auth::Secret,
	error::{ConfigError, CryptoError},
};

/// Consumer RSA private key parsed from PEM text.
///
/// Accepts PKCS#8 (`BEGIN PRIVATE KEY`) and PKCS#1 (`BEGIN RSA PRIVATE KEY`) encodings and
/// keeps the trimmed PEM so it can be written into the credential file.
#[derive(Clone)]
pub struct PrivateKey {
	inner: RsaPrivateKey,
	pem: Secret,
}
impl PrivateKey {
	/// Parses PEM text.
	pub fn from_pem(pem: &str) -> Result<Self, CryptoError> {
		let pem = pem.trim();
		let inner = RsaPrivateKey::from_pkcs8_pem(pem).or_else(|pkcs8| {
			RsaPrivateKey::from_pkcs1_pem(pem).map_err(|pkcs1| CryptoError::InvalidPrivateKey {
				message: format!("PKCS#8: {pkcs8}; PKCS#1: {pkcs1}"),
			})
		})?;

		Ok(Self { inner, pem: Secret::new(pem) })
	}

	/// Reads and parses the PEM file at `path`.
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let pem = fs::read_to_string(path).map_err(|source| {
			ConfigError::PrivateKeyUnreadable { path: path.to_path_buf(), source }
		})?;

		Ok(Self::from_pem(&pem)?)
	}

	/// Trimmed PEM text.
	pub fn pem(&self) -> &str {
		self.pem.expose()
	}

	/// Public half, used to verify signatures.
	pub fn public_key(&self) -> RsaPublicKey {
		self.inner.to_public_key()
	}

	pub(crate) fn rsa(&self) -> &RsaPrivateKey {
		&self.inner
	}
}
impl Debug for PrivateKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("PrivateKey(<redacted>)")
	}
}
