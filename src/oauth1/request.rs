//! Protocol parameter assembly and `Authorization` header rendering.

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{
	_prelude::*,
	auth::{Consumer, TokenRef},
	http::HttpMethod,
	oauth1::{
		SignatureInput, SignatureMethod, normalize_parameters, normalize_url, percent_encode,
		signature_base_string,
	},
};

const NONCE_LEN: usize = 32;
const OAUTH_VERSION: &str = "1.0";

/// Builder for a single signed request.
///
/// Nonce and timestamp are generated at [`sign`](OAuthRequest::sign) time unless pinned,
/// which keeps signatures reproducible in tests.
#[derive(Clone, Debug)]
pub struct OAuthRequest<'a> {
	method: HttpMethod,
	url: Url,
	consumer: &'a Consumer,
	token: Option<TokenRef<'a>>,
	callback: Option<String>,
	verifier: Option<String>,
	nonce: Option<String>,
	timestamp: Option<i64>,
}
impl<'a> OAuthRequest<'a> {
	/// Starts a request for `method` + `url` on behalf of `consumer`.
	pub fn new(method: HttpMethod, url: Url, consumer: &'a Consumer) -> Self {
		Self {
			method,
			url,
			consumer,
			token: None,
			callback: None,
			verifier: None,
			nonce: None,
			timestamp: None,
		}
	}

	/// Attaches the request or access token (`oauth_token`).
	pub fn token(mut self, token: TokenRef<'a>) -> Self {
		self.token = Some(token);

		self
	}

	/// Sets `oauth_callback`; the handshake uses `oob`.
	pub fn callback(mut self, callback: impl Into<String>) -> Self {
		self.callback = Some(callback.into());

		self
	}

	/// Sets `oauth_verifier` when the user was shown a verification code.
	pub fn verifier(mut self, verifier: impl Into<String>) -> Self {
		self.verifier = Some(verifier.into());

		self
	}

	/// Pins `oauth_nonce`.
	pub fn nonce(mut self, nonce: impl Into<String>) -> Self {
		self.nonce = Some(nonce.into());

		self
	}

	/// Pins `oauth_timestamp` (seconds since the Unix epoch).
	pub fn timestamp(mut self, timestamp: i64) -> Self {
		self.timestamp = Some(timestamp);

		self
	}

	/// Signs the request with `signer` and renders the `Authorization` header.
	pub fn sign(self, signer: &dyn SignatureMethod) -> Result<SignedRequest> {
		let nonce = self.nonce.unwrap_or_else(generate_nonce);
		let timestamp =
			self.timestamp.unwrap_or_else(|| OffsetDateTime::now_utc().unix_timestamp());
		let mut protocol: Vec<(&'static str, String)> = vec![
			("oauth_consumer_key", self.consumer.key().to_owned()),
			("oauth_nonce", nonce),
			("oauth_signature_method", signer.name().to_owned()),
			("oauth_timestamp", timestamp.to_string()),
			("oauth_version", OAUTH_VERSION.to_owned()),
		];

		if let Some(callback) = self.callback {
			protocol.push(("oauth_callback", callback));
		}
		if let Some(token) = self.token {
			protocol.push(("oauth_token", token.token.to_owned()));
		}
		if let Some(verifier) = self.verifier {
			protocol.push(("oauth_verifier", verifier));
		}

		let query: Vec<(String, String)> = self.url.query_pairs().into_owned().collect();
		let normalized_params = normalize_parameters(
			protocol
				.iter()
				.map(|(k, v)| (*k, v.as_str()))
				.chain(query.iter().map(|(k, v)| (k.as_str(), v.as_str()))),
		);
		let normalized_url = normalize_url(&self.url);
		let input = SignatureInput {
			method: self.method.as_str(),
			normalized_url: Some(&normalized_url),
			normalized_params: &normalized_params,
		};
		let signature = signer.sign(&input, self.consumer, self.token)?;
		let base_string =
			signature_base_string(self.method.as_str(), &normalized_url, &normalized_params);

		protocol.push(("oauth_signature", signature));
		protocol.sort();

		let authorization = format!(
			"OAuth {}",
			protocol
				.iter()
				.map(|(k, v)| format!("{k}=\"{}\"", percent_encode(v)))
				.collect::<Vec<_>>()
				.join(", ")
		);

		Ok(SignedRequest { method: self.method, url: self.url, authorization, base_string })
	}
}

/// Request ready for the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedRequest {
	/// HTTP method.
	pub method: HttpMethod,
	/// Absolute request URL, query included.
	pub url: Url,
	/// Value for the `Authorization` header.
	pub authorization: String,
	/// Signature base string, kept for diagnostics.
	pub base_string: String,
}

/// Parses an `OAuth k="v", ...` header back into decoded parameters.
///
/// Returns `None` when the header does not use the `OAuth` scheme.
pub fn parse_authorization(header: &str) -> Option<BTreeMap<String, String>> {
	let params = header.trim().strip_prefix("OAuth ")?;
	let mut parsed = BTreeMap::new();

	for pair in params.split(',') {
		let (key, value) = pair.trim().split_once('=')?;
		let value = value.trim_matches('"');
		let decoded = percent_encoding::percent_decode_str(value).decode_utf8().ok()?;

		parsed.insert(key.to_owned(), decoded.into_owned());
	}

	Some(parsed)
}

fn generate_nonce() -> String {
	rand::rng().sample_iter(Alphanumeric).take(NONCE_LEN).map(char::from).collect()
}
