//! Transport primitives for signed Jira calls.
//!
//! The module exposes [`OAuthHttpClient`] so downstream crates can plug in their own HTTP
//! stack. The handshake and query layers only ever hand it a [`SignedRequest`] and read
//! back an [`HttpReply`]; status interpretation stays with the caller.

// self
use crate::{_prelude::*, error::TransportError, oauth1::SignedRequest};
#[cfg(feature = "reqwest")] use crate::error::ConfigError;

/// Boxed future returned by [`OAuthHttpClient::execute`].
pub type HttpFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpReply, TransportError>> + 'a + Send>>;

/// HTTP methods used by the handshake and query layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
	/// Read-only query.
	Get,
	/// Token endpoint call.
	Post,
}
impl HttpMethod {
	/// Uppercase method name as it appears in the signature base string.
	pub const fn as_str(self) -> &'static str {
		match self {
			HttpMethod::Get => "GET",
			HttpMethod::Post => "POST",
		}
	}
}
impl Display for HttpMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
#[cfg(feature = "reqwest")]
impl From<HttpMethod> for reqwest::Method {
	fn from(method: HttpMethod) -> Self {
		match method {
			HttpMethod::Get => reqwest::Method::GET,
			HttpMethod::Post => reqwest::Method::POST,
		}
	}
}

/// Status + body captured from a Jira response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpReply {
	/// HTTP status code.
	pub status: u16,
	/// Response body decoded as text.
	pub body: String,
}
impl HttpReply {
	/// Returns `true` for HTTP 200, the only status the OAuth endpoints treat as success.
	pub fn is_ok(&self) -> bool {
		self.status == 200
	}
}

/// Abstraction over HTTP transports capable of executing signed requests.
///
/// Implementations must be `Send + Sync + 'static` so a single client can be shared
/// between the handshake coordinator and the query client, and the futures they return
/// must own whatever state they need. Redirects should not be followed: the token
/// endpoints answer directly and a redirect would invalidate the signed URL.
pub trait OAuthHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` with its `Authorization` header and returns status + body.
	///
	/// Timeouts must surface as [`TransportError::TimedOut`] so callers can tag the stage.
	fn execute(&self, request: SignedRequest) -> HttpFuture<'_>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client that gives up after `timeout` and never follows redirects.
	pub fn with_timeout(timeout: Duration) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder()
			.timeout(timeout)
			.redirect(reqwest::redirect::Policy::none())
			.build()
			.map_err(ConfigError::http_client_build)?;

		Ok(Self(client))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl OAuthHttpClient for ReqwestHttpClient {
	fn execute(&self, request: SignedRequest) -> HttpFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let response = client
				.request(request.method.into(), request.url)
				.header(reqwest::header::AUTHORIZATION, request.authorization)
				.header(reqwest::header::ACCEPT, "application/json")
				.send()
				.await?;
			let status = response.status().as_u16();
			let body = response.text().await?;

			Ok(HttpReply { status, body })
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn only_200_counts_as_success() {
		assert!(HttpReply { status: 200, body: String::new() }.is_ok());
		assert!(!HttpReply { status: 201, body: String::new() }.is_ok());
		assert!(!HttpReply { status: 401, body: "oauth_problem=x".into() }.is_ok());
	}

	#[test]
	fn method_labels_are_uppercase() {
		assert_eq!(HttpMethod::Get.to_string(), "GET");
		assert_eq!(HttpMethod::Post.as_str(), "POST");
	}
}
