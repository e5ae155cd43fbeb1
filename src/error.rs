//! Crate-level error types shared across the signer, handshake, stores, and query layer.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Credential persistence failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Key parsing or signing failure.
	#[error(transparent)]
	Crypto(#[from] CryptoError),
	/// Transport failure (DNS, TCP, TLS, IO).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Jira refused one of the handshake steps or answered with an unusable body.
	#[error("Jira rejected the handshake ({reason}, status {status:?}).")]
	Rejected {
		/// Which side of the exchange is at fault.
		reason: RejectReason,
		/// HTTP status code, when the rejection came from the wire.
		status: Option<u16>,
		/// Raw response body kept for diagnostics.
		body: String,
	},
	/// No response or approval arrived within the configured window.
	#[error("Timed out during the {stage} stage.")]
	TimedOut {
		/// Stage label (`request_token`, `authorize`, `access_token`, `query`).
		stage: &'static str,
	},
	/// A query endpoint returned a non-success status.
	#[error("Jira API responded with status {status}.")]
	Api {
		/// HTTP status code.
		status: u16,
		/// Raw response body.
		body: String,
	},
	/// A query endpoint returned a body that is not valid JSON.
	#[error("Jira API returned malformed JSON.")]
	Decode {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl Error {
	/// Returns the rejection reason when the error is [`Error::Rejected`].
	pub fn rejection(&self) -> Option<RejectReason> {
		match self {
			Self::Rejected { reason, .. } => Some(*reason),
			_ => None,
		}
	}
}

/// Distinguishes which handshake step Jira refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RejectReason {
	/// The request-token step failed; the consumer key or its public key is not registered.
	InvalidConsumer,
	/// The access-token step failed or the user declined the authorization.
	UserDenied,
}
impl RejectReason {
	/// Returns a stable label suitable for logs.
	pub const fn as_str(self) -> &'static str {
		match self {
			RejectReason::InvalidConsumer => "invalid_consumer",
			RejectReason::UserDenied => "user_denied",
		}
	}
}
impl Display for RejectReason {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A required environment variable is not set.
	#[error("Environment variable `{name}` is required.")]
	MissingVar {
		/// Variable name.
		name: &'static str,
	},
	/// Only part of the injected credential was provided.
	#[error("Environment variable `{name}` is required when injecting a credential.")]
	IncompleteInjectedCredential {
		/// Name of the first missing variable.
		name: &'static str,
	},
	/// Base URL cannot be parsed.
	#[error("Base URL `{value}` is invalid.")]
	InvalidBaseUrl {
		/// Offending value.
		value: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Base URL parsed but cannot host REST endpoints.
	#[error("Base URL `{value}` must be an absolute http(s) URL.")]
	UnsupportedBaseUrl {
		/// Offending value.
		value: String,
	},
	/// A numeric setting could not be parsed.
	#[error("Environment variable `{name}` must be a non-negative integer, got `{value}`.")]
	InvalidNumber {
		/// Variable name.
		name: &'static str,
		/// Offending value.
		value: String,
	},
	/// The signer was invoked without a normalized request URL.
	#[error("Base URL for request is not set.")]
	MissingRequestUrl,
	/// The private key file could not be read.
	#[error("Private key file {} could not be read.", .path.display())]
	PrivateKeyUnreadable {
		/// Path that was attempted.
		path: PathBuf,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
	/// Credential fields failed validation.
	#[error(transparent)]
	InvalidCredential(#[from] crate::auth::CredentialError),
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// RSA key handling and signing failures.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum CryptoError {
	/// PEM text is neither PKCS#8 nor PKCS#1 RSA key material.
	#[error("Private key is not a valid RSA PEM: {message}.")]
	InvalidPrivateKey {
		/// Parser diagnostics.
		message: String,
	},
	/// The RSA primitive refused to sign.
	#[error("RSA-SHA1 signing failed: {message}.")]
	Signing {
		/// Primitive diagnostics.
		message: String,
	},
	/// A signature did not verify against the public key.
	#[error("Signature verification failed.")]
	InvalidSignature,
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling Jira.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The request did not complete within the HTTP timeout.
	#[error("Request to Jira timed out.")]
	TimedOut,
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling Jira.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Lifts a transport failure into [`Error`], tagging timeouts with the stage.
	pub fn at_stage(self, stage: &'static str) -> Error {
		match self {
			Self::TimedOut => Error::TimedOut { stage },
			other => Error::Transport(other),
		}
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::TimedOut } else { Self::network(e) }
	}
}
