//! Runtime configuration loaded from the environment or assembled with a builder.

// self
use crate::{
	_prelude::*,
	auth::{AccessCredential, Consumer},
	error::ConfigError,
	oauth1::PrivateKey,
	provider::JiraEndpoints,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Default location of the consumer's PEM private key.
pub const DEFAULT_PRIVATE_KEY_PATH: &str = "auth/jira_privatekey.pem";
/// Default location of the persisted credential file.
pub const DEFAULT_CREDENTIALS_PATH: &str = "jira_oauth.json";
/// Default per-request HTTP timeout.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);
/// Default window for the user to approve access.
pub const DEFAULT_APPROVAL_TIMEOUT: Duration = Duration::from_secs(300);

const ENV_HOST: &str = "JIRA_HOST";
const ENV_CONSUMER_KEY: &str = "JIRA_CONS_KEY";
const ENV_CONSUMER_SECRET: &str = "JIRA_CONS_SECRET";
const ENV_TOKEN: &str = "JIRA_TOKEN";
const ENV_TOKEN_SECRET: &str = "JIRA_TOKEN_SECRET";
const ENV_KEY_CERT: &str = "JIRA_KEY_CERT";
const ENV_PRIVATE_KEY_PATH: &str = "JIRA_PRIVATE_KEY_PATH";
const ENV_CREDENTIALS_PATH: &str = "JIRA_CREDENTIALS_PATH";
const ENV_HTTP_TIMEOUT: &str = "JIRA_HTTP_TIMEOUT_SECS";
const ENV_APPROVAL_TIMEOUT: &str = "JIRA_APPROVAL_TIMEOUT_SECS";

/// Process-wide settings; read once at startup and never mutated.
#[derive(Clone, Debug)]
pub struct Config {
	/// Jira endpoints derived from `JIRA_HOST`.
	pub endpoints: JiraEndpoints,
	/// Consumer identity registered in the application link.
	pub consumer: Consumer,
	/// PEM private key used for RSA-SHA1 signing.
	pub private_key_path: PathBuf,
	/// Credential file written after a handshake.
	pub credentials_path: PathBuf,
	/// Ready-made credential injected through the environment, bypassing the handshake.
	pub injected_credential: Option<AccessCredential>,
	/// Per-request HTTP timeout.
	pub http_timeout: Duration,
	/// How long the handshake waits for the user's approval.
	pub approval_timeout: Duration,
}
impl Config {
	/// Starts a builder for the given Jira base URL and consumer key.
	pub fn builder(base_url: Url, consumer_key: impl Into<String>) -> ConfigBuilder {
		ConfigBuilder::new(base_url, consumer_key)
	}

	/// Reads the process environment.
	pub fn from_env() -> Result<Self> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Reads settings through `lookup`; empty values count as unset.
	pub fn from_lookup<F>(lookup: F) -> Result<Self>
	where
		F: Fn(&str) -> Option<String>,
	{
		let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
		let host = get(ENV_HOST).ok_or(ConfigError::MissingVar { name: ENV_HOST })?;
		let consumer_key =
			get(ENV_CONSUMER_KEY).ok_or(ConfigError::MissingVar { name: ENV_CONSUMER_KEY })?;
		let base_url = Url::parse(host.trim())
			.map_err(|source| ConfigError::InvalidBaseUrl { value: host.clone(), source })?;
		let mut builder = ConfigBuilder::new(base_url, consumer_key.clone());

		if let Some(secret) = get(ENV_CONSUMER_SECRET) {
			builder = builder.consumer_secret(secret);
		}
		if let Some(path) = get(ENV_PRIVATE_KEY_PATH) {
			builder = builder.private_key_path(path);
		}
		if let Some(path) = get(ENV_CREDENTIALS_PATH) {
			builder = builder.credentials_path(path);
		}
		if let Some(secs) = get(ENV_HTTP_TIMEOUT) {
			builder = builder.http_timeout(parse_secs(ENV_HTTP_TIMEOUT, &secs)?);
		}
		if let Some(secs) = get(ENV_APPROVAL_TIMEOUT) {
			builder = builder.approval_timeout(parse_secs(ENV_APPROVAL_TIMEOUT, &secs)?);
		}

		match (get(ENV_TOKEN), get(ENV_TOKEN_SECRET), get(ENV_KEY_CERT)) {
			(None, None, None) => {},
			(Some(token), Some(token_secret), Some(key_cert)) => {
				let credential =
					AccessCredential::new(token, token_secret, consumer_key, key_cert)
						.map_err(ConfigError::from)?;

				builder = builder.injected_credential(credential);
			},
			(token, token_secret, _) => {
				let name = if token.is_none() {
					ENV_TOKEN
				} else if token_secret.is_none() {
					ENV_TOKEN_SECRET
				} else {
					ENV_KEY_CERT
				};

				return Err(ConfigError::IncompleteInjectedCredential { name }.into());
			},
		}

		builder.build()
	}

	/// Loads the private key from [`Config::private_key_path`].
	pub fn load_private_key(&self) -> Result<PrivateKey> {
		PrivateKey::load(&self.private_key_path)
	}

	/// Builds the default reqwest transport honoring [`Config::http_timeout`].
	#[cfg(feature = "reqwest")]
	pub fn http_client(&self) -> Result<ReqwestHttpClient> {
		Ok(ReqwestHttpClient::with_timeout(self.http_timeout)?)
	}
}

/// Builder for [`Config`].
#[derive(Clone, Debug)]
pub struct ConfigBuilder {
	base_url: Url,
	consumer_key: String,
	consumer_secret: Option<String>,
	private_key_path: PathBuf,
	credentials_path: PathBuf,
	injected_credential: Option<AccessCredential>,
	http_timeout: Duration,
	approval_timeout: Duration,
}
impl ConfigBuilder {
	fn new(base_url: Url, consumer_key: impl Into<String>) -> Self {
		Self {
			base_url,
			consumer_key: consumer_key.into(),
			consumer_secret: None,
			private_key_path: PathBuf::from(DEFAULT_PRIVATE_KEY_PATH),
			credentials_path: PathBuf::from(DEFAULT_CREDENTIALS_PATH),
			injected_credential: None,
			http_timeout: DEFAULT_HTTP_TIMEOUT,
			approval_timeout: DEFAULT_APPROVAL_TIMEOUT,
		}
	}

	/// Sets the consumer secret (unused by RSA-SHA1 signatures).
	pub fn consumer_secret(mut self, secret: impl Into<String>) -> Self {
		self.consumer_secret = Some(secret.into());

		self
	}

	/// Overrides the private key location.
	pub fn private_key_path(mut self, path: impl Into<PathBuf>) -> Self {
		self.private_key_path = path.into();

		self
	}

	/// Overrides the credential file location.
	pub fn credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
		self.credentials_path = path.into();

		self
	}

	/// Injects a ready-made credential.
	pub fn injected_credential(mut self, credential: AccessCredential) -> Self {
		self.injected_credential = Some(credential);

		self
	}

	/// Overrides the per-request HTTP timeout.
	pub fn http_timeout(mut self, timeout: Duration) -> Self {
		self.http_timeout = timeout;

		self
	}

	/// Overrides the approval window.
	pub fn approval_timeout(mut self, timeout: Duration) -> Self {
		self.approval_timeout = timeout;

		self
	}

	/// Validates the base URL and consumer key and produces the config.
	pub fn build(self) -> Result<Config> {
		if self.consumer_key.trim().is_empty() {
			return Err(ConfigError::MissingVar { name: ENV_CONSUMER_KEY }.into());
		}

		let endpoints = JiraEndpoints::new(self.base_url)?;
		let mut consumer = Consumer::new(self.consumer_key);

		if let Some(secret) = self.consumer_secret {
			consumer = consumer.with_secret(secret);
		}

		Ok(Config {
			endpoints,
			consumer,
			private_key_path: self.private_key_path,
			credentials_path: self.credentials_path,
			injected_credential: self.injected_credential,
			http_timeout: self.http_timeout,
			approval_timeout: self.approval_timeout,
		})
	}
}

fn parse_secs(name: &'static str, value: &str) -> Result<Duration, ConfigError> {
	value
		.trim()
		.parse::<u64>()
		.map(Duration::from_secs)
		.map_err(|_| ConfigError::InvalidNumber { name, value: value.to_owned() })
}

#[cfg(test)]
mod tests {
	// std
	use std::collections::HashMap;
	// self
	use super::*;

	fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let map: HashMap<String, String> =
			pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();

		move |name| map.get(name).cloned()
	}

	#[test]
	fn minimal_environment_uses_defaults() {
		let config = Config::from_lookup(lookup(&[
			("JIRA_HOST", "https://jira.example.com"),
			("JIRA_CONS_KEY", "CK1"),
		]))
		.expect("Minimal environment should load.");

		assert_eq!(config.consumer.key(), "CK1");
		assert_eq!(config.consumer.secret(), "");
		assert_eq!(config.endpoints.base().as_str(), "https://jira.example.com/");
		assert_eq!(config.private_key_path, PathBuf::from(DEFAULT_PRIVATE_KEY_PATH));
		assert_eq!(config.credentials_path, PathBuf::from(DEFAULT_CREDENTIALS_PATH));
		assert_eq!(config.http_timeout, DEFAULT_HTTP_TIMEOUT);
		assert_eq!(config.approval_timeout, DEFAULT_APPROVAL_TIMEOUT);
		assert!(config.injected_credential.is_none());
	}

	#[test]
	fn missing_host_and_key_are_reported_by_name() {
		let err = Config::from_lookup(lookup(&[("JIRA_CONS_KEY", "CK1")]))
			.expect_err("Missing host should fail.");

		assert!(matches!(err, Error::Config(ConfigError::MissingVar { name: "JIRA_HOST" })));

		let err = Config::from_lookup(lookup(&[
			("JIRA_HOST", "https://jira.example.com"),
			("JIRA_CONS_KEY", "  "),
		]))
		.expect_err("Blank consumer key should fail.");

		assert!(matches!(err, Error::Config(ConfigError::MissingVar { name: "JIRA_CONS_KEY" })));
	}

	#[test]
	fn injected_credential_requires_all_three_variables() {
		let config = Config::from_lookup(lookup(&[
			("JIRA_HOST", "https://jira.example.com"),
			("JIRA_CONS_KEY", "CK1"),
			("JIRA_TOKEN", "AT1"),
			("JIRA_TOKEN_SECRET", "ATS1"),
			("JIRA_KEY_CERT", "pem"),
		]))
		.expect("Complete injected credential should load.");
		let injected = config.injected_credential.expect("Injected credential should be set.");

		assert_eq!(injected.access_token, "AT1");
		assert_eq!(injected.consumer_key, "CK1");

		let err = Config::from_lookup(lookup(&[
			("JIRA_HOST", "https://jira.example.com"),
			("JIRA_CONS_KEY", "CK1"),
			("JIRA_TOKEN", "AT1"),
		]))
		.expect_err("Partial injected credential should fail.");

		assert!(matches!(
			err,
			Error::Config(ConfigError::IncompleteInjectedCredential { name: "JIRA_TOKEN_SECRET" })
		));
	}

	#[test]
	fn numeric_overrides_are_validated() {
		let config = Config::from_lookup(lookup(&[
			("JIRA_HOST", "https://jira.example.com"),
			("JIRA_CONS_KEY", "CK1"),
			("JIRA_HTTP_TIMEOUT_SECS", "5"),
			("JIRA_APPROVAL_TIMEOUT_SECS", "60"),
		]))
		.expect("Numeric overrides should load.");

		assert_eq!(config.http_timeout, Duration::from_secs(5));
		assert_eq!(config.approval_timeout, Duration::from_secs(60));

		let err = Config::from_lookup(lookup(&[
			("JIRA_HOST", "https://jira.example.com"),
			("JIRA_CONS_KEY", "CK1"),
			("JIRA_HTTP_TIMEOUT_SECS", "soon"),
		]))
		.expect_err("Non-numeric timeout should fail.");

		assert!(matches!(err, Error::Config(ConfigError::InvalidNumber { .. })));
	}
}
