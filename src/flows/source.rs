//! Credential resolution: injected environment credential, then the credential file, then a
//! fresh handshake.
//!
//! [`CredentialSource::resolve`] reports which of the three produced the credential so
//! callers can log it or decide whether to keep the file around.

// self
use crate::{
	_prelude::*,
	auth::AccessCredential,
	config::Config,
	flows::{ApprovalPort, HandshakeCoordinator},
	http::OAuthHttpClient,
	oauth1::RsaSha1,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::CredentialStore,
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, store::FileCredentialStore};

/// Where a resolved credential came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CredentialOrigin {
	/// `JIRA_TOKEN`, `JIRA_TOKEN_SECRET`, and `JIRA_KEY_CERT`.
	Environment,
	/// The persisted credential file.
	File,
	/// A handshake completed during this resolution.
	Handshake,
}
impl CredentialOrigin {
	/// Returns a stable label suitable for logs.
	pub const fn as_str(self) -> &'static str {
		match self {
			CredentialOrigin::Environment => "environment",
			CredentialOrigin::File => "file",
			CredentialOrigin::Handshake => "handshake",
		}
	}
}
impl Display for CredentialOrigin {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Credential plus the source that produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedCredential {
	/// The usable credential.
	pub credential: AccessCredential,
	/// Which source succeeded.
	pub origin: CredentialOrigin,
}

/// Ordered credential lookup ending in a handshake.
pub struct CredentialSource<C>
where
	C: ?Sized + OAuthHttpClient,
{
	/// Settings supplying the injected credential, consumer, and key location.
	pub config: Config,
	/// Store consulted second and written by the handshake.
	pub store: Arc<dyn CredentialStore>,
	/// Approval port used when a handshake is needed.
	///
	/// Every handshake this source runs asks the same port, so it must be able to answer more
	/// than once (both [`ConsoleApproval`](crate::flows::ConsoleApproval) and
	/// [`ChannelApproval`](crate::flows::ChannelApproval) do).
	pub approval: Arc<dyn ApprovalPort>,
	/// Transport used when a handshake is needed.
	pub http_client: Arc<C>,
}
impl<C> CredentialSource<C>
where
	C: ?Sized + OAuthHttpClient,
{
	/// Creates a source that reuses the caller-provided store and transport.
	pub fn with_http_client(
		config: Config,
		store: Arc<dyn CredentialStore>,
		approval: Arc<dyn ApprovalPort>,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		Self { config, store, approval, http_client: http_client.into() }
	}

	/// Returns the first available credential.
	///
	/// A missing credential file falls through silently. An unreadable or invalid file, or one
	/// issued to another consumer key, is logged and skipped. The private key is only read
	/// when a handshake is actually needed.
	pub async fn resolve(&self) -> Result<ResolvedCredential> {
		const KIND: FlowKind = FlowKind::CredentialSource;

		let span = FlowSpan::new(KIND, "resolve");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.resolve_inner()).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	async fn resolve_inner(&self) -> Result<ResolvedCredential> {
		if let Some(credential) = &self.config.injected_credential {
			return Ok(ResolvedCredential {
				credential: credential.clone(),
				origin: CredentialOrigin::Environment,
			});
		}

		match self.store.load().await {
			Ok(Some(credential)) if credential.consumer_key == self.config.consumer.key() =>
				return Ok(ResolvedCredential { credential, origin: CredentialOrigin::File }),
			Ok(Some(credential)) => {
				let reason =
					format!("credential was issued to consumer `{}`", credential.consumer_key);

				obs::record_source_skipped(CredentialOrigin::File.as_str(), &reason);
			},
			Ok(None) => {},
			Err(e) => obs::record_source_skipped(CredentialOrigin::File.as_str(), &e),
		}

		let key = self.config.load_private_key()?;
		let mut coordinator = HandshakeCoordinator::<C>::with_http_client(
			self.config.endpoints.clone(),
			self.config.consumer.clone(),
			RsaSha1::new(key),
			self.approval.clone(),
			self.store.clone(),
			self.http_client.clone(),
		)
		.with_approval_timeout(self.config.approval_timeout);
		let credential = coordinator.run().await?;

		Ok(ResolvedCredential { credential, origin: CredentialOrigin::Handshake })
	}
}
#[cfg(feature = "reqwest")]
impl CredentialSource<ReqwestHttpClient> {
	/// Creates a source backed by the credential file at [`Config::credentials_path`] and a
	/// reqwest transport honoring [`Config::http_timeout`].
	pub fn new(config: Config, approval: Arc<dyn ApprovalPort>) -> Result<Self> {
		let store = Arc::new(FileCredentialStore::new(config.credentials_path.clone()));
		let http_client = config.http_client()?;

		Ok(Self::with_http_client(config, store, approval, http_client))
	}
}
impl<C> Debug for CredentialSource<C>
where
	C: ?Sized + OAuthHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialSource").field("config", &self.config).finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		error::{ConfigError, TransportError},
		flows::ChannelApproval,
		http::HttpFuture,
		oauth1::SignedRequest,
		store::MemoryCredentialStore,
	};

	struct Offline;
	impl OAuthHttpClient for Offline {
		fn execute(&self, _request: SignedRequest) -> HttpFuture<'_> {
			Box::pin(async { Err(TransportError::Io(std::io::Error::other("offline"))) })
		}
	}

	fn config() -> crate::config::ConfigBuilder {
		let base =
			Url::parse("https://jira.example.com").expect("Base URL fixture should parse.");

		Config::builder(base, "CK1").private_key_path("does/not/exist.pem")
	}

	fn credential(token: &str, consumer_key: &str) -> AccessCredential {
		AccessCredential::new(token, "secret", consumer_key, "pem")
			.expect("Credential fixture should be valid.")
	}

	fn source(config: Config, store: MemoryCredentialStore) -> CredentialSource<Offline> {
		let (approval, _sender) = ChannelApproval::new();

		CredentialSource::with_http_client(config, Arc::new(store), Arc::new(approval), Offline)
	}

	#[tokio::test]
	async fn environment_wins_over_the_file() {
		let config = config()
			.injected_credential(credential("ENV", "CK1"))
			.build()
			.expect("Config fixture should build.");
		let store = MemoryCredentialStore::with_credential(credential("FILE", "CK1"));
		let resolved =
			source(config, store).resolve().await.expect("Injected credential should resolve.");

		assert_eq!(resolved.origin, CredentialOrigin::Environment);
		assert_eq!(resolved.credential.access_token, "ENV");
	}

	#[tokio::test]
	async fn stored_credential_for_the_same_consumer_is_reused() {
		let config = config().build().expect("Config fixture should build.");
		let store = MemoryCredentialStore::with_credential(credential("FILE", "CK1"));
		let resolved =
			source(config, store).resolve().await.expect("Stored credential should resolve.");

		assert_eq!(resolved.origin, CredentialOrigin::File);
		assert_eq!(resolved.credential.access_token, "FILE");
	}

	#[tokio::test]
	async fn foreign_or_missing_credentials_fall_through_to_the_handshake() {
		for store in [
			MemoryCredentialStore::default(),
			MemoryCredentialStore::with_credential(credential("FILE", "OTHER")),
		] {
			let config = config().build().expect("Config fixture should build.");
			let err = source(config, store)
				.resolve()
				.await
				.expect_err("Handshake without a private key should fail.");

			assert!(matches!(err, Error::Config(ConfigError::PrivateKeyUnreadable { .. })));
		}
	}
}
