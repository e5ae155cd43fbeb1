//! Three-legged OAuth 1.0a handshake against Jira's application-link endpoints.
//!
//! [`HandshakeCoordinator::run`] walks the linear state machine
//! `Init → RequestTokenPending → AwaitingUserAuthorization → AccessTokenPending → Authorized`,
//! signing both token calls with RSA-SHA1. Either pending state can drop into
//! [`HandshakeState::Failed`]; nothing is persisted unless the coordinator reaches
//! `Authorized`, and every successful run overwrites the previous credential.

// self
use crate::{
	_prelude::*,
	auth::{AccessCredential, Consumer, RequestToken},
	error::{ConfigError, RejectReason, TransportError},
	flows::{Approval, ApprovalError, ApprovalPort},
	http::{HttpMethod, HttpReply, OAuthHttpClient},
	oauth1::{OAuthRequest, RsaSha1, parse_form},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::JiraEndpoints,
	store::CredentialStore,
};
#[cfg(feature = "reqwest")]
use crate::{config::Config, http::ReqwestHttpClient, oauth1::PrivateKey};

const STAGE_REQUEST_TOKEN: &str = "request_token";
const STAGE_AUTHORIZE: &str = "authorize";
const STAGE_ACCESS_TOKEN: &str = "access_token";

#[cfg(feature = "reqwest")]
/// Coordinator specialized for the crate's default reqwest transport.
pub type ReqwestHandshakeCoordinator = HandshakeCoordinator<ReqwestHttpClient>;

/// Position of a coordinator within the handshake.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandshakeState {
	/// Nothing has been sent yet.
	Init,
	/// The request-token call is in flight.
	RequestTokenPending,
	/// Waiting for the user to approve access at `authorize_url`.
	AwaitingUserAuthorization {
		/// URL presented to the user.
		authorize_url: Url,
	},
	/// The access-token exchange is in flight.
	AccessTokenPending,
	/// The credential was issued and persisted.
	Authorized,
	/// The handshake stopped; nothing was persisted.
	Failed(HandshakeFailure),
}
impl HandshakeState {
	/// Returns a stable label suitable for logs.
	pub const fn label(&self) -> &'static str {
		match self {
			Self::Init => "init",
			Self::RequestTokenPending => "request_token_pending",
			Self::AwaitingUserAuthorization { .. } => "awaiting_user_authorization",
			Self::AccessTokenPending => "access_token_pending",
			Self::Authorized => "authorized",
			Self::Failed(_) => "failed",
		}
	}

	/// Returns `true` once the coordinator reached `Authorized` or `Failed`.
	pub const fn is_terminal(&self) -> bool {
		matches!(self, Self::Authorized | Self::Failed(_))
	}
}

/// Why a handshake ended in [`HandshakeState::Failed`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandshakeFailure {
	/// Jira refused the request-token call.
	InvalidConsumer,
	/// The user declined, or Jira refused the access-token call.
	UserDenied,
	/// A token call or the approval did not finish in time.
	TimedOut,
	/// Signing failed.
	Crypto,
	/// The network or the approval prompt failed.
	Transport,
	/// The credential could not be written.
	Persistence,
	/// Local configuration was unusable.
	Config,
}
impl HandshakeFailure {
	/// Returns a stable label suitable for metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::InvalidConsumer => "invalid_consumer",
			Self::UserDenied => "user_denied",
			Self::TimedOut => "timed_out",
			Self::Crypto => "crypto",
			Self::Transport => "transport",
			Self::Persistence => "persistence",
			Self::Config => "config",
		}
	}

	/// Classifies an error surfaced by [`HandshakeCoordinator::run`].
	pub fn from_error(error: &Error) -> Self {
		match error {
			Error::Rejected { reason: RejectReason::InvalidConsumer, .. } => Self::InvalidConsumer,
			Error::Rejected { reason: RejectReason::UserDenied, .. } => Self::UserDenied,
			Error::TimedOut { .. } => Self::TimedOut,
			Error::Crypto(_) => Self::Crypto,
			Error::Storage(_) => Self::Persistence,
			Error::Config(_) => Self::Config,
			Error::Transport(_) | Error::Api { .. } | Error::Decode { .. } => Self::Transport,
		}
	}
}

/// Drives one consumer through the three-legged handshake.
pub struct HandshakeCoordinator<C>
where
	C: ?Sized + OAuthHttpClient,
{
	/// Transport used for both token calls.
	pub http_client: Arc<C>,
	/// Jira endpoints derived from the base URL.
	pub endpoints: JiraEndpoints,
	/// Consumer registered in the application link.
	pub consumer: Consumer,
	/// Port that presents the authorize URL and returns the user's answer.
	pub approval: Arc<dyn ApprovalPort>,
	/// Destination of the issued credential.
	pub store: Arc<dyn CredentialStore>,
	/// Upper bound on the wait for the user's answer.
	pub approval_timeout: Duration,
	signer: RsaSha1,
	state: HandshakeState,
}
impl<C> HandshakeCoordinator<C>
where
	C: ?Sized + OAuthHttpClient,
{
	/// Creates a coordinator that reuses the caller-provided transport.
	pub fn with_http_client(
		endpoints: JiraEndpoints,
		consumer: Consumer,
		signer: RsaSha1,
		approval: Arc<dyn ApprovalPort>,
		store: Arc<dyn CredentialStore>,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			endpoints,
			consumer,
			approval,
			store,
			approval_timeout: crate::config::DEFAULT_APPROVAL_TIMEOUT,
			signer,
			state: HandshakeState::Init,
		}
	}

	/// Overrides the approval window.
	pub fn with_approval_timeout(mut self, timeout: Duration) -> Self {
		self.approval_timeout = timeout;

		self
	}

	/// Current state.
	pub fn state(&self) -> &HandshakeState {
		&self.state
	}

	/// Signer used for both token calls.
	pub fn signer(&self) -> &RsaSha1 {
		&self.signer
	}

	/// Runs the handshake to completion and returns the persisted credential.
	///
	/// Running again after a terminal state starts over and replaces the stored credential.
	pub async fn run(&mut self) -> Result<AccessCredential> {
		const KIND: FlowKind = FlowKind::Handshake;

		let span = FlowSpan::new(KIND, "run");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.drive()).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(e) => {
				let failure = HandshakeFailure::from_error(e);

				self.transition(HandshakeState::Failed(failure));
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);
				obs::record_handshake_failure(failure.as_str());
			},
		}

		result
	}

	async fn drive(&mut self) -> Result<AccessCredential> {
		self.transition(HandshakeState::RequestTokenPending);

		let request_token = self.request_token().await?;
		let authorize_url = self.endpoints.authorize(&request_token.token);

		self.transition(HandshakeState::AwaitingUserAuthorization {
			authorize_url: authorize_url.clone(),
		});

		let approval = self.await_approval(&authorize_url).await?;

		self.transition(HandshakeState::AccessTokenPending);

		let (access_token, access_token_secret) =
			self.access_token(&request_token, approval.verifier.as_deref()).await?;
		let credential = AccessCredential::new(
			access_token,
			access_token_secret,
			self.consumer.key(),
			self.signer.private_key().pem(),
		)
		.map_err(ConfigError::from)?;

		self.store.save(&credential).await?;
		self.transition(HandshakeState::Authorized);

		Ok(credential)
	}

	async fn request_token(&self) -> Result<RequestToken> {
		let request =
			OAuthRequest::new(HttpMethod::Post, self.endpoints.request_token(), &self.consumer)
				.callback("oob")
				.sign(&self.signer)?;
		let reply = self
			.http_client
			.execute(request)
			.await
			.map_err(|e| e.at_stage(STAGE_REQUEST_TOKEN))?;
		let (token, secret) = token_pair(reply, RejectReason::InvalidConsumer)?;

		Ok(RequestToken::new(token, secret))
	}

	async fn await_approval(&self, authorize_url: &Url) -> Result<Approval> {
		let pending = self.approval.await_approval(authorize_url);

		match tokio::time::timeout(self.approval_timeout, pending).await {
			Ok(Ok(approval)) => Ok(approval),
			Ok(Err(ApprovalError::Io(e))) => Err(TransportError::Io(e).into()),
			Ok(Err(e)) => Err(Error::Rejected {
				reason: RejectReason::UserDenied,
				status: None,
				body: e.to_string(),
			}),
			Err(_) => Err(Error::TimedOut { stage: STAGE_AUTHORIZE }),
		}
	}

	async fn access_token(
		&self,
		request_token: &RequestToken,
		verifier: Option<&str>,
	) -> Result<(String, String)> {
		let mut request =
			OAuthRequest::new(HttpMethod::Post, self.endpoints.access_token(), &self.consumer)
				.token(request_token.as_token_ref());

		if let Some(verifier) = verifier {
			request = request.verifier(verifier);
		}

		let reply = self
			.http_client
			.execute(request.sign(&self.signer)?)
			.await
			.map_err(|e| e.at_stage(STAGE_ACCESS_TOKEN))?;

		token_pair(reply, RejectReason::UserDenied)
	}

	fn transition(&mut self, next: HandshakeState) {
		obs::record_transition(self.state.label(), next.label());

		self.state = next;
	}
}
#[cfg(feature = "reqwest")]
impl HandshakeCoordinator<ReqwestHttpClient> {
	/// Builds a coordinator from [`Config`], loading the private key and a reqwest transport
	/// that honors the configured HTTP timeout.
	pub fn from_config(
		config: &Config,
		approval: Arc<dyn ApprovalPort>,
		store: Arc<dyn CredentialStore>,
	) -> Result<Self> {
		let key = PrivateKey::load(&config.private_key_path)?;

		Ok(Self::with_http_client(
			config.endpoints.clone(),
			config.consumer.clone(),
			RsaSha1::new(key),
			approval,
			store,
			config.http_client()?,
		)
		.with_approval_timeout(config.approval_timeout))
	}
}
impl<C> Debug for HandshakeCoordinator<C>
where
	C: ?Sized + OAuthHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("HandshakeCoordinator")
			.field("endpoints", &self.endpoints)
			.field("consumer", &self.consumer)
			.field("approval_timeout", &self.approval_timeout)
			.field("state", &self.state)
			.finish()
	}
}

/// Extracts `oauth_token` + `oauth_token_secret` from a token endpoint reply.
///
/// Anything other than HTTP 200 with both fields present and non-empty is a rejection
/// carrying the raw body.
fn token_pair(reply: HttpReply, reason: RejectReason) -> Result<(String, String)> {
	if reply.is_ok() {
		let mut fields = parse_form(&reply.body);
		let token = fields.remove("oauth_token").filter(|v| !v.is_empty());
		let secret = fields.remove("oauth_token_secret").filter(|v| !v.is_empty());

		if let (Some(token), Some(secret)) = (token, secret) {
			return Ok((token, secret));
		}
	}

	Err(Error::Rejected { reason, status: Some(reply.status), body: reply.body })
}

#[cfg(test)]
mod tests {
	// std
	use std::collections::VecDeque;
	// self
	use super::*;
	use crate::{
		flows::ChannelApproval,
		http::HttpFuture,
		oauth1::{PrivateKey, SignedRequest, parse_authorization},
		store::MemoryCredentialStore,
	};

	const PKCS8_PEM: &str = include_str!("../../tests/fixtures/rsa_pkcs8.pem");

	#[derive(Default)]
	struct ScriptedHttp {
		replies: Mutex<VecDeque<Result<HttpReply, TransportError>>>,
		seen: Mutex<Vec<SignedRequest>>,
	}
	impl ScriptedHttp {
		fn new(replies: Vec<Result<HttpReply, TransportError>>) -> Self {
			Self { replies: Mutex::new(replies.into()), seen: Mutex::default() }
		}

		fn seen(&self) -> Vec<SignedRequest> {
			self.seen.lock().clone()
		}
	}
	impl OAuthHttpClient for ScriptedHttp {
		fn execute(&self, request: SignedRequest) -> HttpFuture<'_> {
			self.seen.lock().push(request);

			let reply = self.replies.lock().pop_front().unwrap_or(Err(TransportError::TimedOut));

			Box::pin(async move { reply })
		}
	}

	fn ok(body: &str) -> Result<HttpReply, TransportError> {
		Ok(HttpReply { status: 200, body: body.into() })
	}

	fn coordinator(
		http: Arc<ScriptedHttp>,
		approval: ChannelApproval,
		store: MemoryCredentialStore,
	) -> HandshakeCoordinator<ScriptedHttp> {
		let endpoints = JiraEndpoints::parse("https://jira.example.com")
			.expect("Endpoint fixture should parse.");
		let key = PrivateKey::from_pem(PKCS8_PEM).expect("PKCS#8 fixture should parse.");

		HandshakeCoordinator::with_http_client(
			endpoints,
			Consumer::new("CK1"),
			RsaSha1::new(key),
			Arc::new(approval),
			Arc::new(store),
			http,
		)
	}

	fn oauth_params(request: &SignedRequest) -> BTreeMap<String, String> {
		parse_authorization(&request.authorization)
			.expect("Authorization header should use the OAuth scheme.")
	}

	#[tokio::test]
	async fn both_steps_succeeding_authorizes_and_persists() {
		let http = Arc::new(ScriptedHttp::new(vec![
			ok("oauth_token=RT1&oauth_token_secret=RTS1&oauth_callback_confirmed=true"),
			ok("oauth_token=AT1&oauth_token_secret=ATS1"),
		]));
		let (approval, sender) = ChannelApproval::new();
		let store = MemoryCredentialStore::default();
		let mut coordinator = coordinator(http.clone(), approval, store.clone());

		assert_eq!(coordinator.state(), &HandshakeState::Init);
		assert!(sender.approve(Approval::with_verifier("V1")));

		let credential = coordinator.run().await.expect("Handshake should succeed.");

		assert_eq!(coordinator.state(), &HandshakeState::Authorized);
		assert_eq!(credential.access_token, "AT1");
		assert_eq!(credential.access_token_secret.expose(), "ATS1");
		assert_eq!(credential.consumer_key, "CK1");
		assert_eq!(credential.private_key_pem.expose(), PKCS8_PEM.trim());
		assert_eq!(store.snapshot(), Some(credential));

		let seen = http.seen();

		assert_eq!(seen.len(), 2);

		for request in &seen {
			let params = oauth_params(request);
			let signature = params.get("oauth_signature").expect("Signature should be present.");

			coordinator
				.signer()
				.verify_message(request.base_string.as_bytes(), signature)
				.expect("Token calls should carry verifiable signatures.");
			assert_eq!(request.method, HttpMethod::Post);
		}

		let first = oauth_params(&seen[0]);
		let second = oauth_params(&seen[1]);

		assert_eq!(seen[0].url.path(), "/plugins/servlet/oauth/request-token");
		assert_eq!(first.get("oauth_callback").map(String::as_str), Some("oob"));
		assert!(!first.contains_key("oauth_token"));
		assert_eq!(seen[1].url.path(), "/plugins/servlet/oauth/access-token");
		assert_eq!(second.get("oauth_token").map(String::as_str), Some("RT1"));
		assert_eq!(second.get("oauth_verifier").map(String::as_str), Some("V1"));
	}

	#[tokio::test]
	async fn request_token_without_secret_is_an_invalid_consumer() {
		let http = Arc::new(ScriptedHttp::new(vec![ok("oauth_token=RT1&oauth_token_secret=")]));
		let (approval, _sender) = ChannelApproval::new();
		let store = MemoryCredentialStore::default();
		let mut coordinator = coordinator(http.clone(), approval, store.clone());
		let err = coordinator.run().await.expect_err("Empty secret should fail the handshake.");

		assert!(matches!(
			&err,
			Error::Rejected { reason: RejectReason::InvalidConsumer, status: Some(200), body }
				if body.contains("oauth_token=RT1")
		));
		assert_eq!(
			coordinator.state(),
			&HandshakeState::Failed(HandshakeFailure::InvalidConsumer)
		);
		assert_eq!(http.seen().len(), 1);
		assert_eq!(store.snapshot(), None);
	}

	#[tokio::test]
	async fn declined_approval_stops_before_the_exchange() {
		let http = Arc::new(ScriptedHttp::new(vec![ok("oauth_token=RT1&oauth_token_secret=RTS1")]));
		let (approval, sender) = ChannelApproval::new();
		let store = MemoryCredentialStore::default();
		let mut coordinator = coordinator(http.clone(), approval, store.clone());

		assert!(sender.deny());

		let err = coordinator.run().await.expect_err("Declined approval should fail.");

		assert_eq!(err.rejection(), Some(RejectReason::UserDenied));
		assert_eq!(coordinator.state(), &HandshakeState::Failed(HandshakeFailure::UserDenied));
		assert_eq!(http.seen().len(), 1);
		assert_eq!(store.snapshot(), None);
	}

	#[tokio::test]
	async fn access_token_timeout_is_tagged_with_its_stage() {
		let http = Arc::new(ScriptedHttp::new(vec![
			ok("oauth_token=RT1&oauth_token_secret=RTS1"),
			Err(TransportError::TimedOut),
		]));
		let (approval, sender) = ChannelApproval::new();
		let store = MemoryCredentialStore::default();
		let mut coordinator = coordinator(http, approval, store.clone());

		assert!(sender.approve(Approval::granted()));

		let err = coordinator.run().await.expect_err("Transport timeout should fail.");

		assert!(matches!(err, Error::TimedOut { stage: "access_token" }));
		assert_eq!(coordinator.state(), &HandshakeState::Failed(HandshakeFailure::TimedOut));
		assert_eq!(store.snapshot(), None);
	}

	#[test]
	fn failures_are_classified_by_error_kind() {
		let storage: Error = crate::store::StoreError::Backend { message: "disk".into() }.into();

		assert_eq!(HandshakeFailure::from_error(&storage), HandshakeFailure::Persistence);
		assert_eq!(
			HandshakeFailure::from_error(&Error::TimedOut { stage: "authorize" }),
			HandshakeFailure::TimedOut
		);
		assert_eq!(HandshakeFailure::Persistence.as_str(), "persistence");
		assert!(HandshakeState::Failed(HandshakeFailure::Crypto).is_terminal());
		assert!(!HandshakeState::AccessTokenPending.is_terminal());
	}
}
