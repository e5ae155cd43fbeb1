//! Signed read-only Jira REST queries.
//!
//! [`JiraClient`] owns the resolved [`AccessCredential`] and signs every GET with the
//! access token. Responses are handed back as raw [`serde_json::Value`]s.

// crates.io
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::{AccessCredential, Consumer},
	http::{HttpMethod, OAuthHttpClient},
	oauth1::{OAuthRequest, PrivateKey, RsaSha1},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::JiraEndpoints,
};
#[cfg(feature = "reqwest")]
use crate::{config::Config, http::ReqwestHttpClient};

const STAGE_QUERY: &str = "query";

#[cfg(feature = "reqwest")]
/// Query client specialized for the crate's default reqwest transport.
pub type ReqwestJiraClient = JiraClient<ReqwestHttpClient>;

/// Read-only Jira client bound to one access credential.
pub struct JiraClient<C>
where
	C: ?Sized + OAuthHttpClient,
{
	/// Transport used for every query.
	pub http_client: Arc<C>,
	/// Jira endpoints derived from the base URL.
	pub endpoints: JiraEndpoints,
	credential: AccessCredential,
	consumer: Consumer,
	signer: RsaSha1,
}
impl<C> JiraClient<C>
where
	C: ?Sized + OAuthHttpClient,
{
	/// Creates a client that reuses the caller-provided transport.
	///
	/// The signing key is parsed from the credential's PEM.
	pub fn with_http_client(
		endpoints: JiraEndpoints,
		credential: AccessCredential,
		http_client: impl Into<Arc<C>>,
	) -> Result<Self> {
		let key = PrivateKey::from_pem(credential.private_key_pem.expose())?;
		let consumer = credential.consumer();

		Ok(Self {
			http_client: http_client.into(),
			endpoints,
			credential,
			consumer,
			signer: RsaSha1::new(key),
		})
	}

	/// Credential used to sign queries.
	pub fn credential(&self) -> &AccessCredential {
		&self.credential
	}

	/// `GET /rest/api/2/issue/{key}`.
	pub async fn issue(&self, key: &str) -> Result<Value> {
		self.get("issue", self.endpoints.issue(key)).await
	}

	/// `GET /rest/agile/1.0/sprint/{sprint_id}`.
	pub async fn sprint(&self, sprint_id: u64) -> Result<Value> {
		self.get("sprint", self.endpoints.sprint(sprint_id)).await
	}

	/// `GET /rest/agile/1.0/board/{board_id}/sprint`.
	pub async fn board_sprints(&self, board_id: u64) -> Result<Value> {
		self.get("board_sprints", self.endpoints.board_sprints(board_id)).await
	}

	/// `GET /rest/agile/1.0/sprint/{sprint_id}/issue`.
	pub async fn sprint_issues(&self, sprint_id: u64) -> Result<Value> {
		self.get("sprint_issues", self.endpoints.sprint_issues(sprint_id)).await
	}

	async fn get(&self, operation: &'static str, url: Url) -> Result<Value> {
		const KIND: FlowKind = FlowKind::Query;

		let span = FlowSpan::new(KIND, operation);

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let request = OAuthRequest::new(HttpMethod::Get, url, &self.consumer)
					.token(self.credential.as_token_ref())
					.sign(&self.signer)?;
				let reply = self
					.http_client
					.execute(request)
					.await
					.map_err(|e| e.at_stage(STAGE_QUERY))?;

				if !reply.is_ok() {
					return Err(Error::Api { status: reply.status, body: reply.body });
				}

				let deserializer = &mut serde_json::Deserializer::from_str(&reply.body);

				serde_path_to_error::deserialize::<_, Value>(deserializer)
					.map_err(|source| Error::Decode { source })
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}
#[cfg(feature = "reqwest")]
impl JiraClient<ReqwestHttpClient> {
	/// Creates a client for `credential` using the endpoints and HTTP timeout from `config`.
	pub fn new(config: &Config, credential: AccessCredential) -> Result<Self> {
		Self::with_http_client(config.endpoints.clone(), credential, config.http_client()?)
	}
}
impl<C> Debug for JiraClient<C>
where
	C: ?Sized + OAuthHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("JiraClient")
			.field("endpoints", &self.endpoints)
			.field("credential", &self.credential)
			.finish()
	}
}
