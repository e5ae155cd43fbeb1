//! Jira endpoint layout derived from a single base URL.

// self
use crate::{_prelude::*, error::ConfigError};

const OAUTH_SERVLET: [&str; 3] = ["plugins", "servlet", "oauth"];

/// OAuth and REST endpoints of a Jira instance.
///
/// The base URL may carry a context path (`https://example.com/jira`); every endpoint is
/// appended below it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JiraEndpoints {
	base: Url,
}
impl JiraEndpoints {
	/// Validates `base` and builds the endpoint set.
	pub fn new(base: Url) -> Result<Self, ConfigError> {
		if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
			return Err(ConfigError::UnsupportedBaseUrl { value: base.to_string() });
		}

		Ok(Self { base })
	}

	/// Parses and validates a base URL string.
	pub fn parse(value: &str) -> Result<Self, ConfigError> {
		let base = Url::parse(value)
			.map_err(|source| ConfigError::InvalidBaseUrl { value: value.to_owned(), source })?;

		Self::new(base)
	}

	/// Base URL as configured.
	pub fn base(&self) -> &Url {
		&self.base
	}

	/// `{base}/plugins/servlet/oauth/request-token`.
	pub fn request_token(&self) -> Url {
		self.join(OAUTH_SERVLET.into_iter().chain(["request-token"]))
	}

	/// `{base}/plugins/servlet/oauth/access-token`.
	pub fn access_token(&self) -> Url {
		self.join(OAUTH_SERVLET.into_iter().chain(["access-token"]))
	}

	/// `{base}/plugins/servlet/oauth/authorize?oauth_token=...`, shown to the user.
	pub fn authorize(&self, request_token: &str) -> Url {
		let mut url = self.join(OAUTH_SERVLET.into_iter().chain(["authorize"]));

		url.query_pairs_mut().append_pair("oauth_token", request_token);

		url
	}

	/// `{base}/rest/api/2/issue/{key}`.
	pub fn issue(&self, key: &str) -> Url {
		self.join(["rest", "api", "2", "issue", key])
	}

	/// `{base}/rest/agile/1.0/sprint/{sprint_id}`.
	pub fn sprint(&self, sprint_id: u64) -> Url {
		self.join(["rest", "agile", "1.0", "sprint", &sprint_id.to_string()])
	}

	/// `{base}/rest/agile/1.0/board/{board_id}/sprint`.
	pub fn board_sprints(&self, board_id: u64) -> Url {
		self.join(["rest", "agile", "1.0", "board", &board_id.to_string(), "sprint"])
	}

	/// `{base}/rest/agile/1.0/sprint/{sprint_id}/issue`.
	pub fn sprint_issues(&self, sprint_id: u64) -> Url {
		self.join(["rest", "agile", "1.0", "sprint", &sprint_id.to_string(), "issue"])
	}

	fn join<'a, I>(&self, segments: I) -> Url
	where
		I: IntoIterator<Item = &'a str>,
	{
		let mut url = self.base.clone();

		url.set_query(None);
		url.set_fragment(None);

		// `new` rejects cannot-be-a-base URLs, so the segments are always available.
		if let Ok(mut path) = url.path_segments_mut() {
			path.pop_if_empty().extend(segments);
		}

		url
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn endpoints_follow_the_servlet_layout() {
		let endpoints = JiraEndpoints::parse("https://jira.example.com")
			.expect("Base URL fixture should be accepted.");

		assert_eq!(
			endpoints.request_token().as_str(),
			"https://jira.example.com/plugins/servlet/oauth/request-token"
		);
		assert_eq!(
			endpoints.access_token().as_str(),
			"https://jira.example.com/plugins/servlet/oauth/access-token"
		);
		assert_eq!(
			endpoints.authorize("RT1").as_str(),
			"https://jira.example.com/plugins/servlet/oauth/authorize?oauth_token=RT1"
		);
	}

	#[test]
	fn context_paths_are_preserved() {
		let endpoints = JiraEndpoints::parse("https://example.com/jira/")
			.expect("Base URL with context path should be accepted.");

		assert_eq!(endpoints.issue("ABC-1").as_str(), "https://example.com/jira/rest/api/2/issue/ABC-1");
		assert_eq!(
			endpoints.board_sprints(7).as_str(),
			"https://example.com/jira/rest/agile/1.0/board/7/sprint"
		);
		assert_eq!(
			endpoints.sprint_issues(42).as_str(),
			"https://example.com/jira/rest/agile/1.0/sprint/42/issue"
		);
	}

	#[test]
	fn issue_keys_are_escaped_as_path_segments() {
		let endpoints = JiraEndpoints::parse("https://jira.example.com")
			.expect("Base URL fixture should be accepted.");

		assert_eq!(
			endpoints.issue("A/B C").as_str(),
			"https://jira.example.com/rest/api/2/issue/A%2FB%20C"
		);
	}

	#[test]
	fn unsupported_base_urls_are_rejected() {
		assert!(matches!(
			JiraEndpoints::parse("mailto:admin@example.com"),
			Err(ConfigError::UnsupportedBaseUrl { .. })
		));
		assert!(matches!(
			JiraEndpoints::parse("not a url"),
			Err(ConfigError::InvalidBaseUrl { .. })
		));
	}
}
