#![allow(dead_code)]

// std
use std::{
	env, fs,
	path::{Path, PathBuf},
	process,
	sync::atomic::{AtomicUsize, Ordering},
	time::Duration,
};
// crates.io
use httpmock::MockServer;
// self
use jira_oauth::{config::Config, url::Url};

pub const CONSUMER_KEY: &str = "CK1";
pub const PKCS8_PEM: &str = include_str!("../fixtures/rsa_pkcs8.pem");

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

pub fn key_path() -> PathBuf {
	Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/rsa_pkcs8.pem")
}

pub fn temp_credentials_path(tag: &str) -> PathBuf {
	let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);

	env::temp_dir().join(format!("jira_oauth_it_{tag}_{}_{id}.json", process::id()))
}

pub fn base_url(server: &MockServer) -> Url {
	Url::parse(&server.base_url()).expect("Mock server base URL should parse.")
}

pub fn config(server: &MockServer, tag: &str) -> Config {
	Config::builder(base_url(server), CONSUMER_KEY)
		.private_key_path(key_path())
		.credentials_path(temp_credentials_path(tag))
		.http_timeout(Duration::from_secs(5))
		.approval_timeout(Duration::from_secs(5))
		.build()
		.expect("Test configuration should build.")
}

pub fn expected_credential_json(access_token: &str, access_token_secret: &str) -> String {
	let key_cert = serde_json::to_string(PKCS8_PEM.trim())
		.expect("PEM fixture should serialize as a JSON string.");

	format!(
		"{{\"access_token\":\"{access_token}\",\"access_token_secret\":\"{access_token_secret}\",\"consumer_key\":\"{CONSUMER_KEY}\",\"key_cert\":{key_cert}}}"
	)
}

pub fn remove(path: &Path) {
	if path.exists() {
		fs::remove_file(path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary credential file {}: {e}", path.display())
		});
	}
}
