//! Resolves a Jira credential (environment, credential file, or an interactive handshake) and
//! fetches one issue with it.
//!
//! ```sh
//! JIRA_HOST=https://jira.example.com JIRA_CONS_KEY=my-consumer \
//!     cargo run --example handshake -- PROJ-123
//! ```

// std
use std::{env, sync::Arc};
// crates.io
use color_eyre::Result;
// self
use jira_oauth::{
	client::JiraClient,
	config::Config,
	flows::{ConsoleApproval, CredentialSource},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let config = Config::from_env()?;
	let source = CredentialSource::new(config.clone(), Arc::new(ConsoleApproval))?;
	let resolved = source.resolve().await?;

	println!("Using the credential from the {} source.", resolved.origin);

	let Some(issue_key) = env::args().nth(1) else {
		println!("Pass an issue key to fetch it, for example `PROJ-123`.");

		return Ok(());
	};
	let client = JiraClient::new(&config, resolved.credential)?;
	let issue = client.issue(&issue_key).await?;

	println!("{}", serde_json::to_string_pretty(&issue)?);

	Ok(())
}
