//! Three-legged OAuth 1.0a client for Jira.
//!
//! Requests are signed with RSA-SHA1, the user approves access out of band, the resulting
//! credential is persisted to a JSON file, and [`client::JiraClient`] issues signed read-only
//! queries with it. [`flows::CredentialSource`] ties these together: it prefers an injected
//! credential, then the credential file, and only then runs a handshake.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod flows;
pub mod http;
pub mod oauth1;
pub mod obs;
pub mod provider;
pub mod store;

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		path::{Path, PathBuf},
		pin::Pin,
		sync::Arc,
		time::Duration,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
