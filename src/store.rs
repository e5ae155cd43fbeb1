//! Storage contracts and built-in stores for the access credential.

pub mod file;
pub mod memory;

pub use file::FileCredentialStore;
pub use memory::MemoryCredentialStore;

// self
use crate::{_prelude::*, auth::AccessCredential};

/// Boxed future returned by [`CredentialStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract for the single long-lived credential.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Replaces any previously stored credential.
	fn save<'a>(&'a self, credential: &'a AccessCredential) -> StoreFuture<'a, ()>;

	/// Loads the stored credential, returning `None` when nothing was saved yet.
	fn load(&self) -> StoreFuture<'_, Option<AccessCredential>>;
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure (unreadable or unwritable storage).
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
	/// A stored credential failed field validation.
	#[error("Stored credential is invalid: {message}.")]
	Invalid {
		/// Human-readable error payload.
		message: String,
	},
}
