//! Thread-safe in-memory [`CredentialStore`] for tests and demos.

// self
use crate::{
	_prelude::*,
	auth::AccessCredential,
	store::{CredentialStore, StoreFuture},
};

/// Keeps the credential in-process; clones share the same slot.
#[derive(Clone, Debug, Default)]
pub struct MemoryCredentialStore(Arc<RwLock<Option<AccessCredential>>>);
impl MemoryCredentialStore {
	/// Creates a store pre-populated with `credential`.
	pub fn with_credential(credential: AccessCredential) -> Self {
		Self(Arc::new(RwLock::new(Some(credential))))
	}

	/// Returns a copy of the stored credential without going through the async contract.
	pub fn snapshot(&self) -> Option<AccessCredential> {
		self.0.read().clone()
	}
}
impl CredentialStore for MemoryCredentialStore {
	fn save<'a>(&'a self, credential: &'a AccessCredential) -> StoreFuture<'a, ()> {
		let slot = self.0.clone();
		let credential = credential.to_owned();

		Box::pin(async move {
			*slot.write() = Some(credential);

			Ok(())
		})
	}

	fn load(&self) -> StoreFuture<'_, Option<AccessCredential>> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(slot.read().clone()) })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn save_replaces_and_clones_share_state() {
		let store = MemoryCredentialStore::default();
		let shared = store.clone();
		let first = AccessCredential::new("AT1", "ATS1", "CK1", "pem")
			.expect("Credential fixture should be valid.");
		let second = AccessCredential::new("AT2", "ATS2", "CK1", "pem")
			.expect("Credential fixture should be valid.");

		assert_eq!(store.load().await.expect("Empty store should load."), None);

		store.save(&first).await.expect("First save should succeed.");
		store.save(&second).await.expect("Second save should succeed.");

		assert_eq!(shared.snapshot(), Some(second));
	}
}
