//! File-backed [`CredentialStore`] that writes the flat JSON credential file.

// std
use std::{
	fs::{self, File},
	io::{ErrorKind, Write},
};
// self
use crate::{
	_prelude::*,
	auth::AccessCredential,
	store::{CredentialStore, StoreError, StoreFuture},
};

/// Persists the credential as a single JSON object, replacing the file on every save.
#[derive(Clone, Debug)]
pub struct FileCredentialStore {
	path: PathBuf,
}
impl FileCredentialStore {
	/// Points the store at `path`; nothing is read or created until first use.
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	/// Location of the credential file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn read_now(&self) -> Result<Option<AccessCredential>, StoreError> {
		let bytes = match fs::read(&self.path) {
			Ok(bytes) => bytes,
			Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
			Err(e) =>
				return Err(StoreError::Backend {
					message: format!("Failed to read {}: {e}", self.path.display()),
				}),
		};
		let deserializer = &mut serde_json::Deserializer::from_slice(&bytes);
		let credential: AccessCredential =
			serde_path_to_error::deserialize(deserializer).map_err(|e| {
				StoreError::Serialization {
					message: format!("Failed to parse {}: {e}", self.path.display()),
				}
			})?;

		credential.validate().map_err(|e| StoreError::Invalid { message: e.to_string() })?;

		Ok(Some(credential))
	}

	fn write_now(&self, credential: &AccessCredential) -> Result<(), StoreError> {
		if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create credential directory {}: {e}", parent.display()),
			})?;
		}

		let serialized = serde_json::to_vec(credential).map_err(|e| StoreError::Serialization {
			message: format!("Failed to serialize credential: {e}"),
		})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			restrict_permissions(&file, &tmp_path)?;
			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}
}
impl CredentialStore for FileCredentialStore {
	fn save<'a>(&'a self, credential: &'a AccessCredential) -> StoreFuture<'a, ()> {
		Box::pin(async move { self.write_now(credential) })
	}

	fn load(&self) -> StoreFuture<'_, Option<AccessCredential>> {
		Box::pin(async move { self.read_now() })
	}
}

#[cfg(unix)]
fn restrict_permissions(file: &File, path: &Path) -> Result<(), StoreError> {
	use std::os::unix::fs::PermissionsExt;

	file.set_permissions(fs::Permissions::from_mode(0o600)).map_err(|e| StoreError::Backend {
		message: format!("Failed to restrict permissions on {}: {e}", path.display()),
	})
}
#[cfg(not(unix))]
fn restrict_permissions(_file: &File, _path: &Path) -> Result<(), StoreError> {
	Ok(())
}
