//! Remote source adapter boundary.
//!
//! The backend is an external collaborator: the engine only needs "fetch
//! configuration X" and "save configuration X and tell me the canonical
//! value". Nothing on the render path waits on this trait.

mod error;
mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use campus_primitives::{ConfigName, ConfigValue};

pub use error::{GENERIC_SAVE_FAILURE, RemoteError};
pub use memory::{MemoryRemote, RemoteOp};

/// Async access to the authoritative configuration backend.
#[async_trait]
pub trait RemoteSource: Send + Sync {
	/// Fetches the authoritative value for `name`.
	///
	/// Fails on any non-success status or transport failure.
	async fn fetch_config(&self, name: &ConfigName) -> Result<ConfigValue, RemoteError>;

	/// Submits `value` for `name` and returns the backend-confirmed canonical
	/// value, which may differ from the submitted candidate.
	async fn save_config(&self, name: &ConfigName, value: ConfigValue) -> Result<ConfigValue, RemoteError>;
}

#[async_trait]
impl<T: RemoteSource + ?Sized> RemoteSource for Arc<T> {
	async fn fetch_config(&self, name: &ConfigName) -> Result<ConfigValue, RemoteError> {
		(**self).fetch_config(name).await
	}

	async fn save_config(&self, name: &ConfigName, value: ConfigValue) -> Result<ConfigValue, RemoteError> {
		(**self).save_config(name, value).await
	}
}
