use std::fmt;
use std::sync::Arc;

use campus_primitives::{ConfigName, ConfigValue};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::DurableStore;

#[cfg(test)]
mod tests;

const EVENT_BUFFER: usize = 64;

/// Identifies one in-process session sharing a storage medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
	/// Creates a random session id.
	pub fn new() -> Self {
		Self(Uuid::new_v4())
	}
}

impl Default for SessionId {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Display for SessionId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.0.fmt(f)
	}
}

/// Best-effort notification of a storage write, shaped after the browser
/// `storage` event. `value` is `None` for removals.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageEvent {
	pub name: ConfigName,
	pub value: Option<ConfigValue>,
	pub session: SessionId,
}

/// JSON facade over a [`DurableStore`] implementing the never-fail contract.
///
/// Corrupt or unreadable records read as absent. Failed writes are dropped.
/// Both are logged at `warn` and never reach the caller.
#[derive(Clone)]
pub struct ConfigStore {
	medium: Arc<dyn DurableStore>,
	prefix: Arc<str>,
	session: SessionId,
	events: broadcast::Sender<StorageEvent>,
}

impl fmt::Debug for ConfigStore {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ConfigStore")
			.field("prefix", &self.prefix)
			.field("session", &self.session)
			.finish_non_exhaustive()
	}
}

impl ConfigStore {
	/// Creates a facade over `medium` with no key prefix.
	pub fn new(medium: Arc<dyn DurableStore>) -> Self {
		Self::with_prefix(medium, "")
	}

	/// Creates a facade whose records are stored under `prefix` + name key.
	pub fn with_prefix(medium: Arc<dyn DurableStore>, prefix: impl Into<Arc<str>>) -> Self {
		let (events, _) = broadcast::channel(EVENT_BUFFER);
		Self {
			medium,
			prefix: prefix.into(),
			session: SessionId::new(),
			events,
		}
	}

	/// Returns a facade over the same medium and event channel acting as a
	/// different session, the way a second browser tab shares `localStorage`.
	pub fn fork_session(&self) -> Self {
		Self {
			session: SessionId::new(),
			..self.clone()
		}
	}

	/// Returns this facade's session id.
	pub fn session(&self) -> SessionId {
		self.session
	}

	/// Subscribes to storage writes from every session sharing the medium.
	pub fn storage_events(&self) -> broadcast::Receiver<StorageEvent> {
		self.events.subscribe()
	}

	fn key(&self, name: &ConfigName) -> String {
		format!("{}{}", self.prefix, name.key())
	}

	/// Reads the stored value for `name`.
	pub fn get(&self, name: &ConfigName) -> Option<ConfigValue> {
		let key = self.key(name);
		let raw = match self.medium.get_raw(&key) {
			Ok(Some(raw)) => raw,
			Ok(None) => return None,
			Err(error) => {
				tracing::warn!(%name, %error, "store read failed, treating as cache miss");
				return None;
			}
		};
		match serde_json::from_str(&raw) {
			Ok(value) => Some(value),
			Err(error) => {
				tracing::warn!(%name, %error, "corrupt store record, treating as cache miss");
				None
			}
		}
	}

	/// Writes `value` for `name`. Returns whether the write landed.
	pub fn set(&self, name: &ConfigName, value: &ConfigValue) -> bool {
		let raw = match serde_json::to_string(value) {
			Ok(raw) => raw,
			Err(error) => {
				tracing::warn!(%name, %error, "failed to serialize value, write dropped");
				return false;
			}
		};
		if let Err(error) = self.medium.set_raw(&self.key(name), &raw) {
			tracing::warn!(%name, %error, "store write dropped");
			return false;
		}
		self.notify(name, Some(value.clone()));
		true
	}

	/// Removes the record for `name`.
	pub fn remove(&self, name: &ConfigName) {
		if let Err(error) = self.medium.remove(&self.key(name)) {
			tracing::warn!(%name, %error, "store remove failed");
			return;
		}
		self.notify(name, None);
	}

	/// Lists configuration names that currently have a record under this
	/// facade's prefix. Keys that do not parse as a name are skipped.
	pub fn names(&self) -> Vec<ConfigName> {
		self.medium
			.keys()
			.iter()
			.filter_map(|key| key.strip_prefix(&*self.prefix))
			.filter_map(|key| key.parse().ok())
			.collect()
	}

	fn notify(&self, name: &ConfigName, value: Option<ConfigValue>) {
		// No receivers is the common case and not an error.
		let _ = self.events.send(StorageEvent {
			name: name.clone(),
			value,
			session: self.session,
		});
	}
}
