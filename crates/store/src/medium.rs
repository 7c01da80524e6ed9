use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use rustc_hash::FxHashMap as HashMap;

use crate::StoreError;

/// Synchronous string key/value medium.
///
/// Implementations must keep reads in memory: `get_raw` is called on the
/// render path and may never block on disk or network.
pub trait DurableStore: Send + Sync {
	/// Returns the raw record for `key`, if any.
	fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError>;

	/// Stores `raw` under `key`, replacing any previous record.
	fn set_raw(&self, key: &str, raw: &str) -> Result<(), StoreError>;

	/// Removes the record for `key`. Removing a missing key is not an error.
	fn remove(&self, key: &str) -> Result<(), StoreError>;

	/// Returns every key currently held, sorted.
	fn keys(&self) -> Vec<String>;
}

/// Returns the byte total a map would hold after replacing `key` with `raw`.
pub(crate) fn bytes_after_write(entries: &HashMap<String, String>, key: &str, raw: &str) -> usize {
	let current: usize = entries
		.iter()
		.filter(|(k, _)| k.as_str() != key)
		.map(|(k, v)| k.len() + v.len())
		.sum();
	current + key.len() + raw.len()
}

pub(crate) fn check_quota(entries: &HashMap<String, String>, quota: Option<usize>, key: &str, raw: &str) -> Result<(), StoreError> {
	let Some(quota) = quota else {
		return Ok(());
	};
	let needed = bytes_after_write(entries, key, raw);
	if needed > quota {
		return Err(StoreError::QuotaExceeded { needed, quota });
	}
	Ok(())
}

pub(crate) fn sorted_keys(entries: &HashMap<String, String>) -> Vec<String> {
	let mut keys: Vec<_> = entries.keys().cloned().collect();
	keys.sort();
	keys
}

/// Process-local medium with an optional byte quota.
#[derive(Debug)]
pub struct MemoryStore {
	entries: RwLock<HashMap<String, String>>,
	quota: Option<usize>,
	available: AtomicBool,
}

impl Default for MemoryStore {
	fn default() -> Self {
		Self::new()
	}
}

impl MemoryStore {
	/// Creates an empty, unbounded store.
	pub fn new() -> Self {
		Self {
			entries: RwLock::new(HashMap::default()),
			quota: None,
			available: AtomicBool::new(true),
		}
	}

	/// Creates an empty store that rejects writes past `quota` bytes.
	pub fn with_quota(quota: usize) -> Self {
		Self {
			quota: Some(quota),
			..Self::new()
		}
	}

	/// Toggles availability. An unavailable store fails every operation,
	/// like storage disabled by browser privacy settings.
	pub fn set_available(&self, available: bool) {
		self.available.store(available, Ordering::Release);
	}

	fn ensure_available(&self) -> Result<(), StoreError> {
		if self.available.load(Ordering::Acquire) {
			Ok(())
		} else {
			Err(StoreError::Unavailable)
		}
	}
}

impl DurableStore for MemoryStore {
	fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
		self.ensure_available()?;
		Ok(self.entries.read().get(key).cloned())
	}

	fn set_raw(&self, key: &str, raw: &str) -> Result<(), StoreError> {
		self.ensure_available()?;
		let mut entries = self.entries.write();
		check_quota(&entries, self.quota, key, raw)?;
		entries.insert(key.to_string(), raw.to_string());
		Ok(())
	}

	fn remove(&self, key: &str) -> Result<(), StoreError> {
		self.ensure_available()?;
		self.entries.write().remove(key);
		Ok(())
	}

	fn keys(&self) -> Vec<String> {
		if self.ensure_available().is_err() {
			return Vec::new();
		}
		sorted_keys(&self.entries.read())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn set_get_remove() {
		let store = MemoryStore::new();
		store.set_raw("theme", "{}").unwrap();
		assert_eq!(store.get_raw("theme").unwrap().as_deref(), Some("{}"));
		store.remove("theme").unwrap();
		assert_eq!(store.get_raw("theme").unwrap(), None);
		store.remove("theme").unwrap();
	}

	#[test]
	fn quota_counts_replacement_not_accumulation() {
		let store = MemoryStore::with_quota(12);
		store.set_raw("logo", "12345678").unwrap();
		store.set_raw("logo", "abcdefgh").unwrap();
		let err = store.set_raw("logo", "123456789").unwrap_err();
		assert!(matches!(err, StoreError::QuotaExceeded { needed: 13, quota: 12 }));
		assert_eq!(store.get_raw("logo").unwrap().as_deref(), Some("abcdefgh"));
	}

	#[test]
	fn unavailable_store_fails_every_operation() {
		let store = MemoryStore::new();
		store.set_raw("theme", "{}").unwrap();
		store.set_available(false);
		assert!(matches!(store.get_raw("theme"), Err(StoreError::Unavailable)));
		assert!(matches!(store.set_raw("theme", "[]"), Err(StoreError::Unavailable)));
		assert!(store.keys().is_empty());
		store.set_available(true);
		assert_eq!(store.keys(), vec!["theme".to_string()]);
	}
}
