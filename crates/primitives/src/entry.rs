use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ConfigName, ConfigValue};

/// Wall-clock instant recorded when an entry becomes fresh.
pub type Timestamp = DateTime<Utc>;

/// Provenance of the value currently held by a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
	/// Compiled-in default; nothing was found in the durable store.
	Default,
	/// Loaded from a previous session's durable store record.
	Cached,
	/// Confirmed by the remote source (fetch or save) during this session.
	Fresh,
}

impl Origin {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Default => "default",
			Self::Cached => "cached",
			Self::Fresh => "fresh",
		}
	}
}

/// Last-known value for one configuration name plus its provenance.
///
/// Entries are only ever overwritten in place. `origin` moves forward from
/// `Default` to `Cached` to `Fresh` and only returns to `Default` through
/// [`CacheEntry::reset`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<V = ConfigValue> {
	pub name: ConfigName,
	pub value: V,
	pub origin: Origin,
	pub last_updated: Option<Timestamp>,
}

impl<V> CacheEntry<V> {
	/// Creates an entry holding the compiled-in default.
	pub fn with_default(name: ConfigName, value: V) -> Self {
		Self {
			name,
			value,
			origin: Origin::Default,
			last_updated: None,
		}
	}

	/// Creates an entry holding a value recovered from the durable store.
	pub fn with_cached(name: ConfigName, value: V) -> Self {
		Self {
			name,
			value,
			origin: Origin::Cached,
			last_updated: None,
		}
	}

	/// Records a value confirmed by the remote source.
	pub fn mark_fresh(&mut self, value: V, at: Timestamp) {
		self.value = value;
		self.origin = Origin::Fresh;
		self.last_updated = Some(at);
	}

	/// Records a value adopted from another session's storage write.
	///
	/// A `Default` entry becomes `Cached`; a `Fresh` entry stays `Fresh`.
	pub fn adopt(&mut self, value: V) {
		self.value = value;
		if self.origin == Origin::Default {
			self.origin = Origin::Cached;
		}
	}

	/// Returns the entry to its compiled-in default after an explicit clear.
	pub fn reset(&mut self, default: V) {
		self.value = default;
		self.origin = Origin::Default;
		self.last_updated = None;
	}

	/// Maps the held value, keeping provenance.
	pub fn map<U>(self, f: impl FnOnce(V) -> U) -> CacheEntry<U> {
		CacheEntry {
			name: self.name,
			value: f(self.value),
			origin: self.origin,
			last_updated: self.last_updated,
		}
	}

	/// Returns true when the value has been confirmed by the remote source.
	pub fn is_fresh(&self) -> bool {
		self.origin == Origin::Fresh
	}
}

#[cfg(test)]
mod tests {
	use chrono::TimeZone;
	use serde_json::json;

	use super::*;

	fn at(secs: i64) -> Timestamp {
		Utc.timestamp_opt(secs, 0).single().unwrap()
	}

	#[test]
	fn fresh_is_sticky_across_adoption() {
		let mut entry = CacheEntry::with_default(ConfigName::Theme, 1);
		entry.adopt(2);
		assert_eq!(entry.origin, Origin::Cached);

		entry.mark_fresh(3, at(10));
		entry.adopt(4);
		assert_eq!(entry.origin, Origin::Fresh);
		assert_eq!(entry.value, 4);
		assert_eq!(entry.last_updated, Some(at(10)));
	}

	#[test]
	fn reset_returns_to_default() {
		let mut entry = CacheEntry::with_cached(ConfigName::Logo, "cached");
		entry.mark_fresh("fresh", at(5));
		entry.reset("default");
		assert_eq!(entry, CacheEntry::with_default(ConfigName::Logo, "default"));
	}

	#[test]
	fn serializes_origin_lowercase() {
		let entry = CacheEntry::with_cached(ConfigName::ChartData, ConfigValue::new(json!({})));
		let json = serde_json::to_value(&entry).unwrap();
		assert_eq!(json["origin"], "cached");
		assert_eq!(json["name"], "chartData");
		assert_eq!(json["lastUpdated"], serde_json::Value::Null);
	}

	#[test]
	fn origin_order_tracks_freshness() {
		assert!(Origin::Default < Origin::Cached);
		assert!(Origin::Cached < Origin::Fresh);
		assert_eq!(Origin::Fresh.as_str(), "fresh");
	}
}
