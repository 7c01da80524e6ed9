use std::fmt;

use campus_primitives::ConfigName;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Client-side rejection of a candidate value before it is sent anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
	pub field: String,
	pub reason: String,
}

impl ValidationError {
	pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
		Self {
			field: field.into(),
			reason: reason.into(),
		}
	}
}

/// One configuration domain: its name, typed value, and rules.
///
/// `Value::default()` is the compiled-in default. Its serialized field set is
/// what stored and fetched values are backfilled against, so every field
/// should carry `#[serde(default)]`.
pub trait ConfigDomain: Send + Sync + 'static {
	type Value: Serialize + DeserializeOwned + Clone + PartialEq + Default + fmt::Debug + Send + Sync + 'static;

	/// Whether callers may attach a polling loop to this domain.
	const POLLING: bool = false;

	/// Whether the domain is fetched only and never saved.
	const READ_ONLY: bool = false;

	/// Stable name used as store key and bus topic.
	fn name(&self) -> ConfigName;

	/// Checks a candidate before phase one of a save.
	fn validate(&self, _value: &Self::Value) -> Result<(), ValidationError> {
		Ok(())
	}
}
