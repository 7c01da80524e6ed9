use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[cfg(test)]
mod tests;

/// Opaque, JSON-serializable configuration record.
///
/// The engine never inspects the shape of a value beyond default backfill and
/// sink subfield lookup; typed views are produced at the domain edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigValue(Value);

impl ConfigValue {
	/// Wraps a raw JSON value.
	pub fn new(value: Value) -> Self {
		Self(value)
	}

	/// Serializes a typed record into an opaque value.
	pub fn from_typed<T: Serialize>(typed: &T) -> Result<Self, serde_json::Error> {
		serde_json::to_value(typed).map(Self)
	}

	/// Deserializes the value into a typed record.
	pub fn to_typed<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
		T::deserialize(&self.0)
	}

	/// Returns the underlying JSON.
	pub fn as_json(&self) -> &Value {
		&self.0
	}

	/// Consumes the wrapper and returns the underlying JSON.
	pub fn into_json(self) -> Value {
		self.0
	}

	/// Looks up a subfield by JSON pointer (`""` addresses the whole value).
	pub fn field(&self, pointer: &str) -> Option<&Value> {
		self.0.pointer(pointer)
	}

	/// Fills every field present in `defaults` but absent here.
	///
	/// Objects merge recursively and stored fields win. A stored `null` where
	/// the default is non-null counts as absent. Arrays and scalars are taken
	/// whole from whichever side is present; a non-object where the default is
	/// an object is replaced by the default. Returns the number of fields
	/// that were filled.
	pub fn backfill(&mut self, defaults: &ConfigValue) -> usize {
		backfill_value(&mut self.0, &defaults.0)
	}

	/// Consuming variant of [`Self::backfill`].
	pub fn backfilled(mut self, defaults: &ConfigValue) -> Self {
		self.backfill(defaults);
		self
	}

	/// Returns true when every default field path also exists here.
	pub fn covers(&self, defaults: &ConfigValue) -> bool {
		covers_value(&self.0, &defaults.0)
	}
}

impl From<Value> for ConfigValue {
	fn from(value: Value) -> Self {
		Self(value)
	}
}

fn backfill_value(stored: &mut Value, default: &Value) -> usize {
	match (stored, default) {
		(Value::Object(stored), Value::Object(default)) => {
			let mut filled = 0;
			for (key, default_field) in default {
				match stored.get_mut(key) {
					Some(field) => filled += backfill_value(field, default_field),
					None => {
						stored.insert(key.clone(), default_field.clone());
						filled += 1;
					}
				}
			}
			filled
		}
		(stored @ Value::Null, default) if !default.is_null() => {
			*stored = default.clone();
			1
		}
		(stored, default @ Value::Object(_)) => {
			*stored = default.clone();
			1
		}
		_ => 0,
	}
}

fn covers_value(stored: &Value, default: &Value) -> bool {
	match (stored, default) {
		(Value::Object(stored), Value::Object(default)) => default
			.iter()
			.all(|(key, field)| stored.get(key).is_some_and(|s| covers_value(s, field))),
		(Value::Null, default) => default.is_null(),
		(_, Value::Object(_)) => false,
		_ => true,
	}
}
