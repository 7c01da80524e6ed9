//! Error types for settings operations.

use campus_primitives::ConfigName;
use campus_remote::RemoteError;
use thiserror::Error;

use crate::ValidationError;

/// A user-initiated save that did not reach the cache.
///
/// When this is returned nothing local changed: the store, the cache entry,
/// and subscribers all still hold the previous value, and the controller's
/// draft still holds the user's input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaveError {
	/// The candidate failed client-side validation and was never sent.
	#[error("invalid value: {0}")]
	Invalid(#[from] ValidationError),

	/// The backend rejected the save or could not be reached.
	#[error(transparent)]
	Remote(#[from] RemoteError),

	/// The domain does not accept writes.
	#[error("{0} is read-only")]
	ReadOnly(ConfigName),
}

impl SaveError {
	/// Message for the blocking notification shown to the user.
	pub fn user_message(&self) -> String {
		match self {
			Self::Invalid(err) => err.to_string(),
			Self::Remote(err) => err.user_message().to_string(),
			Self::ReadOnly(name) => format!("{name} cannot be edited"),
		}
	}
}

/// Misuse of a controller API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
	#[error("{0} does not support polling")]
	PollingUnsupported(ConfigName),

	#[error("polling period must be non-zero")]
	ZeroPollingPeriod,
}
