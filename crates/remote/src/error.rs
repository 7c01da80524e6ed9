//! Remote failure taxonomy.

use thiserror::Error;

/// Message shown when a failed save carries no usable server message.
pub const GENERIC_SAVE_FAILURE: &str = "Failed to save changes. Please try again.";

/// Failure reported by a [`crate::RemoteSource`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
	/// The backend answered with a non-success status.
	#[error("backend returned HTTP {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
	Status {
		/// HTTP status code.
		status: u16,
		/// Server-provided message, if the body carried one.
		message: Option<String>,
	},

	/// The request never produced a response.
	#[error("transport failure: {0}")]
	Transport(String),

	/// The response could not be decoded into a configuration value.
	#[error("malformed backend response: {0}")]
	Decode(String),
}

impl RemoteError {
	/// Builds a status error, extracting the server message from a JSON
	/// error body (`message`, then `error`) or using a non-empty plain body.
	pub fn from_status_body(status: u16, body: &str) -> Self {
		let message = match serde_json::from_str::<serde_json::Value>(body) {
			Ok(json) => ["message", "error"]
				.iter()
				.find_map(|key| json.get(key).and_then(|v| v.as_str()))
				.map(str::to_string),
			Err(_) => Some(body.trim().to_string()),
		}
		.filter(|m| !m.trim().is_empty());
		Self::Status { status, message }
	}

	/// Returns the HTTP status, if the backend answered.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Status { status, .. } => Some(*status),
			_ => None,
		}
	}

	/// Returns the server-provided message, if any.
	pub fn server_message(&self) -> Option<&str> {
		match self {
			Self::Status { message, .. } => message.as_deref(),
			_ => None,
		}
	}

	/// Message suitable for a blocking user notification.
	pub fn user_message(&self) -> &str {
		self.server_message().unwrap_or(GENERIC_SAVE_FAILURE)
	}
}
