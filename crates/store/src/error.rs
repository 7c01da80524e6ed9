//! Error types for the raw storage medium.

use std::path::PathBuf;

use thiserror::Error;

/// Failures reported by a [`crate::DurableStore`] medium.
///
/// None of these reach callers of [`crate::ConfigStore`]; they are logged and
/// degraded to a cache miss or a dropped write.
#[derive(Debug, Error)]
pub enum StoreError {
	/// The write would push the medium past its byte quota.
	#[error("storage quota exceeded: {needed} bytes needed, quota is {quota}")]
	QuotaExceeded {
		/// Total bytes the medium would hold after the write.
		needed: usize,
		/// Configured byte quota.
		quota: usize,
	},

	/// The medium is disabled or otherwise not accepting operations.
	#[error("storage medium unavailable")]
	Unavailable,

	/// Reading or writing a backing file failed.
	#[error("I/O error on {path}: {error}")]
	Io {
		/// Backing file path.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},
}
