//! Operator configuration read from `config.toml`.
//!
//! ```toml
//! [store]
//! dir = "/var/lib/campus/store"
//! key_prefix = "campus:"
//! quota_bytes = 5242880
//!
//! [remote]
//! latency_ms = 0
//!
//! [polling]
//! chart_interval_secs = 30
//! ```
//!
//! Every key is optional. A missing file yields the defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

#[cfg(test)]
mod tests;

const DEFAULT_KEY_PREFIX: &str = "campus:";
const DEFAULT_CHART_INTERVAL_SECS: u64 = 30;

/// Errors loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("I/O error reading {path}: {error}")]
	Io { path: PathBuf, error: std::io::Error },

	#[error("invalid config {path}: {error}")]
	Parse { path: PathBuf, error: toml::de::Error },

	#[error("no platform data directory; set [store] dir")]
	NoDataDir,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
	pub store: StoreSection,
	pub remote: RemoteSection,
	pub polling: PollingSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreSection {
	/// Directory holding one JSON file per record.
	pub dir: Option<PathBuf>,
	pub key_prefix: String,
	pub quota_bytes: Option<usize>,
}

impl Default for StoreSection {
	fn default() -> Self {
		Self {
			dir: None,
			key_prefix: DEFAULT_KEY_PREFIX.into(),
			quota_bytes: None,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RemoteSection {
	/// Artificial latency of the simulated backend.
	pub latency_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PollingSection {
	pub chart_interval_secs: u64,
}

impl Default for PollingSection {
	fn default() -> Self {
		Self {
			chart_interval_secs: DEFAULT_CHART_INTERVAL_SECS,
		}
	}
}

impl EngineConfig {
	/// Platform config location, e.g. `~/.config/campus/config.toml`.
	pub fn default_path() -> Option<PathBuf> {
		dirs::config_dir().map(|dir| dir.join("campus").join("config.toml"))
	}

	pub fn parse(input: &str) -> Result<Self, toml::de::Error> {
		toml::from_str(input)
	}

	/// Reads `path`, falling back to defaults when it does not exist.
	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let input = match std::fs::read_to_string(path) {
			Ok(input) => input,
			Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
				tracing::debug!(path = %path.display(), "no config file, using defaults");
				return Ok(Self::default());
			}
			Err(error) => {
				return Err(ConfigError::Io {
					path: path.to_path_buf(),
					error,
				});
			}
		};
		Self::parse(&input).map_err(|error| ConfigError::Parse {
			path: path.to_path_buf(),
			error,
		})
	}

	/// Resolved store directory.
	pub fn store_dir(&self) -> Result<PathBuf, ConfigError> {
		match &self.store.dir {
			Some(dir) => Ok(dir.clone()),
			None => dirs::data_local_dir()
				.map(|dir| dir.join("campus").join("store"))
				.ok_or(ConfigError::NoDataDir),
		}
	}

	pub fn remote_latency(&self) -> Option<Duration> {
		(self.remote.latency_ms > 0).then(|| Duration::from_millis(self.remote.latency_ms))
	}

	/// Chart polling period; zero is clamped to one second.
	pub fn chart_interval(&self) -> Duration {
		Duration::from_secs(self.polling.chart_interval_secs.max(1))
	}
}
