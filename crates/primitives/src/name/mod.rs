use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[cfg(test)]
mod tests;

const ABOUT_SECTION_PREFIX: &str = "aboutSection:";

/// Stable identifier for one configuration domain.
///
/// The key string is shared by the durable store, the propagation bus, and
/// the remote source, so it must never change once released.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConfigName {
	/// Named color slots used by the site theme.
	Theme,
	/// School metadata (website title, contact fields).
	SchoolMeta,
	/// Uploaded school logo reference.
	Logo,
	/// One about-page section, addressed by its section key.
	AboutSection(String),
	/// Statistics panel data.
	ChartData,
}

/// Failure to parse a [`ConfigName`] from its key string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigNameError {
	#[error("unknown configuration name: {0:?}")]
	Unknown(String),
	#[error("about section key must not be empty")]
	EmptySectionKey,
}

impl ConfigName {
	/// Builds an about-section name, rejecting empty section keys.
	pub fn about_section(key: impl Into<String>) -> Result<Self, ConfigNameError> {
		let key = key.into();
		if key.trim().is_empty() {
			return Err(ConfigNameError::EmptySectionKey);
		}
		Ok(Self::AboutSection(key))
	}

	/// Returns the stable key string.
	pub fn key(&self) -> String {
		self.to_string()
	}

	/// Returns the key for names that do not carry a payload.
	const fn static_key(&self) -> Option<&'static str> {
		match self {
			Self::Theme => Some("theme"),
			Self::SchoolMeta => Some("schoolMeta"),
			Self::Logo => Some("logo"),
			Self::ChartData => Some("chartData"),
			Self::AboutSection(_) => None,
		}
	}

	/// Returns the domain label without any payload, used as a log field.
	pub const fn domain(&self) -> &'static str {
		match self {
			Self::AboutSection(_) => "aboutSection",
			other => match other.static_key() {
				Some(key) => key,
				None => "",
			},
		}
	}
}

impl fmt::Display for ConfigName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::AboutSection(section) => write!(f, "{ABOUT_SECTION_PREFIX}{section}"),
			other => f.write_str(other.static_key().unwrap_or_default()),
		}
	}
}

impl FromStr for ConfigName {
	type Err = ConfigNameError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"theme" => Ok(Self::Theme),
			"schoolMeta" => Ok(Self::SchoolMeta),
			"logo" => Ok(Self::Logo),
			"chartData" => Ok(Self::ChartData),
			other => match other.strip_prefix(ABOUT_SECTION_PREFIX) {
				Some(section) => Self::about_section(section),
				None => Err(ConfigNameError::Unknown(other.to_string())),
			},
		}
	}
}

impl Serialize for ConfigName {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for ConfigName {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let raw = String::deserialize(deserializer)?;
		raw.parse().map_err(serde::de::Error::custom)
	}
}
