use campus_primitives::{ConfigName, Timestamp};
use serde::{Deserialize, Serialize};

use crate::{ConfigDomain, ValidationError};

/// Reference to the uploaded school logo. The upload itself happens
/// elsewhere; this record only carries where it ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LogoInfo {
	pub url: String,
	pub original_name: String,
	/// Human-readable size as reported by the backend (e.g. `"24.5 KB"`).
	pub formatted_size: String,
	pub uploaded_at: Option<Timestamp>,
}

impl Default for LogoInfo {
	fn default() -> Self {
		Self {
			url: "/images/logo.png".into(),
			original_name: String::new(),
			formatted_size: String::new(),
			uploaded_at: None,
		}
	}
}

/// The `logo` domain.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogoDomain;

impl ConfigDomain for LogoDomain {
	type Value = LogoInfo;

	fn name(&self) -> ConfigName {
		ConfigName::Logo
	}

	fn validate(&self, value: &LogoInfo) -> Result<(), ValidationError> {
		let url = value.url.trim();
		if url.is_empty() {
			return Err(ValidationError::new("url", "must not be empty"));
		}
		if !(url.starts_with('/') || url.starts_with("https://") || url.starts_with("http://")) {
			return Err(ValidationError::new("url", "must be site-relative or http(s)"));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn url_rules() {
		let mut logo = LogoInfo::default();
		assert!(LogoDomain.validate(&logo).is_ok());
		logo.url = "https://cdn.example.org/logo.svg".into();
		assert!(LogoDomain.validate(&logo).is_ok());
		logo.url = "ftp://x/logo.png".into();
		assert!(LogoDomain.validate(&logo).is_err());
		logo.url = " ".into();
		assert!(LogoDomain.validate(&logo).is_err());
	}

	#[test]
	fn uploaded_at_round_trips_as_rfc3339() {
		let logo: LogoInfo = serde_json::from_str(r#"{"url": "/new.png", "uploadedAt": "2026-03-01T08:30:00Z"}"#).unwrap();
		assert_eq!(logo.url, "/new.png");
		assert_eq!(logo.uploaded_at.map(|t| t.to_rfc3339()), Some("2026-03-01T08:30:00+00:00".to_string()));
		assert_eq!(logo.original_name, "");
	}
}
