use campus_primitives::ConfigName;
use serde::{Deserialize, Serialize};

use crate::{ConfigDomain, ValidationError};

const MAX_TITLE_CHARS: usize = 120;

/// School metadata shown across the public site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SchoolMeta {
	/// Document title of every public page.
	pub website_title: String,
	pub school_name: String,
	pub tagline: String,
	pub address: String,
	pub phone: String,
	pub email: String,
}

impl Default for SchoolMeta {
	fn default() -> Self {
		Self {
			website_title: "School Website".into(),
			school_name: String::new(),
			tagline: String::new(),
			address: String::new(),
			phone: String::new(),
			email: String::new(),
		}
	}
}

/// The `schoolMeta` domain.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchoolMetaDomain;

impl ConfigDomain for SchoolMetaDomain {
	type Value = SchoolMeta;

	fn name(&self) -> ConfigName {
		ConfigName::SchoolMeta
	}

	fn validate(&self, value: &SchoolMeta) -> Result<(), ValidationError> {
		let title = value.website_title.trim();
		if title.is_empty() {
			return Err(ValidationError::new("websiteTitle", "must not be empty"));
		}
		if title.chars().count() > MAX_TITLE_CHARS {
			return Err(ValidationError::new("websiteTitle", format!("must be at most {MAX_TITLE_CHARS} characters")));
		}
		if !value.email.is_empty() && !looks_like_email(&value.email) {
			return Err(ValidationError::new("email", format!("{:?} is not an email address", value.email)));
		}
		Ok(())
	}
}

fn looks_like_email(s: &str) -> bool {
	match s.split_once('@') {
		Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.'),
		None => false,
	}
}
