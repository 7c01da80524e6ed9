use campus_primitives::{ConfigName, ConfigNameError};
use serde::{Deserialize, Serialize};

use crate::{ConfigDomain, ValidationError};

/// One block of about-page content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AboutSection {
	pub title: String,
	/// Rich-text body as produced by the editor, stored verbatim.
	pub content: String,
	pub image_url: Option<String>,
	pub visible: bool,
}

impl Default for AboutSection {
	fn default() -> Self {
		Self {
			title: String::new(),
			content: String::new(),
			image_url: None,
			visible: true,
		}
	}
}

/// The `aboutSection:<key>` domain for one section key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AboutSectionDomain {
	key: String,
}

impl AboutSectionDomain {
	pub fn new(key: impl Into<String>) -> Result<Self, ConfigNameError> {
		let key = key.into();
		ConfigName::about_section(key.as_str())?;
		Ok(Self { key })
	}

	pub fn key(&self) -> &str {
		&self.key
	}
}

impl ConfigDomain for AboutSectionDomain {
	type Value = AboutSection;

	fn name(&self) -> ConfigName {
		ConfigName::AboutSection(self.key.clone())
	}

	fn validate(&self, value: &AboutSection) -> Result<(), ValidationError> {
		if value.visible && value.title.trim().is_empty() {
			return Err(ValidationError::new("title", "visible sections need a title"));
		}
		Ok(())
	}
}
