use campus_primitives::ConfigName;
use serde::{Deserialize, Serialize};

use crate::{ConfigDomain, ValidationError};

/// Named color slots applied to the whole site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThemeColors {
	pub primary: String,
	pub secondary: String,
	pub accent: String,
	pub background: String,
	pub surface: String,
	pub text: String,
}

impl Default for ThemeColors {
	fn default() -> Self {
		Self {
			primary: "#3B82F6".into(),
			secondary: "#1E40AF".into(),
			accent: "#F59E0B".into(),
			background: "#FFFFFF".into(),
			surface: "#F3F4F6".into(),
			text: "#111827".into(),
		}
	}
}

impl ThemeColors {
	fn slots(&self) -> [(&'static str, &str); 6] {
		[
			("primary", self.primary.as_str()),
			("secondary", self.secondary.as_str()),
			("accent", self.accent.as_str()),
			("background", self.background.as_str()),
			("surface", self.surface.as_str()),
			("text", self.text.as_str()),
		]
	}
}

/// Returns true for `#RGB` and `#RRGGBB` hex colors.
pub fn is_hex_color(s: &str) -> bool {
	let Some(hex) = s.strip_prefix('#') else {
		return false;
	};
	matches!(hex.len(), 3 | 6) && hex.bytes().all(|b| b.is_ascii_hexdigit())
}

/// The `theme` domain.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThemeDomain;

impl ConfigDomain for ThemeDomain {
	type Value = ThemeColors;

	fn name(&self) -> ConfigName {
		ConfigName::Theme
	}

	fn validate(&self, value: &ThemeColors) -> Result<(), ValidationError> {
		for (slot, color) in value.slots() {
			if !is_hex_color(color) {
				return Err(ValidationError::new(slot, format!("{color:?} is not a hex color")));
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn hex_colors() {
		assert!(is_hex_color("#3B82F6"));
		assert!(is_hex_color("#fff"));
		assert!(!is_hex_color("3B82F6"));
		assert!(!is_hex_color("#3B82F"));
		assert!(!is_hex_color("#GGGGGG"));
	}

	#[test]
	fn defaults_validate() {
		assert_eq!(ThemeDomain.validate(&ThemeColors::default()), Ok(()));
	}

	#[test]
	fn rejects_bad_slot_by_name() {
		let colors = ThemeColors {
			accent: "orange".into(),
			..ThemeColors::default()
		};
		let err = ThemeDomain.validate(&colors).unwrap_err();
		assert_eq!(err.field, "accent");
	}

	#[test]
	fn partial_json_fills_from_defaults() {
		let colors: ThemeColors = serde_json::from_str(r##"{"primary": "#111111"}"##).unwrap();
		assert_eq!(colors.primary, "#111111");
		assert_eq!(colors.text, ThemeColors::default().text);
	}
}
