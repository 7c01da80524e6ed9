use super::*;

#[test]
fn keys_are_stable() {
	assert_eq!(ConfigName::Theme.key(), "theme");
	assert_eq!(ConfigName::SchoolMeta.key(), "schoolMeta");
	assert_eq!(ConfigName::Logo.key(), "logo");
	assert_eq!(ConfigName::ChartData.key(), "chartData");
	assert_eq!(ConfigName::AboutSection("mission".into()).key(), "aboutSection:mission");
}

#[test]
fn display_matches_key() {
	for name in [ConfigName::Theme, ConfigName::Logo, ConfigName::AboutSection("history".into())] {
		assert_eq!(name.to_string(), name.key());
	}
}

#[test]
fn parses_every_known_key() {
	assert_eq!("theme".parse(), Ok(ConfigName::Theme));
	assert_eq!("schoolMeta".parse(), Ok(ConfigName::SchoolMeta));
	assert_eq!("aboutSection:vision".parse(), Ok(ConfigName::AboutSection("vision".into())));
}

#[test]
fn rejects_unknown_and_empty_section() {
	assert_eq!("themes".parse::<ConfigName>(), Err(ConfigNameError::Unknown("themes".into())));
	assert_eq!("aboutSection:".parse::<ConfigName>(), Err(ConfigNameError::EmptySectionKey));
	assert_eq!(ConfigName::about_section("  "), Err(ConfigNameError::EmptySectionKey));
}

#[test]
fn domain_label_drops_section_key() {
	assert_eq!(ConfigName::AboutSection("x".into()).domain(), "aboutSection");
	assert_eq!(ConfigName::ChartData.domain(), "chartData");
}

#[test]
fn serde_uses_key_string() {
	let json = serde_json::to_string(&ConfigName::AboutSection("staff".into())).unwrap();
	assert_eq!(json, "\"aboutSection:staff\"");
	let back: ConfigName = serde_json::from_str(&json).unwrap();
	assert_eq!(back, ConfigName::AboutSection("staff".into()));
	assert!(serde_json::from_str::<ConfigName>("\"nope\"").is_err());
}
