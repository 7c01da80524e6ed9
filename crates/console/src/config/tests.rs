use pretty_assertions::assert_eq;

use super::*;

#[test]
fn empty_input_is_all_defaults() {
	let config = EngineConfig::parse("").unwrap();
	assert_eq!(config, EngineConfig::default());
	assert_eq!(config.store.key_prefix, "campus:");
	assert_eq!(config.chart_interval(), Duration::from_secs(30));
	assert_eq!(config.remote_latency(), None);
}

#[test]
fn sections_override_individually() {
	let config = EngineConfig::parse(
		r#"
[store]
dir = "/srv/campus"
quota_bytes = 1024

[polling]
chart_interval_secs = 5
"#,
	)
	.unwrap();

	assert_eq!(config.store_dir().unwrap(), PathBuf::from("/srv/campus"));
	assert_eq!(config.store.key_prefix, "campus:");
	assert_eq!(config.store.quota_bytes, Some(1024));
	assert_eq!(config.chart_interval(), Duration::from_secs(5));
}

#[test]
fn zero_interval_is_clamped() {
	let config = EngineConfig::parse("[polling]\nchart_interval_secs = 0\n").unwrap();
	assert_eq!(config.chart_interval(), Duration::from_secs(1));
}

#[test]
fn unknown_keys_are_rejected() {
	assert!(EngineConfig::parse("[store]\nprefix = \"x\"\n").is_err());
}

#[test]
fn missing_file_loads_defaults() {
	let dir = tempfile::tempdir().unwrap();
	let config = EngineConfig::load(&dir.path().join("config.toml")).unwrap();
	assert_eq!(config, EngineConfig::default());
}

#[test]
fn parse_error_names_the_file() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("config.toml");
	std::fs::write(&path, "[remote]\nlatency_ms = \"fast\"\n").unwrap();

	let err = EngineConfig::load(&path).unwrap_err();
	assert!(matches!(err, ConfigError::Parse { .. }));
	assert!(err.to_string().contains("config.toml"), "got: {err}");
}
