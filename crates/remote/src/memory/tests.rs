use serde_json::json;

use super::*;

fn theme(primary: &str) -> ConfigValue {
	ConfigValue::new(json!({ "primary": primary }))
}

#[tokio::test]
async fn fetch_unknown_name_is_not_found() {
	let remote = MemoryRemote::new();
	let err = remote.fetch_config(&ConfigName::Theme).await.unwrap_err();
	assert_eq!(err.status(), Some(404));
	assert_eq!(remote.fetch_count(), 1);
}

#[tokio::test]
async fn save_then_fetch_returns_saved_value() {
	let remote = MemoryRemote::new();
	let saved = remote.save_config(&ConfigName::Theme, theme("#111111")).await.unwrap();
	assert_eq!(saved, theme("#111111"));
	assert_eq!(remote.fetch_config(&ConfigName::Theme).await.unwrap(), theme("#111111"));
	assert_eq!(remote.save_count(), 1);
}

#[tokio::test]
async fn scripted_failure_is_one_shot_and_scoped() {
	let remote = MemoryRemote::new();
	remote.insert(ConfigName::Theme, theme("#222222"));
	remote.fail_next(RemoteOp::Fetch, ConfigName::Theme, RemoteError::Transport("reset".into()));

	assert!(remote.fetch_config(&ConfigName::Logo).await.is_err());
	assert_eq!(
		remote.fetch_config(&ConfigName::Theme).await,
		Err(RemoteError::Transport("reset".into()))
	);
	assert_eq!(remote.fetch_config(&ConfigName::Theme).await, Ok(theme("#222222")));
}

#[tokio::test]
async fn failed_save_does_not_store() {
	let remote = MemoryRemote::new();
	remote.fail_next(RemoteOp::Save, ConfigName::Logo, RemoteError::from_status_body(422, r#"{"message":"too big"}"#));
	let err = remote.save_config(&ConfigName::Logo, theme("x")).await.unwrap_err();
	assert_eq!(err.user_message(), "too big");
	assert_eq!(remote.value(&ConfigName::Logo), None);
}

#[tokio::test]
async fn offline_fails_everything_until_restored() {
	let remote = MemoryRemote::new();
	remote.insert(ConfigName::Theme, theme("#333333"));
	remote.set_offline(true);
	assert!(matches!(remote.fetch_config(&ConfigName::Theme).await, Err(RemoteError::Transport(_))));
	remote.set_offline(false);
	assert!(remote.fetch_config(&ConfigName::Theme).await.is_ok());
}

#[tokio::test]
async fn canonicalize_rewrites_saved_value() {
	let remote = MemoryRemote::new().with_canonicalize(|_, value| {
		let mut json = value.into_json();
		json["primary"] = json["primary"].as_str().unwrap_or_default().to_uppercase().into();
		ConfigValue::new(json)
	});
	let saved = remote.save_config(&ConfigName::Theme, theme("#abcdef")).await.unwrap();
	assert_eq!(saved, theme("#ABCDEF"));
	assert_eq!(remote.value(&ConfigName::Theme), Some(theme("#ABCDEF")));
}

#[tokio::test(start_paused = true)]
async fn latency_delays_response() {
	let remote = MemoryRemote::new().with_latency(Duration::from_secs(5));
	remote.insert(ConfigName::Theme, theme("#444444"));
	let started = tokio::time::Instant::now();
	remote.fetch_config(&ConfigName::Theme).await.unwrap();
	assert!(started.elapsed() >= Duration::from_secs(5));
}
