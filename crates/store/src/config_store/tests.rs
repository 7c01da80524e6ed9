use pretty_assertions::assert_eq;
use serde_json::json;

use super::*;
use crate::MemoryStore;

fn store() -> (Arc<MemoryStore>, ConfigStore) {
	let medium = Arc::new(MemoryStore::new());
	let store = ConfigStore::with_prefix(medium.clone(), "campus:");
	(medium, store)
}

#[test]
fn set_then_get_round_trips_under_prefix() {
	let (medium, store) = store();
	let value = ConfigValue::new(json!({"primary": "#3B82F6"}));

	assert!(store.set(&ConfigName::Theme, &value));
	assert_eq!(store.get(&ConfigName::Theme), Some(value));
	assert_eq!(medium.keys(), vec!["campus:theme".to_string()]);
}

#[test]
fn corrupt_record_reads_as_missing() {
	let (medium, store) = store();
	medium.set_raw("campus:logo", "{not json").unwrap();
	assert_eq!(store.get(&ConfigName::Logo), None);
}

#[test]
fn unavailable_medium_reads_as_missing_and_drops_writes() {
	let (medium, store) = store();
	medium.set_available(false);
	assert_eq!(store.get(&ConfigName::Theme), None);
	assert!(!store.set(&ConfigName::Theme, &ConfigValue::new(json!({}))));
	store.remove(&ConfigName::Theme);
}

#[test]
fn quota_exceeded_drops_write_and_keeps_previous() {
	let medium = Arc::new(MemoryStore::with_quota(40));
	let store = ConfigStore::new(medium);
	let small = ConfigValue::new(json!({"url": "/a.png"}));
	let large = ConfigValue::new(json!({"url": "/a-very-long-logo-path-that-does-not-fit.png"}));

	assert!(store.set(&ConfigName::Logo, &small));
	assert!(!store.set(&ConfigName::Logo, &large));
	assert_eq!(store.get(&ConfigName::Logo), Some(small));
}

#[test]
fn names_lists_only_parseable_prefixed_keys() {
	let (medium, store) = store();
	store.set(&ConfigName::ChartData, &ConfigValue::new(json!({})));
	store.set(&ConfigName::AboutSection("mission".into()), &ConfigValue::new(json!({})));
	medium.set_raw("campus:bogus", "{}").unwrap();
	medium.set_raw("other:theme", "{}").unwrap();

	assert_eq!(
		store.names(),
		vec![ConfigName::AboutSection("mission".into()), ConfigName::ChartData]
	);
}

#[test]
fn writes_broadcast_to_forked_sessions() {
	let (_medium, store) = store();
	let other_tab = store.fork_session();
	let mut events = other_tab.storage_events();
	assert_ne!(store.session(), other_tab.session());

	let value = ConfigValue::new(json!({"websiteTitle": "Oak Hill"}));
	store.set(&ConfigName::SchoolMeta, &value);
	store.remove(&ConfigName::SchoolMeta);

	let first = events.try_recv().unwrap();
	assert_eq!(first.name, ConfigName::SchoolMeta);
	assert_eq!(first.value, Some(value));
	assert_eq!(first.session, store.session());
	let second = events.try_recv().unwrap();
	assert_eq!(second.value, None);
	assert!(other_tab.get(&ConfigName::SchoolMeta).is_none());
}

#[test]
fn dropped_writes_are_not_broadcast() {
	let (medium, store) = store();
	let mut events = store.storage_events();
	medium.set_available(false);
	store.set(&ConfigName::Theme, &ConfigValue::new(json!({})));
	assert!(events.try_recv().is_err());
}
