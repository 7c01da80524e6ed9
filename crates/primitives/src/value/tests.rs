use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;

use super::*;

#[test]
fn backfill_fills_missing_top_level_fields() {
	let defaults = ConfigValue::new(json!({"primary": "#3B82F6", "accent": "#F59E0B"}));
	let mut stored = ConfigValue::new(json!({"primary": "#111111"}));

	assert_eq!(stored.backfill(&defaults), 1);
	assert_eq!(stored.as_json(), &json!({"primary": "#111111", "accent": "#F59E0B"}));
}

#[test]
fn backfill_recurses_into_nested_objects() {
	let defaults = ConfigValue::new(json!({"contact": {"phone": "", "email": ""}, "title": "School"}));
	let stored = ConfigValue::new(json!({"contact": {"email": "office@school.edu"}}));

	let merged = stored.backfilled(&defaults);
	assert_eq!(
		merged.as_json(),
		&json!({"contact": {"phone": "", "email": "office@school.edu"}, "title": "School"})
	);
}

#[test]
fn backfill_treats_null_as_absent() {
	let defaults = ConfigValue::new(json!({"url": "/logo.png"}));
	let merged = ConfigValue::new(json!({"url": null})).backfilled(&defaults);
	assert_eq!(merged.field("/url"), Some(&json!("/logo.png")));
}

#[test]
fn backfill_keeps_stored_arrays_whole() {
	let defaults = ConfigValue::new(json!({"labels": ["a", "b", "c"]}));
	let merged = ConfigValue::new(json!({"labels": ["x"]})).backfilled(&defaults);
	assert_eq!(merged.field("/labels"), Some(&json!(["x"])));
}

#[test]
fn backfill_replaces_non_object_root() {
	let defaults = ConfigValue::new(json!({"primary": "#3B82F6"}));
	let merged = ConfigValue::new(json!("garbage")).backfilled(&defaults);
	assert_eq!(merged, defaults);
}

#[test]
fn field_lookup_uses_json_pointer() {
	let value = ConfigValue::new(json!({"logo": {"url": "/a.png"}}));
	assert_eq!(value.field("/logo/url"), Some(&json!("/a.png")));
	assert_eq!(value.field(""), Some(value.as_json()));
	assert_eq!(value.field("/missing"), None);
}

#[test]
fn typed_conversion_round_trips_through_json() {
	#[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
	struct Meta {
		title: String,
	}

	let value = ConfigValue::from_typed(&Meta { title: "Oak Hill".into() }).unwrap();
	assert_eq!(value.as_json(), &json!({"title": "Oak Hill"}));
	assert_eq!(value.to_typed::<Meta>().unwrap(), Meta { title: "Oak Hill".into() });
}

fn arb_json() -> impl Strategy<Value = serde_json::Value> {
	let leaf = prop_oneof![
		Just(serde_json::Value::Null),
		any::<bool>().prop_map(serde_json::Value::from),
		any::<i32>().prop_map(serde_json::Value::from),
		"[a-z#0-9]{0,6}".prop_map(serde_json::Value::from),
	];
	leaf.prop_recursive(3, 16, 4, |inner| {
		prop_oneof![
			prop::collection::vec(inner.clone(), 0..3).prop_map(serde_json::Value::from),
			prop::collection::btree_map("[a-d]", inner, 0..4)
				.prop_map(|m| serde_json::Value::Object(m.into_iter().collect())),
		]
	})
}

proptest! {
	#[test]
	fn backfilled_value_always_covers_defaults(stored in arb_json(), defaults in arb_json()) {
		let defaults = ConfigValue::new(defaults);
		let merged = ConfigValue::new(stored).backfilled(&defaults);
		prop_assert!(merged.covers(&defaults));
	}

	#[test]
	fn backfill_is_idempotent(stored in arb_json(), defaults in arb_json()) {
		let defaults = ConfigValue::new(defaults);
		let once = ConfigValue::new(stored).backfilled(&defaults);
		let mut twice = once.clone();
		prop_assert_eq!(twice.backfill(&defaults), 0);
		prop_assert_eq!(twice, once);
	}
}
