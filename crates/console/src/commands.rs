//! Store inspection subcommands.

use std::sync::Arc;

use anyhow::Context;
use campus_primitives::{CacheEntry, ConfigName};
use campus_remote::MemoryRemote;
use campus_settings::domains::{AboutSectionDomain, ChartDomain, LogoDomain, SchoolMetaDomain, ThemeDomain};
use campus_settings::{CacheRegistry, SettingsController};
use campus_sink::SinkTable;
use campus_store::{ConfigStore, FileStore};

use crate::config::EngineConfig;

/// Opens the configured on-disk store behind a registry with no sinks and
/// an empty backend. Nothing here touches the network.
pub fn open_registry(config: &EngineConfig) -> anyhow::Result<CacheRegistry> {
	let dir = config.store_dir()?;
	let mut medium = FileStore::open(&dir).with_context(|| format!("opening store at {}", dir.display()))?;
	if let Some(quota) = config.store.quota_bytes {
		medium = medium.with_quota(quota);
	}
	let store = ConfigStore::with_prefix(Arc::new(medium), config.store.key_prefix.as_str());
	Ok(CacheRegistry::new(store, Arc::new(MemoryRemote::new()), SinkTable::new()))
}

/// Loads the entry for `name` through its domain so the value is backfilled
/// and checked exactly as a controller would see it.
pub fn load_entry(registry: &CacheRegistry, name: &ConfigName) -> anyhow::Result<CacheEntry> {
	match name {
		ConfigName::Theme => drop(SettingsController::new(registry, ThemeDomain)),
		ConfigName::SchoolMeta => drop(SettingsController::new(registry, SchoolMetaDomain)),
		ConfigName::Logo => drop(SettingsController::new(registry, LogoDomain)),
		ConfigName::ChartData => drop(SettingsController::new(registry, ChartDomain)),
		ConfigName::AboutSection(key) => drop(SettingsController::new(registry, AboutSectionDomain::new(key.as_str())?)),
	}
	registry.entry(name).with_context(|| format!("no entry for {name}"))
}

pub fn list(registry: &CacheRegistry) -> anyhow::Result<()> {
	let names = registry.store().names();
	if names.is_empty() {
		println!("(store is empty)");
		return Ok(());
	}
	for name in names {
		let entry = load_entry(registry, &name)?;
		println!("{:<28} {}", name.key(), entry.origin.as_str());
	}
	Ok(())
}

pub fn show(registry: &CacheRegistry, name: &ConfigName) -> anyhow::Result<()> {
	let entry = load_entry(registry, name)?;
	println!("{}", serde_json::to_string_pretty(&entry)?);
	Ok(())
}

pub fn clear(registry: &CacheRegistry, name: &ConfigName) -> anyhow::Result<()> {
	let existed = registry.store().get(name).is_some();
	registry.clear(name);
	if existed {
		println!("cleared {name}");
	} else {
		println!("{name} had no stored value");
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use campus_primitives::Origin;
	use campus_store::MemoryStore;
	use serde_json::json;

	use super::*;

	fn registry_with(records: &[(&ConfigName, serde_json::Value)]) -> CacheRegistry {
		let store = ConfigStore::new(Arc::new(MemoryStore::new()));
		for (name, value) in records {
			store.set(name, &value.clone().into());
		}
		CacheRegistry::new(store, Arc::new(MemoryRemote::new()), SinkTable::new())
	}

	#[test]
	fn load_entry_backfills_stored_records() {
		let registry = registry_with(&[(&ConfigName::Theme, json!({"primary": "#000000"}))]);
		let entry = load_entry(&registry, &ConfigName::Theme).unwrap();
		assert_eq!(entry.origin, Origin::Cached);
		assert_eq!(entry.value.field("/primary"), Some(&json!("#000000")));
		assert_eq!(entry.value.field("/accent"), Some(&json!("#F59E0B")));
	}

	#[test]
	fn load_entry_without_record_is_default() {
		let registry = registry_with(&[]);
		let name: ConfigName = "aboutSection:history".parse().unwrap();
		let entry = load_entry(&registry, &name).unwrap();
		assert_eq!(entry.origin, Origin::Default);
		assert_eq!(entry.value.field("/visible"), Some(&json!(true)));
	}

	#[test]
	fn clear_removes_record() {
		let registry = registry_with(&[(&ConfigName::Logo, json!({"url": "/a.png"}))]);
		clear(&registry, &ConfigName::Logo).unwrap();
		assert!(registry.store().get(&ConfigName::Logo).is_none());
	}
}
