//! Scripted console session against the in-process backend.
//!
//! Walks through the lifecycle an admin page goes through: render from
//! cache, background refresh, a successful save, a rejected save, and
//! optionally a few chart polling ticks. Document state is printed after
//! each step.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use campus_primitives::{ConfigName, ConfigValue};
use campus_remote::{MemoryRemote, RemoteError, RemoteOp};
use campus_settings::domains::{
	ChartDomain, ChartSeries, ChartStats, LogoDomain, SchoolMeta, SchoolMetaDomain, ThemeColors, ThemeDomain,
};
use campus_settings::{CacheRegistry, SettingsController};
use campus_sink::{MemoryDocument, SinkTable};
use campus_store::{ConfigStore, MemoryStore};

use crate::config::EngineConfig;

fn seed(remote: &MemoryRemote) -> anyhow::Result<()> {
	let theme = ThemeColors {
		primary: "#0F766E".into(),
		accent: "#EAB308".into(),
		..ThemeColors::default()
	};
	let meta = SchoolMeta {
		website_title: "Riverside Academy".into(),
		school_name: "Riverside Academy".into(),
		email: "office@riverside.example".into(),
		..SchoolMeta::default()
	};
	let chart = ChartStats {
		labels: vec!["Mon".into(), "Tue".into(), "Wed".into()],
		series: vec![ChartSeries {
			name: "visits".into(),
			values: vec![120.0, 98.0, 143.0],
		}],
		generated_at: None,
	};
	remote.insert(ConfigName::Theme, ConfigValue::from_typed(&theme)?);
	remote.insert(ConfigName::SchoolMeta, ConfigValue::from_typed(&meta)?);
	remote.insert(ConfigName::ChartData, ConfigValue::from_typed(&chart)?);
	Ok(())
}

fn print_document(step: &str, doc: &MemoryDocument) -> anyhow::Result<()> {
	println!("== {step}");
	println!("{}", serde_json::to_string_pretty(&doc.snapshot())?);
	Ok(())
}

/// Time to wait for `ticks` polls to land, with half a period of slack.
fn poll_wait(period: Duration, ticks: u32) -> anyhow::Result<Duration> {
	period
		.checked_mul(ticks)
		.and_then(|total| total.checked_add(period / 2))
		.with_context(|| format!("{ticks} polls of {period:?} overflow the timer"))
}

pub async fn run(config: &EngineConfig, poll_ticks: u32) -> anyhow::Result<()> {
	let mut remote = MemoryRemote::new();
	if let Some(latency) = config.remote_latency() {
		remote = remote.with_latency(latency);
	}
	seed(&remote)?;
	let remote = Arc::new(remote);

	let doc = Arc::new(MemoryDocument::with_favicon_links());
	let store = ConfigStore::with_prefix(Arc::new(MemoryStore::new()), config.store.key_prefix.as_str());
	let registry = CacheRegistry::new(store, remote.clone(), SinkTable::standard(doc.clone()));

	let theme = SettingsController::new(&registry, ThemeDomain);
	let meta = SettingsController::new(&registry, SchoolMetaDomain);
	let logo = SettingsController::new(&registry, LogoDomain);
	let chart = SettingsController::new(&registry, ChartDomain);
	print_document("rendered from defaults", &doc)?;

	let (theme_refresh, meta_refresh, logo_refresh) = tokio::join!(theme.refresh(), meta.refresh(), logo.refresh());
	for (name, outcome) in [("theme", theme_refresh), ("schoolMeta", meta_refresh), ("logo", logo_refresh)] {
		if !outcome.is_updated() {
			println!("{name}: refresh failed, still showing {:?}", registry.entry(&name.parse::<ConfigName>()?).map(|e| e.origin));
		}
	}
	print_document("after background refresh", &doc)?;

	logo.edit(|l| {
		l.url = "/uploads/riverside-crest.png".into();
		l.original_name = "riverside-crest.png".into();
		l.formatted_size = "18.2 KB".into();
	});
	logo.save().await.context("saving logo")?;
	print_document("after logo save", &doc)?;

	remote.fail_next(
		RemoteOp::Save,
		ConfigName::SchoolMeta,
		RemoteError::from_status_body(422, r#"{"message":"Website title is reserved"}"#),
	);
	meta.edit(|m| m.website_title = "Admin".into());
	match meta.save().await {
		Ok(_) => println!("schoolMeta: unexpected save success"),
		Err(err) => println!("schoolMeta: save rejected: {}", err.user_message()),
	}
	println!("schoolMeta: committed title still {:?}, draft {:?}", meta.current().website_title, meta.draft().website_title);
	meta.discard_draft();

	if poll_ticks > 0 {
		let period = config.chart_interval();
		let wait = poll_wait(period, poll_ticks)?;
		let poll = chart.start_polling(period)?;
		tokio::time::sleep(wait).await;
		println!("chart: {} fetches, visits total {:?}", remote.fetch_count(), chart.current().total("visits"));
		if let Some(panic) = poll.shutdown().await {
			anyhow::bail!("chart polling panicked: {panic}");
		}
	} else {
		chart.refresh().await;
		println!("chart: visits total {:?}", chart.current().total("visits"));
	}

	for name in registry.names() {
		if let Some(entry) = registry.entry(&name) {
			println!("{:<28} {}", name.key(), entry.origin.as_str());
		}
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn poll_wait_adds_half_a_period() {
		assert_eq!(poll_wait(Duration::from_secs(30), 3).unwrap(), Duration::from_secs(105));
	}

	#[test]
	fn poll_wait_rejects_overflow() {
		assert!(poll_wait(Duration::MAX, 2).is_err());
	}
}
