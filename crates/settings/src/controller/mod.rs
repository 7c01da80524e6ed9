use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use campus_bus::Subscription;
use campus_primitives::{CacheEntry, ConfigName, ConfigValue, Origin};
use campus_remote::RemoteError;
use campus_sink::SinkReport;
use campus_worker::{PollHandle, TaskClass};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::registry::EntrySlot;
use crate::{CacheRegistry, ConfigDomain, SaveError, SettingsError};


/// Result of one background refresh.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
	/// The fetched value was committed; carries the sink results.
	Updated(SinkReport),
	/// The fetch failed or returned something undecodable. Nothing changed.
	Failed(RemoteError),
}

impl RefreshOutcome {
	pub fn is_updated(&self) -> bool {
		matches!(self, Self::Updated(_))
	}
}

struct Draft<T> {
	value: T,
	dirty: bool,
}

struct ControllerInner<D: ConfigDomain> {
	domain: D,
	name: ConfigName,
	registry: CacheRegistry,
	slot: Arc<EntrySlot>,
	draft: Arc<Mutex<Draft<D::Value>>>,
	_draft_sync: Subscription,
}

/// Typed view over one cache entry plus an edit buffer.
///
/// Construction is synchronous and never touches the network, so the value
/// is render-ready immediately. Clones share the same draft.
pub struct SettingsController<D: ConfigDomain> {
	inner: Arc<ControllerInner<D>>,
}

impl<D: ConfigDomain> Clone for SettingsController<D> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<D: ConfigDomain> fmt::Debug for SettingsController<D> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SettingsController")
			.field("name", &self.inner.name)
			.field("origin", &self.origin())
			.field("dirty", &self.is_dirty())
			.finish_non_exhaustive()
	}
}

fn encode<T: Serialize>(name: &ConfigName, value: &T) -> ConfigValue {
	ConfigValue::from_typed(value).unwrap_or_else(|error| {
		tracing::error!(%name, %error, "value does not serialize to JSON");
		ConfigValue::new(serde_json::Value::Null)
	})
}

impl<D: ConfigDomain> SettingsController<D> {
	/// Binds a controller for `domain` to `registry`, creating the entry from
	/// the durable store if this is the first controller for its name.
	pub fn new(registry: &CacheRegistry, domain: D) -> Self {
		let name = domain.name();
		let default = encode(&name, &D::Value::default());
		let slot = registry.slot(
			&name,
			default,
			Box::new(|value: &ConfigValue| value.to_typed::<D::Value>().is_ok()),
		);

		let current = slot.snapshot().value.to_typed::<D::Value>().unwrap_or_default();
		let draft = Arc::new(Mutex::new(Draft {
			value: current,
			dirty: false,
		}));

		let weak = Arc::downgrade(&draft);
		let draft_sync = registry.bus().subscribe(name.clone(), move |value| {
			let Some(draft) = weak.upgrade() else {
				return;
			};
			let Ok(typed) = value.to_typed::<D::Value>() else {
				return;
			};
			let mut draft = draft.lock();
			if !draft.dirty {
				draft.value = typed;
			}
		});

		Self {
			inner: Arc::new(ControllerInner {
				domain,
				name,
				registry: registry.clone(),
				slot,
				draft,
				_draft_sync: draft_sync,
			}),
		}
	}

	pub fn name(&self) -> &ConfigName {
		&self.inner.name
	}

	pub fn domain(&self) -> &D {
		&self.inner.domain
	}

	pub fn registry(&self) -> &CacheRegistry {
		&self.inner.registry
	}

	/// Current entry with its typed value.
	pub fn entry(&self) -> CacheEntry<D::Value> {
		self.inner.slot.snapshot().map(|value| value.to_typed().unwrap_or_default())
	}

	/// Current committed value.
	pub fn current(&self) -> D::Value {
		self.entry().value
	}

	pub fn origin(&self) -> Origin {
		self.inner.slot.snapshot().origin
	}

	/// Backfills a raw remote value and decodes it for this domain.
	fn decode(&self, raw: ConfigValue) -> Result<(ConfigValue, D::Value), RemoteError> {
		let value = raw.backfilled(self.inner.slot.default_value());
		let typed = value.to_typed::<D::Value>().map_err(|err| RemoteError::Decode(err.to_string()))?;
		Ok((value, typed))
	}

	/// Fetches the authoritative value and commits it on success.
	///
	/// Failures are logged and leave the entry untouched; the caller keeps
	/// rendering whatever it already has.
	pub async fn refresh(&self) -> RefreshOutcome {
		let name = &self.inner.name;
		let fetched = match self.inner.registry.remote().fetch_config(name).await {
			Ok(value) => value,
			Err(error) => {
				tracing::warn!(%name, %error, "refresh failed, keeping current value");
				return RefreshOutcome::Failed(error);
			}
		};
		let (value, typed) = match self.decode(fetched) {
			Ok(decoded) => decoded,
			Err(error) => {
				tracing::warn!(%name, %error, "refresh returned undecodable value");
				return RefreshOutcome::Failed(error);
			}
		};
		if let Err(error) = self.inner.domain.validate(&typed) {
			tracing::warn!(%name, %error, "backend value fails local validation, accepting it anyway");
		}
		let report = self.inner.registry.commit_fresh(&self.inner.slot, value);
		tracing::debug!(%name, applied = report.applied, "refresh committed");
		RefreshOutcome::Updated(report)
	}

	/// Runs [`Self::refresh`] as a background task.
	pub fn spawn_refresh(&self) -> JoinHandle<RefreshOutcome> {
		let this = self.clone();
		campus_worker::spawn(TaskClass::Background, "refresh", async move { this.refresh().await })
	}

	/// Returns a copy of the edit buffer.
	pub fn draft(&self) -> D::Value {
		self.inner.draft.lock().value.clone()
	}

	/// Returns true when the draft holds edits not yet saved.
	pub fn is_dirty(&self) -> bool {
		self.inner.draft.lock().dirty
	}

	/// Modifies the edit buffer. A dirty draft no longer follows published
	/// values until it is saved or discarded.
	pub fn edit(&self, f: impl FnOnce(&mut D::Value)) {
		let mut draft = self.inner.draft.lock();
		f(&mut draft.value);
		draft.dirty = true;
	}

	/// Throws away unsaved edits and reloads the committed value.
	pub fn discard_draft(&self) {
		let current = self.current();
		let mut draft = self.inner.draft.lock();
		draft.value = current;
		draft.dirty = false;
	}

	/// Saves the edit buffer. See [`Self::save_value`].
	pub async fn save(&self) -> Result<D::Value, SaveError> {
		let candidate = self.draft();
		self.save_value(candidate).await
	}

	/// Runs [`Self::save`] as a task, for callers that cannot await in place.
	pub fn spawn_save(&self) -> JoinHandle<Result<D::Value, SaveError>> {
		let this = self.clone();
		campus_worker::spawn(TaskClass::Interactive, "save", async move { this.save().await })
	}

	/// Sends `candidate` to the backend and commits the value it confirms.
	///
	/// The commit happens only after the backend accepts, and subscribers
	/// have seen the new value by the time this returns. On error nothing
	/// local changes and the draft keeps the user's input.
	pub async fn save_value(&self, candidate: D::Value) -> Result<D::Value, SaveError> {
		let name = &self.inner.name;
		if D::READ_ONLY {
			return Err(SaveError::ReadOnly(name.clone()));
		}
		self.inner.domain.validate(&candidate)?;

		let payload = encode(name, &candidate);
		let confirmed = match self.inner.registry.remote().save_config(name, payload).await {
			Ok(value) => value,
			Err(error) => {
				tracing::warn!(%name, %error, "save rejected");
				return Err(error.into());
			}
		};
		let (value, typed) = self.decode(confirmed).inspect_err(|error| {
			tracing::warn!(%name, %error, "save response undecodable");
		})?;

		let report = self.inner.registry.commit_fresh(&self.inner.slot, value);
		if !report.is_clean() {
			tracing::debug!(%name, failed = report.failed.len(), "saved with sink failures");
		}

		let mut draft = self.inner.draft.lock();
		draft.value = typed.clone();
		draft.dirty = false;
		drop(draft);

		tracing::info!(%name, "settings saved");
		Ok(typed)
	}

	/// Subscribes `handler` to every committed value for this name.
	/// Values that do not decode for the domain are skipped.
	pub fn subscribe(&self, handler: impl Fn(&D::Value) + Send + Sync + 'static) -> Subscription {
		let name = self.inner.name.clone();
		self.inner.registry.bus().subscribe(name.clone(), move |value| match value.to_typed::<D::Value>() {
			Ok(typed) => handler(&typed),
			Err(error) => tracing::warn!(%name, %error, "published value does not decode, skipped"),
		})
	}

	/// Refreshes every `period` until the returned handle is dropped.
	/// Only domains that opt into polling accept this.
	pub fn start_polling(&self, period: Duration) -> Result<PollHandle, SettingsError> {
		if !D::POLLING {
			return Err(SettingsError::PollingUnsupported(self.inner.name.clone()));
		}
		if period.is_zero() {
			return Err(SettingsError::ZeroPollingPeriod);
		}
		let this = self.clone();
		Ok(campus_worker::spawn_poll(
			self.inner.name.domain(),
			period,
			self.inner.registry.polls(),
			move || {
				let this = this.clone();
				async move {
					this.refresh().await;
				}
			},
		))
	}

	/// Drops the stored record and returns to the compiled-in default.
	pub fn clear(&self) {
		self.inner.registry.clear(&self.inner.name);
		self.discard_draft();
	}
}
