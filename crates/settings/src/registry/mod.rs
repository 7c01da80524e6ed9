use std::fmt;
use std::sync::{Arc, Weak};

use campus_bus::PropagationBus;
use campus_primitives::{CacheEntry, ConfigName, ConfigValue};
use campus_remote::RemoteSource;
use campus_sink::{SinkReport, SinkTable};
use campus_store::{ConfigStore, SessionId, StorageEvent};
use campus_worker::{GenerationClock, TaskClass};
use parking_lot::{Mutex, ReentrantMutex, RwLock};
use rustc_hash::FxHashMap as HashMap;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;


pub(crate) type Acceptor = Box<dyn Fn(&ConfigValue) -> bool + Send + Sync>;

/// Registry-owned state for one configuration name.
///
/// The slot outlives every controller and subscriber for its name, so a
/// refresh that completes after its consumers are gone still lands here.
pub(crate) struct EntrySlot {
	name: ConfigName,
	entry: RwLock<CacheEntry>,
	/// Held across store write, entry update, publish and sink apply so the
	/// durable record and what consumers saw never disagree. Reentrant
	/// because a subscriber may clear its own name.
	commit: ReentrantMutex<()>,
	default: ConfigValue,
	accepts: Acceptor,
}

impl EntrySlot {
	pub(crate) fn snapshot(&self) -> CacheEntry {
		self.entry.read().clone()
	}

	pub(crate) fn default_value(&self) -> &ConfigValue {
		&self.default
	}

	/// Backfills `value` from the default and checks it decodes for the
	/// slot's domain.
	pub(crate) fn normalize(&self, value: ConfigValue) -> Option<ConfigValue> {
		let value = value.backfilled(&self.default);
		(self.accepts)(&value).then_some(value)
	}
}

struct RegistryInner {
	store: ConfigStore,
	bus: PropagationBus,
	sinks: SinkTable,
	remote: Arc<dyn RemoteSource>,
	slots: Mutex<HashMap<ConfigName, Arc<EntrySlot>>>,
	polls: GenerationClock,
}

/// Session-wide owner of the durable store, bus, sinks, remote source, and
/// every cache entry. Create one at application start and hand clones to
/// controllers.
#[derive(Clone)]
pub struct CacheRegistry {
	inner: Arc<RegistryInner>,
}

impl fmt::Debug for CacheRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CacheRegistry")
			.field("session", &self.inner.store.session())
			.field("entries", &self.inner.slots.lock().len())
			.finish_non_exhaustive()
	}
}

impl CacheRegistry {
	pub fn new(store: ConfigStore, remote: Arc<dyn RemoteSource>, sinks: SinkTable) -> Self {
		Self {
			inner: Arc::new(RegistryInner {
				store,
				bus: PropagationBus::new(),
				sinks,
				remote,
				slots: Mutex::new(HashMap::default()),
				polls: GenerationClock::new(),
			}),
		}
	}

	pub fn bus(&self) -> &PropagationBus {
		&self.inner.bus
	}

	pub fn store(&self) -> &ConfigStore {
		&self.inner.store
	}

	pub fn sinks(&self) -> &SinkTable {
		&self.inner.sinks
	}

	pub fn session(&self) -> SessionId {
		self.inner.store.session()
	}

	pub(crate) fn remote(&self) -> &Arc<dyn RemoteSource> {
		&self.inner.remote
	}

	pub(crate) fn polls(&self) -> &GenerationClock {
		&self.inner.polls
	}

	/// Returns the current entry for `name`, if a controller ever created it.
	pub fn entry(&self, name: &ConfigName) -> Option<CacheEntry> {
		self.inner.slots.lock().get(name).map(|slot| slot.snapshot())
	}

	/// Names with a live entry, sorted.
	pub fn names(&self) -> Vec<ConfigName> {
		let mut names: Vec<_> = self.inner.slots.lock().keys().cloned().collect();
		names.sort();
		names
	}

	/// Returns the slot for `name`, creating it from the durable store on
	/// first use. Creation is synchronous and never touches the network.
	///
	/// A new slot is `Cached` when the store holds a record that decodes for
	/// the domain, `Default` otherwise. Its value is pushed into the sinks
	/// so the document reflects it before any refresh.
	pub(crate) fn slot(&self, name: &ConfigName, default: ConfigValue, accepts: Acceptor) -> Arc<EntrySlot> {
		let mut slots = self.inner.slots.lock();
		if let Some(slot) = slots.get(name) {
			return Arc::clone(slot);
		}

		let stored = self.inner.store.get(name).map(|v| v.backfilled(&default));
		let entry = match stored {
			Some(value) if accepts(&value) => CacheEntry::with_cached(name.clone(), value),
			Some(_) => {
				tracing::warn!(%name, "stored value does not fit domain, using default");
				CacheEntry::with_default(name.clone(), default.clone())
			}
			None => CacheEntry::with_default(name.clone(), default.clone()),
		};
		tracing::debug!(%name, origin = entry.origin.as_str(), "cache entry created");

		let initial = entry.value.clone();
		let slot = Arc::new(EntrySlot {
			name: name.clone(),
			entry: RwLock::new(entry),
			commit: ReentrantMutex::new(()),
			default,
			accepts,
		});
		slots.insert(name.clone(), Arc::clone(&slot));
		let commit = slot.commit.lock();
		drop(slots);

		self.inner.sinks.apply(name, &initial);
		drop(commit);
		slot
	}

	/// Commits a value confirmed by the remote source: durable store, then
	/// entry, then bus, then sinks.
	pub(crate) fn commit_fresh(&self, slot: &EntrySlot, value: ConfigValue) -> SinkReport {
		let name = &slot.name;
		let _commit = slot.commit.lock();
		self.inner.store.set(name, &value);
		slot.entry.write().mark_fresh(value.clone(), chrono::Utc::now());
		self.inner.bus.publish(name.clone(), value.clone());
		self.inner.sinks.apply(name, &value)
	}

	/// Removes the stored record for `name` and returns its entry to the
	/// compiled-in default, notifying subscribers and sinks.
	pub fn clear(&self, name: &ConfigName) {
		let slot = self.inner.slots.lock().get(name).cloned();
		let Some(slot) = slot else {
			self.inner.store.remove(name);
			return;
		};
		let _commit = slot.commit.lock();
		self.inner.store.remove(name);
		self.reset_slot(name, &slot);
	}

	fn reset_slot(&self, name: &ConfigName, slot: &EntrySlot) {
		let _commit = slot.commit.lock();
		let default = slot.default.clone();
		slot.entry.write().reset(default.clone());
		self.inner.bus.publish(name.clone(), default.clone());
		self.inner.sinks.apply(name, &default);
	}

	/// Applies a storage write made by another session sharing the medium.
	/// Returns false when the event was ignored.
	fn adopt_external(&self, event: StorageEvent) -> bool {
		if event.session == self.session() {
			return false;
		}
		let slot = self.inner.slots.lock().get(&event.name).cloned();
		let Some(slot) = slot else {
			return false;
		};
		let name = event.name;
		match event.value {
			None => self.reset_slot(&name, &slot),
			Some(value) => {
				let Some(value) = slot.normalize(value) else {
					tracing::warn!(%name, "ignoring external value that does not fit domain");
					return false;
				};
				let _commit = slot.commit.lock();
				slot.entry.write().adopt(value.clone());
				self.inner.bus.publish(name.clone(), value.clone());
				self.inner.sinks.apply(&name, &value);
			}
		}
		tracing::debug!(%name, "adopted storage write from another session");
		true
	}

	/// Starts following storage writes from other sessions. Best effort:
	/// events dropped while lagging are not replayed.
	pub fn follow_storage(&self) -> StorageFollower {
		let mut events = self.inner.store.storage_events();
		let weak: Weak<RegistryInner> = Arc::downgrade(&self.inner);
		let task = campus_worker::spawn(TaskClass::Background, "storage-follower", async move {
			loop {
				let event = match events.recv().await {
					Ok(event) => event,
					Err(RecvError::Lagged(skipped)) => {
						tracing::warn!(skipped, "storage follower lagged, events lost");
						continue;
					}
					Err(RecvError::Closed) => break,
				};
				let Some(inner) = weak.upgrade() else {
					break;
				};
				CacheRegistry { inner }.adopt_external(event);
			}
		});
		StorageFollower { task }
	}
}

/// Handle for [`CacheRegistry::follow_storage`]; dropping it stops following.
#[derive(Debug)]
pub struct StorageFollower {
	task: JoinHandle<()>,
}

impl Drop for StorageFollower {
	fn drop(&mut self) {
		self.task.abort();
	}
}
