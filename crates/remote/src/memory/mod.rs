use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use campus_primitives::{ConfigName, ConfigValue};
use parking_lot::Mutex;
use rustc_hash::FxHashMap as HashMap;

use crate::{RemoteError, RemoteSource};

#[cfg(test)]
mod tests;

type Canonicalize = Arc<dyn Fn(&ConfigName, ConfigValue) -> ConfigValue + Send + Sync>;

/// Operation selector for scripted failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteOp {
	Fetch,
	Save,
}

#[derive(Default)]
struct MemoryState {
	values: HashMap<ConfigName, ConfigValue>,
	scripted: HashMap<(RemoteOp, ConfigName), VecDeque<RemoteError>>,
}

/// In-process backend used by tests and the demo console.
///
/// Holds one authoritative value per name, answers fetches for unknown names
/// with HTTP 404, and supports scripted one-shot failures, an offline switch,
/// artificial latency, and a canonicalization hook applied to saved values.
pub struct MemoryRemote {
	state: Mutex<MemoryState>,
	latency: Option<Duration>,
	offline: AtomicBool,
	canonicalize: Option<Canonicalize>,
	fetches: AtomicUsize,
	saves: AtomicUsize,
}

impl Default for MemoryRemote {
	fn default() -> Self {
		Self::new()
	}
}

impl MemoryRemote {
	/// Creates an empty backend.
	pub fn new() -> Self {
		Self {
			state: Mutex::new(MemoryState::default()),
			latency: None,
			offline: AtomicBool::new(false),
			canonicalize: None,
			fetches: AtomicUsize::new(0),
			saves: AtomicUsize::new(0),
		}
	}

	/// Delays every call by `latency`.
	pub fn with_latency(mut self, latency: Duration) -> Self {
		self.latency = Some(latency);
		self
	}

	/// Rewrites every saved value before it is stored and echoed back.
	pub fn with_canonicalize(mut self, f: impl Fn(&ConfigName, ConfigValue) -> ConfigValue + Send + Sync + 'static) -> Self {
		self.canonicalize = Some(Arc::new(f));
		self
	}

	/// Seeds the authoritative value for `name`.
	pub fn insert(&self, name: ConfigName, value: ConfigValue) {
		self.state.lock().values.insert(name, value);
	}

	/// Returns the authoritative value for `name`.
	pub fn value(&self, name: &ConfigName) -> Option<ConfigValue> {
		self.state.lock().values.get(name).cloned()
	}

	/// Queues a one-shot failure for the next `op` on `name`.
	pub fn fail_next(&self, op: RemoteOp, name: ConfigName, error: RemoteError) {
		self.state.lock().scripted.entry((op, name)).or_default().push_back(error);
	}

	/// Makes every call fail with a transport error while `offline` is set.
	pub fn set_offline(&self, offline: bool) {
		self.offline.store(offline, Ordering::Release);
	}

	/// Number of fetch calls received.
	pub fn fetch_count(&self) -> usize {
		self.fetches.load(Ordering::Acquire)
	}

	/// Number of save calls received.
	pub fn save_count(&self) -> usize {
		self.saves.load(Ordering::Acquire)
	}

	async fn enter(&self, op: RemoteOp, name: &ConfigName) -> Result<(), RemoteError> {
		let counter = match op {
			RemoteOp::Fetch => &self.fetches,
			RemoteOp::Save => &self.saves,
		};
		counter.fetch_add(1, Ordering::AcqRel);

		if let Some(latency) = self.latency {
			tokio::time::sleep(latency).await;
		}
		if self.offline.load(Ordering::Acquire) {
			return Err(RemoteError::Transport("backend unreachable".into()));
		}
		let scripted = self
			.state
			.lock()
			.scripted
			.get_mut(&(op, name.clone()))
			.and_then(VecDeque::pop_front);
		match scripted {
			Some(error) => Err(error),
			None => Ok(()),
		}
	}
}

#[async_trait]
impl RemoteSource for MemoryRemote {
	async fn fetch_config(&self, name: &ConfigName) -> Result<ConfigValue, RemoteError> {
		self.enter(RemoteOp::Fetch, name).await?;
		self.value(name).ok_or(RemoteError::Status {
			status: 404,
			message: Some(format!("no configuration stored for {name}")),
		})
	}

	async fn save_config(&self, name: &ConfigName, value: ConfigValue) -> Result<ConfigValue, RemoteError> {
		self.enter(RemoteOp::Save, name).await?;
		let canonical = match &self.canonicalize {
			Some(f) => f(name, value),
			None => value,
		};
		tracing::trace!(%name, "memory remote stored value");
		self.insert(name.clone(), canonical.clone());
		Ok(canonical)
	}
}
