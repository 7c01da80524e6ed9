//! Propagation bus: in-session publish/subscribe keyed by [`ConfigName`].
//!
//! Delivery is synchronous and in subscription order. Handler lists are
//! copy-on-write snapshots, so a handler that subscribes or unsubscribes only
//! affects later publishes. A publish issued from inside a handler is queued
//! behind the remaining handlers of the outer publish (breadth-first), and a
//! panicking handler is logged without stopping delivery to its siblings.

use std::any::Any;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use arc_swap::ArcSwap;
use campus_primitives::{ConfigName, ConfigValue};
use parking_lot::ReentrantMutex;
use rustc_hash::FxHashMap as HashMap;


/// Callback invoked with every value published on a subscribed name.
pub type Handler = Arc<dyn Fn(&ConfigValue) + Send + Sync>;

#[derive(Clone)]
struct Subscriber {
	id: u64,
	handler: Handler,
}

type Topics = HashMap<ConfigName, Arc<[Subscriber]>>;

#[derive(Default)]
struct DispatchState {
	active: bool,
	queue: VecDeque<(ConfigName, ConfigValue)>,
}

struct BusInner {
	topics: ArcSwap<Topics>,
	next_id: AtomicU64,
	dispatch: ReentrantMutex<RefCell<DispatchState>>,
}

/// Cloneable handle to one session's propagation bus.
#[derive(Clone)]
pub struct PropagationBus {
	inner: Arc<BusInner>,
}

impl Default for PropagationBus {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for PropagationBus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let topics = self.inner.topics.load();
		f.debug_struct("PropagationBus").field("topics", &topics.len()).finish()
	}
}

impl PropagationBus {
	/// Creates a bus with no subscribers.
	pub fn new() -> Self {
		Self {
			inner: Arc::new(BusInner {
				topics: ArcSwap::from_pointee(Topics::default()),
				next_id: AtomicU64::new(1),
				dispatch: ReentrantMutex::new(RefCell::new(DispatchState::default())),
			}),
		}
	}

	/// Registers `handler` for `name`. The handler stays registered until the
	/// returned [`Subscription`] is dropped or unsubscribed.
	pub fn subscribe(&self, name: ConfigName, handler: impl Fn(&ConfigValue) + Send + Sync + 'static) -> Subscription {
		let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
		let subscriber = Subscriber {
			id,
			handler: Arc::new(handler),
		};
		self.inner.topics.rcu(|topics| {
			let mut next = Topics::clone(topics);
			let mut list: Vec<Subscriber> = next.get(&name).map(|l| l.to_vec()).unwrap_or_default();
			list.push(subscriber.clone());
			next.insert(name.clone(), list.into());
			next
		});
		tracing::trace!(%name, id, "bus.subscribe");
		Subscription {
			bus: Arc::downgrade(&self.inner),
			name: Some(name),
			id,
		}
	}

	/// Delivers `value` to every handler registered for `name`.
	///
	/// Returns once this value has been delivered to every handler, unless
	/// called from inside a handler, in which case it is queued and delivered
	/// before the outermost publish returns. Publishes from other threads
	/// wait for the running dispatch to drain.
	pub fn publish(&self, name: ConfigName, value: ConfigValue) {
		let guard = self.inner.dispatch.lock();
		{
			let mut state = guard.borrow_mut();
			state.queue.push_back((name, value));
			if state.active {
				tracing::trace!(queued = state.queue.len(), "bus.publish deferred behind running dispatch");
				return;
			}
			state.active = true;
		}

		loop {
			let next = guard.borrow_mut().queue.pop_front();
			let Some((name, value)) = next else {
				break;
			};
			self.deliver(&name, &value);
		}
		guard.borrow_mut().active = false;
	}

	fn deliver(&self, name: &ConfigName, value: &ConfigValue) {
		let Some(subscribers) = self.inner.topics.load().get(name).cloned() else {
			tracing::trace!(%name, "bus.publish with no subscribers");
			return;
		};
		tracing::trace!(%name, subscribers = subscribers.len(), "bus.publish");
		for subscriber in subscribers.iter() {
			let handler = &subscriber.handler;
			if let Err(payload) = catch_unwind(AssertUnwindSafe(|| handler(value))) {
				tracing::error!(
					%name,
					id = subscriber.id,
					panic = %panic_message(payload.as_ref()),
					"bus handler panicked"
				);
			}
		}
	}

	/// Returns the number of live subscriptions for `name`.
	pub fn subscriber_count(&self, name: &ConfigName) -> usize {
		self.inner.topics.load().get(name).map_or(0, |l| l.len())
	}

	/// Returns true when nothing is subscribed to any name.
	pub fn is_idle(&self) -> bool {
		self.inner.topics.load().is_empty()
	}
}

fn unsubscribe(inner: &BusInner, name: &ConfigName, id: u64) {
	inner.topics.rcu(|topics| {
		let mut next = Topics::clone(topics);
		if let Some(list) = next.get(name) {
			let remaining: Vec<Subscriber> = list.iter().filter(|s| s.id != id).cloned().collect();
			if remaining.is_empty() {
				next.remove(name);
			} else {
				next.insert(name.clone(), remaining.into());
			}
		}
		next
	});
	tracing::trace!(%name, id, "bus.unsubscribe");
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
	if let Some(s) = payload.downcast_ref::<&str>() {
		(*s).to_string()
	} else if let Some(s) = payload.downcast_ref::<String>() {
		s.clone()
	} else {
		"<non-string panic payload>".to_string()
	}
}

/// Registration guard returned by [`PropagationBus::subscribe`].
///
/// Dropping the guard removes the handler; hold it for exactly as long as
/// the subscribing component lives.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
	bus: Weak<BusInner>,
	name: Option<ConfigName>,
	id: u64,
}

impl Subscription {
	/// Returns the subscribed name.
	pub fn name(&self) -> Option<&ConfigName> {
		self.name.as_ref()
	}

	/// Removes the handler now.
	pub fn unsubscribe(mut self) {
		self.release();
	}

	/// Keeps the handler registered for the lifetime of the bus.
	pub fn detach(mut self) {
		self.name = None;
	}

	fn release(&mut self) {
		let Some(name) = self.name.take() else {
			return;
		};
		if let Some(inner) = self.bus.upgrade() {
			unsubscribe(&inner, &name, self.id);
		}
	}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		self.release();
	}
}

impl fmt::Debug for Subscription {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Subscription")
			.field("name", &self.name)
			.field("id", &self.id)
			.finish()
	}
}
