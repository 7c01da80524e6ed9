use std::future::Future;
use std::sync::OnceLock;

use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::TaskClass;

static FALLBACK: OnceLock<Runtime> = OnceLock::new();

/// Current runtime if there is one. Synchronous callers (a CLI command, a
/// test without `#[tokio::test]`) get a lazily built single-thread pool.
fn handle() -> Handle {
	Handle::try_current().unwrap_or_else(|_| {
		FALLBACK
			.get_or_init(|| {
				Builder::new_multi_thread()
					.worker_threads(1)
					.thread_name("campus-worker")
					.enable_all()
					.build()
					.expect("failed to build campus-worker fallback runtime")
			})
			.handle()
			.clone()
	})
}

/// Spawns `fut` inside a `task` span carrying its class and label, so log
/// lines emitted by refreshes and polls can be told apart.
pub fn spawn<F>(class: TaskClass, label: &'static str, fut: F) -> JoinHandle<F::Output>
where
	F: Future + Send + 'static,
	F::Output: Send + 'static,
{
	let span = tracing::debug_span!("task", class = class.as_str(), label);
	tracing::trace!(parent: &span, "spawned");
	handle().spawn(fut.instrument(span))
}
