use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::{GenerationClock, GenerationToken, TaskClass, join_error_panic_message, spawn};

#[cfg(test)]
mod tests;

/// Owner of one running polling loop.
///
/// Dropping the handle cancels the loop; [`PollHandle::shutdown`] also waits
/// for it to exit.
#[derive(Debug)]
pub struct PollHandle {
	label: &'static str,
	token: GenerationToken,
	task: Option<JoinHandle<()>>,
}

impl PollHandle {
	/// Returns the loop's generation.
	pub fn generation(&self) -> u64 {
		self.token.generation()
	}

	/// Returns true until the loop has been cancelled or has exited.
	pub fn is_active(&self) -> bool {
		!self.token.is_cancelled() && self.task.as_ref().is_some_and(|t| !t.is_finished())
	}

	/// Requests cancellation without waiting.
	pub fn cancel(&self) {
		self.token.cancel();
	}

	/// Cancels the loop and waits for it to exit. Returns the panic message
	/// if a tick panicked.
	pub async fn shutdown(mut self) -> Option<String> {
		self.token.cancel();
		let task = self.task.take()?;
		match task.await {
			Ok(()) => None,
			Err(err) => {
				let msg = join_error_panic_message(err);
				if let Some(msg) = &msg {
					tracing::error!(poll = self.label, generation = self.token.generation(), panic = %msg, "poll loop panicked");
				}
				msg
			}
		}
	}
}

impl Drop for PollHandle {
	fn drop(&mut self) {
		self.token.cancel();
	}
}

/// Runs `tick` every `period` until the returned handle is cancelled or
/// dropped. The first tick fires one full period after spawning; ticks that
/// overrun are not replayed in a burst.
pub fn spawn_poll<F, Fut>(label: &'static str, period: Duration, clock: &GenerationClock, mut tick: F) -> PollHandle
where
	F: FnMut() -> Fut + Send + 'static,
	Fut: Future<Output = ()> + Send + 'static,
{
	let token = GenerationToken::new(clock.next());
	let loop_token = token.clone();
	let generation = token.generation();

	let task = spawn(TaskClass::Polling, label, async move {
		let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
		ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
		tracing::debug!(poll = label, generation, period_ms = period.as_millis() as u64, "poll loop started");
		loop {
			tokio::select! {
				_ = loop_token.cancelled() => break,
				_ = ticker.tick() => tick().await,
			}
		}
		tracing::debug!(poll = label, generation, "poll loop stopped");
	});

	PollHandle {
		label,
		token,
		task: Some(task),
	}
}
