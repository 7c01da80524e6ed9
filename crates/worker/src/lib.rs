//! Task runtime primitives for the configuration engine.
//!
//! Background refreshes, saves, and polling loops are all spawned through
//! this crate so they share classification metadata in logs and attach to
//! whichever tokio runtime is current.

mod class;
mod poll;
mod spawn;
mod token;

pub use class::TaskClass;
pub use poll::{PollHandle, spawn_poll};
pub use spawn::spawn;
pub use token::{GenerationClock, GenerationToken};

/// Extracts the panic message from a task join error.
///
/// Returns `None` when the task was cancelled rather than panicking.
pub fn join_error_panic_message(err: tokio::task::JoinError) -> Option<String> {
	let payload = err.try_into_panic().ok()?;
	let msg = if let Some(s) = payload.downcast_ref::<&str>() {
		(*s).to_string()
	} else if let Some(s) = payload.downcast_ref::<String>() {
		s.clone()
	} else {
		"<non-string panic payload>".to_string()
	};
	Some(msg)
}
