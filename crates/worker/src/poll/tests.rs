use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;

const PERIOD: Duration = Duration::from_secs(30);

fn counting(counter: &Arc<AtomicUsize>) -> impl FnMut() -> std::future::Ready<()> + Send + 'static {
	let counter = Arc::clone(counter);
	move || {
		counter.fetch_add(1, Ordering::SeqCst);
		std::future::ready(())
	}
}

#[tokio::test(start_paused = true)]
async fn ticks_once_per_period_after_the_first_period() {
	let ticks = Arc::new(AtomicUsize::new(0));
	let handle = spawn_poll("chart", PERIOD, &GenerationClock::new(), counting(&ticks));

	tokio::time::sleep(PERIOD / 2).await;
	assert_eq!(ticks.load(Ordering::SeqCst), 0);
	tokio::time::sleep(PERIOD * 3).await;
	assert_eq!(ticks.load(Ordering::SeqCst), 3);
	assert!(handle.is_active());
	assert_eq!(handle.shutdown().await, None);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_handle_stops_the_loop() {
	let ticks = Arc::new(AtomicUsize::new(0));
	let handle = spawn_poll("chart", PERIOD, &GenerationClock::new(), counting(&ticks));
	tokio::time::sleep(PERIOD + PERIOD / 2).await;
	drop(handle);

	tokio::time::sleep(PERIOD * 10).await;
	assert_eq!(ticks.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn cancel_marks_inactive() {
	let ticks = Arc::new(AtomicUsize::new(0));
	let handle = spawn_poll("chart", PERIOD, &GenerationClock::new(), counting(&ticks));
	handle.cancel();
	assert!(!handle.is_active());
	assert_eq!(handle.shutdown().await, None);
}

#[tokio::test(start_paused = true)]
async fn shutdown_reports_tick_panic() {
	let handle = spawn_poll("chart", PERIOD, &GenerationClock::new(), || async {
		panic!("stats endpoint exploded");
	});
	tokio::time::sleep(PERIOD * 2).await;
	assert!(!handle.is_active());

	let msg = handle.shutdown().await.expect("tick panicked");
	assert!(msg.contains("stats endpoint exploded"), "got: {msg}");
}

#[tokio::test]
async fn generations_come_from_the_shared_clock() {
	let clock = GenerationClock::new();
	let first = spawn_poll("a", PERIOD, &clock, || async {});
	let second = spawn_poll("b", PERIOD, &clock, || async {});
	assert_eq!(first.generation(), 1);
	assert_eq!(second.generation(), 2);
}

#[tokio::test]
async fn aborted_task_has_no_panic_message() {
	let handle = spawn(TaskClass::Background, "sleeper", async {
		tokio::time::sleep(Duration::from_secs(60)).await;
	});
	handle.abort();
	let err = handle.await.unwrap_err();
	assert!(join_error_panic_message(err).is_none());
}
