//! A bounded single-producer/multiple-consumer queue paired with a stop flag, shared by the
//! link task (C1+C2) and the supervisor task (C4). Modeled on the worker-thread/condvar loop
//! in `ZBUart::worker`/`ezsp_sm.cpp`: a task blocks on the condvar until either work is queued
//! or a stop signal is raised, and shutdown is observed at the next wake rather than preempting
//! an in-flight operation.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use log::error;
use utils::error::*;

/// Returned when an enqueue would exceed the queue's bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Busy;

struct Shared<T> {
	queue: VecDeque<T>,
	stop: bool,
}

/// A bounded queue with a stop flag, used to hand work between the link and supervisor tasks.
///
/// Cloning shares the same underlying queue; use one handle per task.
pub struct Worker<T> {
	cap: usize,
	inner: Arc<(Mutex<Shared<T>>, Condvar)>,
}

impl<T> Clone for Worker<T> {
	fn clone(&self) -> Self {
		Self { cap: self.cap, inner: self.inner.clone() }
	}
}

impl<T> Worker<T> {
	/// Construct a worker queue bounded to `cap` outstanding items.
	pub fn new(cap: usize) -> Self {
		Self { cap, inner: Arc::new((Mutex::new(Shared { queue: VecDeque::new(), stop: false }), Condvar::new())) }
	}

	/// Enqueue an item, waking a waiting consumer. Fails with `Busy` if the queue is at capacity.
	pub fn push(&self, item: T) -> core::result::Result<(), Busy> {
		let (mutex, cv) = &*self.inner;
		let mut shared = mutex.lock().expect("worker mutex poisoned");

		if shared.queue.len() >= self.cap {
			return Err(Busy);
		}

		shared.queue.push_back(item);
		cv.notify_one();

		Ok(())
	}

	/// Raise the stop flag and wake every waiter. Idempotent.
	pub fn stop(&self) {
		let (mutex, cv) = &*self.inner;
		mutex.lock().expect("worker mutex poisoned").stop = true;
		cv.notify_all();
	}

	/// Whether the stop flag has been raised.
	pub fn is_stopped(&self) -> bool {
		let (mutex, _) = &*self.inner;
		mutex.lock().expect("worker mutex poisoned").stop
	}

	/// Block until an item is available, the stop flag is raised, or `timeout` elapses.
	///
	/// Returns `Ok(None)` on a plain wakeup timeout (the caller should re-check its own
	/// suspension points, e.g. a retransmit timer), `Ok(Some(item))` on work, and `Err(())`
	/// once stopped with nothing left to drain.
	pub fn pop_timeout(&self, timeout: Duration) -> Result<Option<T>> {
		let (mutex, cv) = &*self.inner;
		let deadline = Instant::now() + timeout;
		let mut shared = mutex.lock().expect("worker mutex poisoned");

		loop {
			if let Some(item) = shared.queue.pop_front() {
				return Ok(Some(item));
			}

			if shared.stop {
				return Err(());
			}

			let remaining = deadline.saturating_duration_since(Instant::now());

			if remaining.is_zero() {
				return Ok(None);
			}

			let (guard, timed_out) = cv.wait_timeout(shared, remaining).map_err(|_| error!("worker condvar poisoned"))?;

			shared = guard;

			if timed_out.timed_out() && shared.queue.is_empty() && !shared.stop {
				return Ok(None);
			}
		}
	}

	/// Block until an item is available or the stop flag is raised.
	pub fn pop(&self) -> Result<T> {
		let (mutex, cv) = &*self.inner;
		let mut shared = mutex.lock().expect("worker mutex poisoned");

		loop {
			if let Some(item) = shared.queue.pop_front() {
				return Ok(item);
			}

			if shared.stop {
				return Err(());
			}

			shared = cv.wait(shared).map_err(|_| error!("worker condvar poisoned"))?;
		}
	}
}
