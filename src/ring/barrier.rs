use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Notify;
use tracing::warn;


/// An N-party countdown latch. `wait` resolves once `done` has been called as
/// many times as `add` registered.
#[derive(Debug, Default)]
pub struct CompletionBarrier{
	remaining: AtomicUsize,
	signals: AtomicUsize,
	notify: Notify,
}

impl CompletionBarrier{
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add(&self, parties: usize){
		self.remaining.fetch_add(parties, Ordering::SeqCst);
	}

	/// Signal that one party has finished. Returns false if no party was
	/// outstanding, in which case the signal is ignored.
	pub fn done(&self) -> bool {
		let prev = self.remaining.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
		match prev {
			Ok(prev) => {
				self.signals.fetch_add(1, Ordering::SeqCst);
				if prev == 1 {
					self.notify.notify_waiters();
				}
				true
			},
			Err(_) => {
				warn!("completion barrier signalled with no outstanding parties");
				false
			},
		}
	}

	pub fn remaining(&self) -> usize {
		self.remaining.load(Ordering::SeqCst)
	}

	/// Number of accepted `done` calls since creation.
	pub fn signals(&self) -> usize {
		self.signals.load(Ordering::SeqCst)
	}

	pub async fn wait(&self){
		loop{
			// register before checking so a release in between is not missed
			let notified = self.notify.notified();
			if self.remaining() == 0 {
				return;
			}
			notified.await;
		}
	}
}
