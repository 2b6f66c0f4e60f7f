use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Serialize, Deserialize};

use crate::message::{Message, MessageKind};


/// Counters for every message that moved through the ring. Only used for
/// reporting.
#[derive(Debug, Default)]
pub struct MessageStats{
	participate_sent: AtomicU64,
	leader_sent: AtomicU64,
	participate_forwarded: AtomicU64,
	participate_dropped: AtomicU64,
	leader_relayed: AtomicU64,
}

impl MessageStats{
	pub fn record_send(&self, msg: &Message){
		match msg.kind {
			MessageKind::Participate => self.participate_sent.fetch_add(1, Ordering::Relaxed),
			MessageKind::Leader => self.leader_sent.fetch_add(1, Ordering::Relaxed),
		};
	}

	pub fn record_forward(&self, msg: &Message){
		match msg.kind {
			MessageKind::Participate => self.participate_forwarded.fetch_add(1, Ordering::Relaxed),
			MessageKind::Leader => self.leader_relayed.fetch_add(1, Ordering::Relaxed),
		};
	}

	pub fn record_drop(&self){
		self.participate_dropped.fetch_add(1, Ordering::Relaxed);
	}

	pub fn snapshot(&self) -> MessageCounts {
		MessageCounts{
			participate_sent: self.participate_sent.load(Ordering::Relaxed),
			leader_sent: self.leader_sent.load(Ordering::Relaxed),
			participate_forwarded: self.participate_forwarded.load(Ordering::Relaxed),
			participate_dropped: self.participate_dropped.load(Ordering::Relaxed),
			leader_relayed: self.leader_relayed.load(Ordering::Relaxed),
		}
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageCounts{
	pub participate_sent: u64,
	pub leader_sent: u64,
	pub participate_forwarded: u64,
	pub participate_dropped: u64,
	pub leader_relayed: u64,
}

impl MessageCounts{
	/// Every send into a mailbox, initial candidacies included.
	pub fn total(&self) -> u64 {
		self.participate_sent + self.leader_sent
	}
}
