use std::{cmp::Ordering, sync::Arc};

use serde::{Serialize, Deserialize};
use tokio::sync::mpsc::{Receiver, Sender};
use tracing::{error, info, instrument, warn};

use crate::{
	error::{ElectionError, Result},
	message::{Message, MessageKind},
	node_id::NodeId,
	ring::{report::ElectionEvent, RingContext},
};


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeState{
	Active,
	Halted,
}

/// The transition a node takes for one incoming message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Step{
	/// A stronger candidacy, pass it on unchanged.
	Forward(Message),
	/// A weaker candidacy, swallow it.
	Drop(Message),
	/// Our own candidacy came back. Carries the leader announcement to send.
	Elect(Message),
	/// Someone else's leader announcement. Pass it on, then halt.
	Relay(Message),
	/// Our own leader announcement completed its lap.
	Halt,
	/// Delivered after halting.
	Ignore(Message),
}

impl Step{
	/// The message this step sends to the neighbor, if any.
	pub fn outgoing(&self) -> Option<Message> {
		match self {
			Step::Forward(msg) | Step::Elect(msg) | Step::Relay(msg) => Some(*msg),
			Step::Drop(_) | Step::Halt | Step::Ignore(_) => None,
		}
	}

	pub fn halts(&self) -> bool {
		matches!(self, Step::Relay(_) | Step::Halt)
	}
}


/// A ring member. It owns its mailbox and a sender into its clockwise
/// neighbor's mailbox; it never touches another node directly.
pub struct Node{
	id: NodeId,
	state: NodeState,
	mailbox: Receiver<Message>,
	neighbor: Sender<Message>,
	neighbor_id: NodeId,
	ring: Arc<RingContext>,
}

impl Node{
	pub(crate) fn new(id: NodeId, mailbox: Receiver<Message>, neighbor: Sender<Message>, neighbor_id: NodeId, ring: Arc<RingContext>) -> Self {
		Node{
			id,
			state: NodeState::Active,
			mailbox,
			neighbor,
			neighbor_id,
			ring,
		}
	}

	pub fn id(&self) -> NodeId {
		self.id
	}

	pub fn neighbor_id(&self) -> NodeId {
		self.neighbor_id
	}

	pub fn state(&self) -> NodeState {
		self.state
	}

	/// Chang-Roberts transition function. Only changes local state; sending,
	/// leader bookkeeping and completion signalling happen in `run`.
	pub fn step(&mut self, msg: Message) -> Step {
		if self.state == NodeState::Halted {
			return Step::Ignore(msg);
		}
		match msg.kind {
			MessageKind::Participate => match msg.from.cmp(&self.id) {
				Ordering::Equal => Step::Elect(Message::leader(self.id)),
				Ordering::Greater => Step::Forward(msg),
				Ordering::Less => Step::Drop(msg),
			},
			MessageKind::Leader => {
				self.state = NodeState::Halted;
				if msg.from == self.id {
					Step::Halt
				}else{
					Step::Relay(msg)
				}
			},
		}
	}

	/// Receive-loop. Runs until a leader announcement has passed through this
	/// node, then signals the ring's completion barrier once.
	#[instrument(skip(self), fields(node = %self.id))]
	pub async fn run(mut self) -> Result<()>{
		while let Some(msg) = self.mailbox.recv().await {
			info!("Node {} received {} message from {}", self.id, msg.kind, msg.from);
			let step = self.step(msg);
			self.apply(&step);

			let sent = match step.outgoing() {
				Some(out) => self.send(out).await,
				None => Ok(()),
			};

			if step.halts() || sent.is_err() {
				info!("Node {} halting the election process for itself", self.id);
				self.state = NodeState::Halted;
				self.ring.barrier.done();
				return sent;
			}
		}
		error!("Node {} mailbox closed before a leader was announced", self.id);
		Ok(())
	}

	fn apply(&self, step: &Step){
		match step {
			Step::Forward(msg) => {
				info!("Node {} forwarded Participate message from {}", self.id, msg.from);
				self.ring.stats.record_forward(msg);
			},
			Step::Drop(msg) => {
				info!("Node {} dropped Participate message from {}", self.id, msg.from);
				self.ring.stats.record_drop();
			},
			Step::Elect(_) => {
				info!("Node {} is the leader", self.id);
				if self.ring.leader.set(self.id).is_err() {
					warn!("Node {} elected but a leader was already recorded", self.id);
				}
			},
			Step::Relay(msg) => {
				info!("Node {} forwarded Leader message from {}", self.id, msg.from);
				self.ring.stats.record_forward(msg);
			},
			Step::Halt => {},
			Step::Ignore(msg) => {
				warn!("Node {} ignored {} after halting", self.id, msg);
			},
		}
		// the report may already have been dropped
		let _ = self.ring.events.send(ElectionEvent{ node: self.id, step: *step });
	}

	async fn send(&self, msg: Message) -> Result<()>{
		self.neighbor.send(msg).await.map_err(|_| ElectionError::Mailbox{ node: self.neighbor_id })?;
		self.ring.stats.record_send(&msg);
		Ok(())
	}
}
