use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{error::{ElectionError, Result}, node::Step, node_id::NodeId};

use super::{render_ring, stats::MessageCounts};


/// One transition taken by one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ElectionEvent{
	pub node: NodeId,
	pub step: Step,
}

/// Outcome of a finished election.
#[derive(Debug, Clone, Serialize)]
pub struct ElectionReport{
	pub leader: NodeId,
	/// Identifiers in ring order, starting from the first node built.
	pub ring: Vec<NodeId>,
	pub messages: MessageCounts,
	/// How many nodes signalled completion.
	pub halted: usize,
	/// Per-node order is preserved, the interleaving across nodes is not.
	pub events: Vec<ElectionEvent>,
	pub started_at: DateTime<Utc>,
	pub finished_at: DateTime<Utc>,
}

impl ElectionReport{
	pub fn elapsed(&self) -> chrono::Duration {
		self.finished_at - self.started_at
	}

	pub fn events_of(&self, node: NodeId) -> impl Iterator<Item = &ElectionEvent> + '_ {
		self.events.iter().filter(move |e| e.node == node)
	}

	pub fn render_ring(&self) -> String {
		render_ring(&self.ring)
	}

	pub fn to_json(&self) -> Result<String>{
		serde_json::to_string_pretty(self).map_err(ElectionError::Report)
	}
}

impl fmt::Display for ElectionReport{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "Leader: {}", self.leader)?;
		write!(f, "Total messages sent: {}", self.messages.total())
	}
}
