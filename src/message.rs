use std::fmt;

use serde::{Serialize, Deserialize};

use crate::node_id::NodeId;


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind{
	/// The sender is still a candidate.
	Participate,
	/// The sender has been confirmed as leader.
	Leader,
}

/// A message travelling from one node to its clockwise neighbor. `from` is
/// the node the message speaks for, not the node that last forwarded it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Message{
	pub from: NodeId,
	pub kind: MessageKind,
}

impl Message{
	pub fn participate(from: NodeId) -> Self {
		Message{
			from,
			kind: MessageKind::Participate,
		}
	}

	pub fn leader(from: NodeId) -> Self {
		Message{
			from,
			kind: MessageKind::Leader,
		}
	}
}

impl fmt::Display for MessageKind{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			MessageKind::Participate => write!(f, "Participate"),
			MessageKind::Leader => write!(f, "Leader"),
		}
	}
}

impl fmt::Display for Message{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}({})", self.kind, self.from)
	}
}
