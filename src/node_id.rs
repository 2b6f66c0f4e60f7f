use std::fmt;

use rand::Rng;
use serde::{Serialize, Deserialize};


/// The identifier of a node in the ring. Identifiers are compared numerically,
/// the node holding the largest one wins the election.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId{
	/// Draw an identifier uniformly from `[0, max)`. `max` must be positive,
	/// `RingConfig::validate` guarantees it for ring construction.
	pub(crate) fn random_below<R: Rng + ?Sized>(rng: &mut R, max: u32) -> Self {
		NodeId(rng.gen_range(0..max))
	}

	pub fn value(&self) -> u32 {
		self.0
	}
}

impl From<u32> for NodeId{
	fn from(id: u32) -> Self {
		NodeId(id)
	}
}

impl fmt::Display for NodeId{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}
