//! Chang-Roberts leader election over an in-process unidirectional ring.
//!
//! Every node runs as its own tokio task and talks only to its clockwise
//! neighbor through a bounded mailbox. The node with the highest identifier
//! is elected, and a final lap of the leader announcement lets every node
//! halt knowing the result.

pub mod config;
pub mod error;
pub mod message;
pub mod node;
pub mod node_id;
pub mod ring;

pub use config::RingConfig;
pub use error::{ElectionError, Result};
pub use message::{Message, MessageKind};
pub use node::{NodeState, Step};
pub use node_id::NodeId;
pub use ring::{report::{ElectionEvent, ElectionReport}, stats::MessageCounts, Ring};
