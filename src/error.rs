use std::{path::PathBuf, time::Duration};

use thiserror::Error;

use crate::node_id::NodeId;


/// Errors surfaced while building a ring or running an election.
#[derive(Debug, Error)]
pub enum ElectionError{
	#[error("invalid configuration: {message}")]
	InvalidConfiguration{ message: String },

	#[error("cannot draw {nodes} unique identifiers from a range of {range}")]
	IdentifierExhaustion{ nodes: usize, range: u32 },

	#[error("mailbox of node {node} is closed")]
	Mailbox{ node: NodeId },

	#[error("election did not finish within {0:?}")]
	Timeout(Duration),

	#[error("node task failed: {0}")]
	Task(#[from] tokio::task::JoinError),

	#[error("every node halted but no leader was recorded")]
	NoLeader,

	#[error("failed to read config file {path:?}: {source}")]
	ConfigIo{ path: PathBuf, source: std::io::Error },

	#[error("failed to parse config: {0}")]
	ConfigParse(#[from] serde_json::Error),

	#[error("failed to serialize report: {0}")]
	Report(#[source] serde_json::Error),
}

impl ElectionError{
	pub fn invalid<S: Into<String>>(message: S) -> Self {
		ElectionError::InvalidConfiguration{ message: message.into() }
	}
}

pub type Result<T> = std::result::Result<T, ElectionError>;
