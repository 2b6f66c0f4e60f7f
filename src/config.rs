use std::{path::Path, time::Duration};

use serde::{Serialize, Deserialize};
use tokio::fs;

use crate::error::{ElectionError, Result};


pub const DEFAULT_NODES: usize = 10;
pub const MAX_ID: u32 = 1000;
pub const MIN_NODES: usize = 2;
pub const MAILBOX_CAPACITY: usize = 10;
pub const MAX_MAILBOX_CAPACITY: usize = 1 << 20;


/// Parameters for building a ring. Every field has a default so a config file
/// only needs to name the values it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingConfig{
	pub nodes: usize,
	/// Identifiers are drawn from `[0, max_id)`.
	pub max_id: u32,
	pub mailbox_capacity: usize,
	pub seed: Option<u64>,
	pub election_timeout_ms: Option<u64>,
}

impl Default for RingConfig{
	fn default() -> Self {
		RingConfig{
			nodes: DEFAULT_NODES,
			max_id: MAX_ID,
			mailbox_capacity: MAILBOX_CAPACITY,
			seed: None,
			election_timeout_ms: None,
		}
	}
}

impl RingConfig{
	pub fn with_nodes(nodes: usize) -> Self {
		RingConfig{
			nodes,
			..Default::default()
		}
	}

	pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self>{
		let path = path.as_ref();
		let data = fs::read_to_string(path).await.map_err(|source| ElectionError::ConfigIo{
			path: path.to_path_buf(),
			source,
		})?;
		Self::from_json(&data)
	}

	pub fn from_json(data: &str) -> Result<Self>{
		Ok(serde_json::from_str(data)?)
	}

	pub fn election_timeout(&self) -> Option<Duration> {
		self.election_timeout_ms.map(Duration::from_millis)
	}

	pub fn validate(&self) -> Result<()>{
		if self.nodes < MIN_NODES {
			return Err(ElectionError::invalid(format!(
				"number of nodes should be at least {}, got {}", MIN_NODES, self.nodes
			)));
		}
		check_mailbox_capacity(self.mailbox_capacity)?;
		// rejection sampling would never finish otherwise
		if (self.max_id as u64) < self.nodes as u64 {
			return Err(ElectionError::IdentifierExhaustion{
				nodes: self.nodes,
				range: self.max_id,
			});
		}
		Ok(())
	}
}

pub(crate) fn check_mailbox_capacity(capacity: usize) -> Result<()>{
	if capacity == 0 {
		return Err(ElectionError::invalid("mailbox capacity must be positive"));
	}
	// tokio's channel panics well before usize::MAX
	if capacity > MAX_MAILBOX_CAPACITY {
		return Err(ElectionError::invalid(format!(
			"mailbox capacity too large, at most {} is allowed", MAX_MAILBOX_CAPACITY
		)));
	}
	Ok(())
}


#[cfg(test)]
mod tests{
	use super::*;

	#[test]
	fn defaults_match_the_classic_setup(){
		let config = RingConfig::default();
		assert_eq!(config.nodes, 10);
		assert_eq!(config.max_id, 1000);
		assert_eq!(config.mailbox_capacity, 10);
		assert!(config.validate().is_ok());
	}

	#[test]
	fn partial_json_keeps_defaults(){
		let config = RingConfig::from_json(r#"{"nodes": 4, "seed": 42}"#).unwrap();
		assert_eq!(config.nodes, 4);
		assert_eq!(config.seed, Some(42));
		assert_eq!(config.max_id, MAX_ID);
		assert_eq!(config.election_timeout(), None);
	}

	#[test]
	fn single_node_is_rejected(){
		let err = RingConfig::with_nodes(1).validate().unwrap_err();
		assert!(matches!(err, ElectionError::InvalidConfiguration{ .. }));
	}

	#[test]
	fn small_id_range_is_rejected(){
		let config = RingConfig{
			nodes: 6,
			max_id: 5,
			..Default::default()
		};
		let err = config.validate().unwrap_err();
		assert!(matches!(err, ElectionError::IdentifierExhaustion{ nodes: 6, range: 5 }));
	}

	#[test]
	fn oversized_mailbox_is_rejected(){
		let config = RingConfig::from_json(r#"{"nodes": 4, "mailbox_capacity": 9223372036854775807}"#).unwrap();
		let err = config.validate().unwrap_err();
		assert!(matches!(err, ElectionError::InvalidConfiguration{ .. }));

		let config = RingConfig{
			mailbox_capacity: MAX_MAILBOX_CAPACITY,
			..Default::default()
		};
		assert!(config.validate().is_ok());
	}

	#[test]
	fn malformed_json_is_a_parse_error(){
		let err = RingConfig::from_json("{nodes: }").unwrap_err();
		assert!(matches!(err, ElectionError::ConfigParse(_)));
	}

	#[tokio::test]
	async fn missing_file_is_an_io_error(){
		let err = RingConfig::from_file("/nonexistent/lcr.json").await.unwrap_err();
		assert!(matches!(err, ElectionError::ConfigIo{ .. }));
	}
}
