use std::{
	collections::HashSet,
	sync::{Arc, OnceLock},
	time::Duration,
};

use chrono::Utc;
use rand::{rngs::StdRng, SeedableRng};
use tokio::sync::mpsc::{channel, unbounded_channel, Sender, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, instrument};

use crate::{
	config::{check_mailbox_capacity, RingConfig, MIN_NODES},
	error::{ElectionError, Result},
	message::Message,
	node::Node,
	node_id::NodeId,
};

pub mod barrier;
pub mod report;
pub mod stats;

use barrier::CompletionBarrier;
use report::{ElectionEvent, ElectionReport};
use stats::MessageStats;


/// State shared by every node of one ring. Nodes only use it to record the
/// leader, count messages and signal completion.
#[derive(Debug)]
pub(crate) struct RingContext{
	pub leader: OnceLock<NodeId>,
	pub barrier: CompletionBarrier,
	pub stats: MessageStats,
	pub events: UnboundedSender<ElectionEvent>,
}

impl RingContext{
	pub fn new(events: UnboundedSender<ElectionEvent>) -> Self {
		RingContext{
			leader: OnceLock::new(),
			barrier: CompletionBarrier::new(),
			stats: MessageStats::default(),
			events,
		}
	}
}


/// A unidirectional ring of nodes. Node `i` sends to node `(i + 1) mod N`.
/// The ring is consumed by `elect_leader`.
pub struct Ring{
	nodes: Vec<Node>,
	mailboxes: Vec<Sender<Message>>,
	context: Arc<RingContext>,
	events: UnboundedReceiver<ElectionEvent>,
	timeout: Option<Duration>,
}

impl Ring{

	/// Build a ring of `config.nodes` nodes with unique random identifiers
	/// drawn from `[0, config.max_id)`.
	pub fn new(config: &RingConfig) -> Result<Self>{
		config.validate()?;

		let mut rng = match config.seed {
			Some(seed) => StdRng::seed_from_u64(seed),
			None => StdRng::from_entropy(),
		};

		let mut seen = HashSet::with_capacity(config.nodes);
		let mut ids = Vec::with_capacity(config.nodes);
		for _ in 0..config.nodes {
			// validate() guarantees the range can supply every node
			let id = loop{
				let id = NodeId::random_below(&mut rng, config.max_id);
				if seen.insert(id) {
					break id;
				}
			};
			ids.push(id);
		}

		let mut ring = Self::with_ids(ids, config.mailbox_capacity)?;
		ring.set_timeout(config.election_timeout());
		Ok(ring)
	}

	/// Build a ring from fixed identifiers, wired in the given order.
	pub fn with_ids(ids: Vec<NodeId>, mailbox_capacity: usize) -> Result<Self>{
		let n = ids.len();
		if n < MIN_NODES {
			return Err(ElectionError::invalid(format!(
				"number of nodes should be at least {}, got {}", MIN_NODES, n
			)));
		}
		let mut seen = HashSet::with_capacity(n);
		if let Some(dup) = ids.iter().find(|id| !seen.insert(**id)) {
			return Err(ElectionError::invalid(format!("duplicate identifier {}", dup)));
		}

		check_mailbox_capacity(mailbox_capacity)?;
		// a mailbox never holds more than every candidacy plus the leader announcement
		let capacity = mailbox_capacity.max(n + 1);
		let (events_tx, events_rx) = unbounded_channel();
		let context = Arc::new(RingContext::new(events_tx));

		let (mailboxes, receivers): (Vec<_>, Vec<_>) = (0..n).map(|_| channel(capacity)).unzip();
		let nodes = receivers.into_iter().enumerate().map(|(i, mailbox)| {
			let next = (i + 1) % n;
			Node::new(ids[i], mailbox, mailboxes[next].clone(), ids[next], context.clone())
		}).collect();

		debug!("built ring of {} nodes with mailbox capacity {}", n, capacity);

		Ok(Ring{
			nodes,
			mailboxes,
			context,
			events: events_rx,
			timeout: None,
		})
	}

	/// Give up on the election after `limit`. Without one, a broken ring hangs.
	pub fn set_timeout(&mut self, limit: Option<Duration>){
		self.timeout = limit;
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Identifiers in construction order.
	pub fn ids(&self) -> Vec<NodeId> {
		self.nodes.iter().map(Node::id).collect()
	}

	pub fn neighbor_of(&self, id: NodeId) -> Option<NodeId> {
		self.nodes.iter().find(|node| node.id() == id).map(Node::neighbor_id)
	}

	pub fn render(&self) -> String {
		render_ring(&self.ids())
	}

	/// Run one Chang-Roberts election to completion. Every node's candidacy
	/// is queued in its neighbor's mailbox before the receive-loops start.
	#[instrument(skip(self), fields(nodes = self.nodes.len()))]
	pub async fn elect_leader(mut self) -> Result<ElectionReport>{
		let n = self.nodes.len();
		let ring = self.ids();
		let started_at = Utc::now();

		self.context.barrier.add(n);

		for (i, id) in ring.iter().enumerate() {
			info!("Node {} starting the election process", id);
			let next = (i + 1) % n;
			let msg = Message::participate(*id);
			self.mailboxes[next].send(msg).await.map_err(|_| ElectionError::Mailbox{ node: ring[next] })?;
			self.context.stats.record_send(&msg);
		}
		// only the nodes hold senders from here on
		self.mailboxes.clear();

		let handles: Vec<JoinHandle<Result<()>>> = self.nodes.drain(..).map(|node| tokio::spawn(node.run())).collect();

		match self.timeout {
			Some(limit) => {
				if timeout(limit, self.context.barrier.wait()).await.is_err() {
					for handle in handles.iter() {
						handle.abort();
					}
					return Err(ElectionError::Timeout(limit));
				}
			},
			None => self.context.barrier.wait().await,
		}

		for handle in handles {
			handle.await??;
		}

		let leader = *self.context.leader.get().ok_or(ElectionError::NoLeader)?;

		let mut events = Vec::new();
		while let Ok(event) = self.events.try_recv() {
			events.push(event);
		}

		let report = ElectionReport{
			leader,
			ring,
			messages: self.context.stats.snapshot(),
			halted: self.context.barrier.signals(),
			events,
			started_at,
			finished_at: Utc::now(),
		};
		info!("Leader: {}", report.leader);
		info!("Total messages sent: {}", report.messages.total());
		Ok(report)
	}
}

/// `5 --> 3 --> 8 --> 1 --> 5`
pub fn render_ring(ids: &[NodeId]) -> String {
	let mut parts: Vec<String> = ids.iter().map(NodeId::to_string).collect();
	if let Some(first) = ids.first() {
		parts.push(first.to_string());
	}
	parts.join(" --> ")
}


#[cfg(test)]
mod tests{
	use std::{collections::HashSet, time::Duration};

	use crate::{config::RingConfig, error::ElectionError, node_id::NodeId};

	use super::{render_ring, Ring};

	fn ids(raw: &[u32]) -> Vec<NodeId> {
		raw.iter().copied().map(NodeId).collect()
	}

	#[test]
	fn random_ids_are_unique(){
		for seed in 0..20 {
			let config = RingConfig{
				nodes: 50,
				max_id: 60,
				seed: Some(seed),
				..Default::default()
			};
			let ring = Ring::new(&config).unwrap();
			let unique: HashSet<_> = ring.ids().into_iter().collect();
			assert_eq!(unique.len(), 50);
			assert!(ring.ids().iter().all(|id| id.value() < 60));
		}
	}

	#[test]
	fn exhausting_the_range_still_succeeds(){
		let config = RingConfig{
			nodes: 8,
			max_id: 8,
			seed: Some(3),
			..Default::default()
		};
		let ring = Ring::new(&config).unwrap();
		let mut got: Vec<u32> = ring.ids().iter().map(NodeId::value).collect();
		got.sort();
		assert_eq!(got, (0..8).collect::<Vec<_>>());
	}

	#[test]
	fn same_seed_same_ring(){
		let config = RingConfig{
			seed: Some(99),
			..Default::default()
		};
		assert_eq!(Ring::new(&config).unwrap().ids(), Ring::new(&config).unwrap().ids());
	}

	#[test]
	fn neighbors_form_a_single_cycle(){
		let ring = Ring::new(&RingConfig::with_nodes(17)).unwrap();
		let all = ring.ids();
		let start = all[0];
		let mut visited = HashSet::new();
		let mut current = start;
		for _ in 0..ring.len() {
			assert!(visited.insert(current), "node {} visited twice", current);
			current = ring.neighbor_of(current).unwrap();
		}
		assert_eq!(current, start);
		assert_eq!(visited.len(), all.len());
	}

	#[test]
	fn fixed_ids_are_wired_in_order(){
		let ring = Ring::with_ids(ids(&[5, 3, 8, 1]), 10).unwrap();
		assert_eq!(ring.neighbor_of(NodeId(5)), Some(NodeId(3)));
		assert_eq!(ring.neighbor_of(NodeId(1)), Some(NodeId(5)));
		assert_eq!(ring.neighbor_of(NodeId(42)), None);
		assert_eq!(ring.render(), "5 --> 3 --> 8 --> 1 --> 5");
	}

	#[test]
	fn too_small_or_duplicate_rings_are_rejected(){
		assert!(matches!(Ring::with_ids(ids(&[1]), 10), Err(ElectionError::InvalidConfiguration{ .. })));
		assert!(matches!(Ring::with_ids(ids(&[]), 10), Err(ElectionError::InvalidConfiguration{ .. })));
		assert!(matches!(Ring::with_ids(ids(&[4, 2, 4]), 10), Err(ElectionError::InvalidConfiguration{ .. })));
		assert!(matches!(Ring::new(&RingConfig::with_nodes(1)), Err(ElectionError::InvalidConfiguration{ .. })));
	}

	#[test]
	fn oversized_mailboxes_are_rejected(){
		let config = RingConfig{
			nodes: 4,
			mailbox_capacity: usize::MAX,
			..Default::default()
		};
		assert!(matches!(Ring::new(&config), Err(ElectionError::InvalidConfiguration{ .. })));
		assert!(matches!(Ring::with_ids(ids(&[2, 7]), usize::MAX), Err(ElectionError::InvalidConfiguration{ .. })));
		assert!(matches!(Ring::with_ids(ids(&[2, 7]), 0), Err(ElectionError::InvalidConfiguration{ .. })));
	}

	#[tokio::test]
	async fn election_times_out_when_a_node_never_finishes(){
		let mut ring = Ring::with_ids(ids(&[5, 3, 8, 1]), 10).unwrap();
		ring.set_timeout(Some(Duration::from_millis(200)));
		// a party that never signals keeps the barrier closed
		ring.context.barrier.add(1);

		let err = ring.elect_leader().await.err().unwrap();
		assert!(matches!(err, ElectionError::Timeout(limit) if limit == Duration::from_millis(200)));
	}

	#[test]
	fn render_closes_the_cycle(){
		assert_eq!(render_ring(&ids(&[1, 2])), "1 --> 2 --> 1");
		assert_eq!(render_ring(&[]), "");
	}
}
