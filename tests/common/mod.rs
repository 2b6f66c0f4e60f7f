use lcr_election::{ElectionReport, NodeId, Ring, Step};
use tokio::time::{timeout, Duration};


pub fn ids(raw: &[u32]) -> Vec<NodeId> {
	raw.iter().copied().map(NodeId).collect()
}

pub async fn elect(ring: Ring) -> ElectionReport {
	timeout(Duration::from_secs(30), ring.elect_leader()).await
		.expect("election should finish")
		.expect("election should succeed")
}

pub async fn elect_ids(raw: &[u32]) -> ElectionReport {
	let ring = Ring::with_ids(ids(raw), 10).expect("ring should build");
	elect(ring).await
}

pub fn steps_of(report: &ElectionReport, node: u32) -> Vec<Step> {
	report.events_of(NodeId(node)).map(|e| e.step).collect()
}
