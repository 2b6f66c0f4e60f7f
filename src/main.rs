use std::{path::PathBuf, process};

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use lcr_election::{Ring, RingConfig, Result};


/// Simulate Chang-Roberts leader election on a ring of in-process nodes.
#[derive(Parser, Debug)]
#[command(name = "lcr")]
#[command(version, about, long_about = None)]
struct Cli{
	/// Number of nodes
	#[arg(short, long)]
	nodes: Option<usize>,

	/// JSON file with ring settings, overridden by the other flags
	#[arg(short, long)]
	config: Option<PathBuf>,

	/// Seed for identifier assignment
	#[arg(long)]
	seed: Option<u64>,

	/// Identifiers are drawn from [0, max-id)
	#[arg(long)]
	max_id: Option<u32>,

	/// Print the full election report as JSON
	#[arg(long)]
	json: bool,
}

#[tokio::main]
async fn main(){
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	let cli = Cli::parse();
	if let Err(e) = run(cli).await {
		error!("{}", e);
		eprintln!("error: {}", e);
		process::exit(1);
	}
}

async fn run(cli: Cli) -> Result<()>{
	let mut config = match &cli.config {
		Some(path) => RingConfig::from_file(path).await?,
		None => RingConfig::default(),
	};
	if let Some(nodes) = cli.nodes {
		config.nodes = nodes;
	}
	if let Some(seed) = cli.seed {
		config.seed = Some(seed);
	}
	if let Some(max_id) = cli.max_id {
		config.max_id = max_id;
	}

	let ring = Ring::new(&config)?;
	println!("{}", ring.render());

	let report = ring.elect_leader().await?;
	if cli.json {
		println!("{}", report.to_json()?);
	}else{
		println!("\n{}", report);
	}
	Ok(())
}
