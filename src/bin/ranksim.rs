//! ranksim command-line runner
//!
//! Runs one simulation against a ranking service and prints the final report.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ranksim::{
    HttpGateway, InMemoryGateway, RunConfig, SimResult, SimulationConfig, SimulationEngine,
    SimulationReport,
};

/// Interval between readiness probes while waiting for the service.
const READY_POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Parser, Debug)]
#[command(name = "ranksim")]
#[command(about = "Drive a ranking service with synthetic post and vote traffic")]
struct Args {
    /// Base URL of the ranking service
    #[arg(long)]
    base_url: Option<String>,

    /// JSON configuration file; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Sampler seed (random if not set)
    #[arg(long)]
    seed: Option<u64>,

    /// Items submitted before steady-state traffic
    #[arg(long)]
    seed_items: Option<usize>,

    /// Steady-state iterations
    #[arg(long)]
    iterations: Option<usize>,

    /// Pause after each steady-state iteration, in milliseconds
    #[arg(long)]
    step_delay_ms: Option<u64>,

    /// Wait between seeding and steady state, in milliseconds
    #[arg(long)]
    warmup_ms: Option<u64>,

    /// Size of the user pool
    #[arg(long)]
    users: Option<u64>,

    /// Run against an in-memory service instead of HTTP
    #[arg(long)]
    dry_run: bool,

    /// Wait up to this many seconds for the service to answer before starting
    #[arg(long, default_value = "0")]
    wait_ready_secs: u64,

    /// Print the final report as JSON on stdout
    #[arg(long)]
    json: bool,
}

impl Args {
    fn run_config(&self) -> SimResult<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_json_file(path)?,
            None => RunConfig::default(),
        };
        self.apply_overrides(&mut config.simulation);
        if let Some(base_url) = &self.base_url {
            config.gateway.base_url.clone_from(base_url);
        }
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&self, sim: &mut SimulationConfig) {
        if let Some(seed) = self.seed {
            sim.rng_seed = Some(seed);
        }
        if let Some(n) = self.seed_items {
            sim.seed_items = n;
        }
        if let Some(n) = self.iterations {
            sim.steady_iterations = n;
        }
        if let Some(ms) = self.step_delay_ms {
            sim.step_delay_ms = ms;
        }
        if let Some(ms) = self.warmup_ms {
            sim.warmup_ms = ms;
        }
        if let Some(n) = self.users {
            sim.user_pool_size = n;
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run(args: &Args, config: RunConfig) -> SimResult<SimulationReport> {
    if args.dry_run {
        info!("Dry run: using the in-memory ranking service");
        let mut engine = SimulationEngine::new(config.simulation, InMemoryGateway::new())?;
        return engine.run().await;
    }

    let gateway = HttpGateway::new(&config.gateway)?;
    if args.wait_ready_secs > 0 {
        gateway
            .wait_until_ready(Duration::from_secs(args.wait_ready_secs), READY_POLL_INTERVAL)
            .await?;
    }
    info!(base_url = gateway.base_url(), "Using ranking service");
    let mut engine = SimulationEngine::new(config.simulation, gateway)?;
    engine.run().await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing();

    let config = args.run_config()?;
    let report = match run(&args, config).await {
        Ok(report) => report,
        Err(e) => {
            error!(error = %e, "Simulation failed");
            return Err(e.into());
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}
