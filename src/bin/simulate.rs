use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use liquid_risk::config::Settings;
use liquid_risk::metrics::install_recorder;
use liquid_risk::simulation::{Simulator, write_market_log};

#[derive(Parser, Debug)]
#[command(name = "simulate")]
struct Args {
    #[arg(long, default_value = "config/example.yaml")]
    config: String,
    #[arg(long)]
    steps: Option<u64>,
    #[arg(long)]
    seed: Option<u64>,
    /// Overrides `log_path` from the config.
    #[arg(long)]
    output: Option<PathBuf>,
    /// Print the Prometheus exposition after the run.
    #[arg(long)]
    metrics: bool,
    #[arg(long)]
    json_logs: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if args.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
    let prom = install_recorder()?;

    let mut settings = Settings::load(&args.config)?;
    if let Some(steps) = args.steps {
        settings.simulation.num_steps = steps;
    }
    if args.seed.is_some() {
        settings.simulation.seed = args.seed;
    }
    let output = args.output.unwrap_or_else(|| PathBuf::from(&settings.log_path));

    let mut simulator = Simulator::new(settings.simulation)?;
    let rows = simulator.run();
    let written = write_market_log(&output, &rows)?;
    info!(rows = written, path = %output.display(), "market log written");

    println!("wrote {written} rows to {}", output.display());
    for row in rows.iter().take(5) {
        println!(
            "t={} mid={:.4} bid={:.2} ask={:.2} imbalance={:.3} true={:.4}",
            row.time, row.mid_price, row.best_bid, row.best_ask, row.imbalance, row.true_price
        );
    }
    println!("trades={}", simulator.engine().trade_tape().len());
    println!("state_hash={}", simulator.engine().state_hash());

    if args.metrics {
        println!("{}", prom.render());
    }
    Ok(())
}
