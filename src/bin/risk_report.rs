use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use liquid_risk::ExecutionReport;
use liquid_risk::config::Settings;
use liquid_risk::risk::{RiskManager, RiskMetrics, StressReport, run_liquidity_stress_test};

#[derive(Parser, Debug)]
#[command(name = "risk_report")]
struct Args {
    #[arg(long, default_value = "config/example.yaml")]
    config: String,
    /// Market log to read mid-prices from; defaults to `log_path` from the config.
    #[arg(long)]
    log: Option<PathBuf>,
    #[arg(long)]
    confidence: Option<f64>,
    #[arg(long)]
    sell_volume: Option<u64>,
    /// Emit one JSON document instead of text.
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Report {
    market_risk: RiskMetrics,
    stress: StressReport,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut settings = Settings::load(&args.config)?;
    if let Some(volume) = args.sell_volume {
        settings.stress.sell_volume = volume;
    }
    let confidence = args.confidence.unwrap_or(settings.risk.confidence_level);
    let log = args.log.unwrap_or_else(|| PathBuf::from(&settings.log_path));

    let market_risk = RiskManager::from_log(&log)?.calculate_market_risk(confidence)?;
    let stress = run_liquidity_stress_test(&settings.stress)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&Report { market_risk, stress })?);
        return Ok(());
    }

    println!("market risk over {} returns from {}", market_risk.observations, log.display());
    println!("  VaR ({:.0}%): {:.4}%", confidence * 100.0, market_risk.var * 100.0);
    println!("  Expected shortfall: {:.4}%", market_risk.expected_shortfall * 100.0);

    println!("liquidity stress test");
    println!("  pre-crash mid: {:.4}", stress.pre_crash_mid);
    println!("  bids pulled: {}", stress.cancelled_bids);
    match &stress.execution {
        ExecutionReport::Filled(summary) => {
            println!("  filled {} of {}", summary.filled_quantity, summary.requested);
            println!("  VWAP: {:.4}", summary.vwap);
            println!("  slippage: {:.4}", summary.slippage);
        }
        ExecutionReport::NoFill { requested, .. } => println!("  no liquidity for {requested}"),
    }
    Ok(())
}
