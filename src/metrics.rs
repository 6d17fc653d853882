use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Installs the global Prometheus recorder and registers the engine's metric descriptions.
pub fn install_recorder() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    describe_engine_metrics();
    Ok(handle)
}

fn describe_engine_metrics() {
    describe_counter!("engine_limit_orders_total", "Accepted limit order submissions");
    describe_counter!("engine_market_orders_total", "Market orders that reached the sweep");
    describe_counter!("engine_rejected_orders_total", "Limit or market orders rejected before matching");
    describe_counter!("engine_trades_total", "Trades appended to the tape");
    describe_histogram!("engine_slippage", "Absolute VWAP distance from the arrival mid-price");
}
