use tracing_subscriber::EnvFilter;

use liquid_risk::{MatchingEngine, Order, Side};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut engine = MatchingEngine::new();
    let ladder = [
        Order::new(1, Side::Buy, 99.0, 10)?,
        Order::new(2, Side::Sell, 100.0, 5)?,
        Order::new(3, Side::Sell, 101.0, 10)?,
        Order::new(4, Side::Sell, 105.0, 10)?,
    ];
    for order in ladder {
        let report = engine.submit_limit_order(order)?;
        println!("posted: {report:?}");
    }

    println!("mid before: {:?}", engine.mid_price());
    let report = engine.execute_market_order(Side::Buy, 10)?;
    println!("market buy 10: {report:?}");
    println!("mid after: {:?}", engine.mid_price());
    println!("state_hash={}", engine.state_hash());
    Ok(())
}
