pub mod market_log;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::config::SimulationConfig;
use crate::engine::MatchingEngine;
use crate::error::EngineError;
use crate::models::Order;
use crate::types::Side;

pub use market_log::{MarketSnapshot, read_column, read_mid_prices, write_market_log};

/// Drives a [`MatchingEngine`] with a random-walk liquidity provider and Bernoulli-gated
/// noise traders, recording a [`MarketSnapshot`] per step whenever a mid-price exists.
pub struct Simulator {
    config: SimulationConfig,
    rng: StdRng,
    engine: MatchingEngine,
    true_price: f64,
    step: u64,
}

impl Simulator {
    pub fn new(config: SimulationConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let true_price = config.start_price;
        Ok(Self {
            config,
            rng,
            engine: MatchingEngine::new(),
            true_price,
            step: 0,
        })
    }

    pub fn engine(&self) -> &MatchingEngine {
        &self.engine
    }

    pub fn true_price(&self) -> f64 {
        self.true_price
    }

    pub fn run(&mut self) -> Vec<MarketSnapshot> {
        info!(steps = self.config.num_steps, "starting simulation");
        let mut rows = Vec::with_capacity(self.config.num_steps as usize);
        for _ in 0..self.config.num_steps {
            if let Some(row) = self.step() {
                rows.push(row);
            }
        }
        info!(
            rows = rows.len(),
            trades = self.engine.trade_tape().len(),
            "simulation complete"
        );
        rows
    }

    /// Advances one time step.
    pub fn step(&mut self) -> Option<MarketSnapshot> {
        let t = self.step;
        self.step += 1;

        self.true_price += sample_normal(&mut self.rng, 0.0, self.config.volatility);
        self.provide_liquidity(t);
        self.maybe_take_liquidity();

        let row = MarketSnapshot::capture(t, &self.engine, self.true_price, self.config.imbalance_depth);
        debug!(t, mid = ?row.as_ref().map(|r| r.mid_price), "step");
        row
    }

    fn provide_liquidity(&mut self, t: u64) {
        let cfg = &self.config;
        let bid_offset = self.rng.gen_range(cfg.spread_min..=cfg.spread_max);
        let ask_offset = self.rng.gen_range(cfg.spread_min..=cfg.spread_max);
        let bid_price = round_to(self.true_price - bid_offset, cfg.price_decimals);
        let ask_price = round_to(self.true_price + ask_offset, cfg.price_decimals);
        let bid_qty = self.rng.gen_range(1..=cfg.max_provider_quantity);
        let ask_qty = self.rng.gen_range(1..=cfg.max_provider_quantity);

        for (side, price, qty) in [(Side::Buy, bid_price, bid_qty), (Side::Sell, ask_price, ask_qty)] {
            let result = Order::new(t, side, price, qty).and_then(|order| self.engine.submit_limit_order(order));
            if let Err(err) = result {
                warn!(t, %side, price, %err, "liquidity provider order skipped");
            }
        }
    }

    fn maybe_take_liquidity(&mut self) {
        if !self.rng.gen_bool(self.config.aggressor_probability) {
            return;
        }
        let side = if self.rng.gen_range(0.0f64..1.0) > 0.5 { Side::Buy } else { Side::Sell };
        let qty = self.rng.gen_range(1..=self.config.max_aggressor_quantity);
        match self.engine.execute_market_order(side, qty) {
            Ok(report) => debug!(%side, qty, filled = report.filled_quantity(), "noise trade"),
            Err(EngineError::InsufficientLiquidity) => debug!(%side, qty, "noise trade skipped: no mid-price"),
            Err(err) => warn!(%side, qty, %err, "noise trade failed"),
        }
    }
}

/// Box-Muller draw from N(mean, std_dev).
fn sample_normal(rng: &mut impl Rng, mean: f64, std_dev: f64) -> f64 {
    let u1: f64 = 1.0 - rng.gen_range(0.0f64..1.0);
    let u2: f64 = rng.gen_range(0.0f64..1.0);
    mean + std_dev * (-2.0 * f64::ln(u1)).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}
