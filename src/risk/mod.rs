use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::StressConfig;
use crate::engine::MatchingEngine;
use crate::error::EngineError;
use crate::matching::ExecutionReport;
use crate::models::Order;
use crate::simulation::read_mid_prices;
use crate::types::Side;

const ASK_ID_OFFSET: u64 = 100;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RiskError {
    #[error("confidence level {0} must be strictly between 0 and 1")]
    InvalidConfidence(f64),
    #[error("at least two mid-prices are needed to compute returns")]
    InsufficientData,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    pub confidence_level: f64,
    /// Empirical return at the (1 - confidence) percentile.
    pub var: f64,
    /// Mean of returns at or below `var`.
    pub expected_shortfall: f64,
    pub observations: usize,
}

/// Historical market risk over a mid-price series.
#[derive(Debug, Clone)]
pub struct RiskManager {
    returns: Vec<f64>,
}

impl RiskManager {
    pub fn from_mid_prices(mid_prices: &[f64]) -> Self {
        Self {
            returns: pct_returns(mid_prices),
        }
    }

    pub fn from_log(path: &Path) -> anyhow::Result<Self> {
        let mid_prices = read_mid_prices(path)?;
        Ok(Self::from_mid_prices(&mid_prices))
    }

    pub fn returns(&self) -> &[f64] {
        &self.returns
    }

    pub fn calculate_market_risk(&self, confidence_level: f64) -> Result<RiskMetrics, RiskError> {
        if !(confidence_level > 0.0 && confidence_level < 1.0) {
            return Err(RiskError::InvalidConfidence(confidence_level));
        }
        if self.returns.is_empty() {
            return Err(RiskError::InsufficientData);
        }

        let var = percentile(&self.returns, (1.0 - confidence_level) * 100.0);
        let tail: Vec<f64> = self.returns.iter().copied().filter(|r| *r <= var).collect();
        let expected_shortfall = tail.iter().sum::<f64>() / tail.len() as f64;

        Ok(RiskMetrics {
            confidence_level,
            var,
            expected_shortfall,
            observations: self.returns.len(),
        })
    }
}

/// Simple percentage returns between consecutive prices; non-finite results are dropped.
pub fn pct_returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .map(|w| (w[1] - w[0]) / w[0])
        .filter(|r| r.is_finite())
        .collect()
}

/// `q`-th percentile (0..=100) with linear interpolation between closest ranks.
/// Returns NaN for an empty slice.
pub fn percentile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = (q / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressReport {
    pub pre_crash_mid: f64,
    pub cancelled_bids: usize,
    pub execution: ExecutionReport,
}

/// Builds a healthy two-sided ladder, pulls all but the top `surviving_bids` bids, then
/// liquidates `sell_volume` at market into what is left.
pub fn run_liquidity_stress_test(config: &StressConfig) -> Result<StressReport, EngineError> {
    let mut engine = MatchingEngine::new();
    for i in 1..=config.levels {
        let offset = i as f64 * config.tick;
        engine.submit_limit_order(Order::new(i, Side::Buy, config.mid - offset, config.level_quantity)?)?;
        engine.submit_limit_order(Order::new(i + ASK_ID_OFFSET, Side::Sell, config.mid + offset, config.level_quantity)?)?;
    }

    let pre_crash_mid = engine.mid_price().ok_or(EngineError::InsufficientLiquidity)?;
    let cancelled = engine.force_cancel_resting(Side::Buy, config.surviving_bids);
    info!(pre_crash_mid, cancelled = cancelled.len(), sell_volume = config.sell_volume, "stress liquidation");

    let execution = engine.execute_market_order(Side::Sell, config.sell_volume)?;
    Ok(StressReport {
        pre_crash_mid,
        cancelled_bids: cancelled.len(),
        execution,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_interpolates_between_ranks() {
        let values = [4.0, 1.0, 3.0, 2.0];
        assert_eq!(percentile(&values, 0.0), 1.0);
        assert_eq!(percentile(&values, 100.0), 4.0);
        assert_eq!(percentile(&values, 50.0), 2.5);
    }

    #[test]
    fn returns_skip_division_by_zero() {
        assert_eq!(pct_returns(&[0.0, 1.0, 2.0]), vec![1.0]);
        assert!(pct_returns(&[100.0]).is_empty());
    }

    #[test]
    fn confidence_must_be_open_interval() {
        let rm = RiskManager::from_mid_prices(&[100.0, 101.0, 99.0]);
        assert_eq!(rm.calculate_market_risk(1.0), Err(RiskError::InvalidConfidence(1.0)));
        assert_eq!(RiskManager::from_mid_prices(&[100.0]).calculate_market_risk(0.95), Err(RiskError::InsufficientData));
    }
}
