use serde::{Deserialize, Serialize};

use crate::models::Fill;
use crate::types::{Price, Quantity, Side};

/// Running totals of a market sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepAccumulator {
    pub side: Side,
    pub requested: Quantity,
    pub filled: Quantity,
    pub total_cost: f64,
    pub fills: Vec<Fill>,
}

impl SweepAccumulator {
    pub fn new(side: Side, requested: Quantity) -> Self {
        Self {
            side,
            requested,
            filled: 0,
            total_cost: 0.0,
            fills: Vec::new(),
        }
    }

    pub fn record(&mut self, fill: Fill) {
        self.total_cost += fill.quantity as f64 * fill.price;
        self.filled += fill.quantity;
        self.fills.push(fill);
    }

    pub fn remaining(&self) -> Quantity {
        self.requested.saturating_sub(self.filled)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TcaSummary {
    pub side: Side,
    pub requested: Quantity,
    pub filled_quantity: Quantity,
    pub vwap: Price,
    pub arrival_price: Price,
    /// Absolute distance between VWAP and the arrival mid; direction is not kept.
    pub slippage: f64,
    pub fills: Vec<Fill>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExecutionReport {
    Filled(TcaSummary),
    NoFill {
        side: Side,
        requested: Quantity,
        arrival_price: Price,
    },
}

impl ExecutionReport {
    pub fn from_sweep(arrival_price: Price, sweep: &SweepAccumulator) -> Self {
        if sweep.filled == 0 {
            return Self::NoFill {
                side: sweep.side,
                requested: sweep.requested,
                arrival_price,
            };
        }
        let vwap = sweep.total_cost / sweep.filled as f64;
        Self::Filled(TcaSummary {
            side: sweep.side,
            requested: sweep.requested,
            filled_quantity: sweep.filled,
            vwap,
            arrival_price,
            slippage: (vwap - arrival_price).abs(),
            fills: sweep.fills.clone(),
        })
    }

    pub fn side(&self) -> Side {
        match self {
            Self::Filled(summary) => summary.side,
            Self::NoFill { side, .. } => *side,
        }
    }

    pub fn requested(&self) -> Quantity {
        match self {
            Self::Filled(summary) => summary.requested,
            Self::NoFill { requested, .. } => *requested,
        }
    }

    pub fn filled_quantity(&self) -> Quantity {
        match self {
            Self::Filled(summary) => summary.filled_quantity,
            Self::NoFill { .. } => 0,
        }
    }

    pub fn arrival_price(&self) -> Price {
        match self {
            Self::Filled(summary) => summary.arrival_price,
            Self::NoFill { arrival_price, .. } => *arrival_price,
        }
    }

    pub fn vwap(&self) -> Option<Price> {
        match self {
            Self::Filled(summary) => Some(summary.vwap),
            Self::NoFill { .. } => None,
        }
    }

    pub fn slippage(&self) -> Option<f64> {
        match self {
            Self::Filled(summary) => Some(summary.slippage),
            Self::NoFill { .. } => None,
        }
    }

    pub fn fills(&self) -> &[Fill] {
        match self {
            Self::Filled(summary) => &summary.fills,
            Self::NoFill { .. } => &[],
        }
    }

    /// True when the book ran out before the requested quantity was filled.
    pub fn is_partial(&self) -> bool {
        self.filled_quantity() < self.requested()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sweep_reports_no_fill() {
        let sweep = SweepAccumulator::new(Side::Buy, 10);
        let report = ExecutionReport::from_sweep(99.5, &sweep);
        assert_eq!(report.vwap(), None);
        assert_eq!(report.slippage(), None);
        assert!(report.is_partial());
    }

    #[test]
    fn sell_slippage_is_magnitude_only() {
        let mut sweep = SweepAccumulator::new(Side::Sell, 4);
        sweep.record(Fill {
            maker_order_id: 1,
            price: 98.0,
            quantity: 4,
        });
        let report = ExecutionReport::from_sweep(99.0, &sweep);
        assert_eq!(report.vwap(), Some(98.0));
        assert_eq!(report.slippage(), Some(1.0));
        assert!(!report.is_partial());
    }
}
