use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::error::{EngineError, InvalidOrderReason};
use crate::matching::{BookSide, ExecutionReport, SweepAccumulator};
use crate::models::{Fill, Order, Trade};
use crate::types::{OrderId, Price, Quantity, Side};

const IMBALANCE_EPSILON: f64 = 1e-9;

/// Outcome of a limit order submission.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum LimitOrderReport {
    FullyFilled {
        order_id: OrderId,
        sequence: u64,
        trades: Vec<Trade>,
    },
    Posted {
        order_id: OrderId,
        sequence: u64,
        remaining: Quantity,
    },
    PartiallyFilledAndPosted {
        order_id: OrderId,
        sequence: u64,
        remaining: Quantity,
        trades: Vec<Trade>,
    },
}

impl LimitOrderReport {
    pub fn order_id(&self) -> OrderId {
        match *self {
            Self::FullyFilled { order_id, .. }
            | Self::Posted { order_id, .. }
            | Self::PartiallyFilledAndPosted { order_id, .. } => order_id,
        }
    }

    pub fn sequence(&self) -> u64 {
        match *self {
            Self::FullyFilled { sequence, .. }
            | Self::Posted { sequence, .. }
            | Self::PartiallyFilledAndPosted { sequence, .. } => sequence,
        }
    }

    pub fn trades(&self) -> &[Trade] {
        match self {
            Self::FullyFilled { trades, .. } | Self::PartiallyFilledAndPosted { trades, .. } => trades,
            Self::Posted { .. } => &[],
        }
    }

    pub fn remaining(&self) -> Quantity {
        match *self {
            Self::FullyFilled { .. } => 0,
            Self::Posted { remaining, .. } | Self::PartiallyFilledAndPosted { remaining, .. } => remaining,
        }
    }

    pub fn filled_quantity(&self) -> Quantity {
        self.trades().iter().map(|t| t.quantity).sum()
    }
}

/// Serializable view of the whole engine state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub next_sequence: u64,
    pub bids: Vec<Order>,
    pub asks: Vec<Order>,
    pub trade_tape: Vec<Trade>,
}

/// Single-instrument price-time priority matching engine.
#[derive(Debug, Clone)]
pub struct MatchingEngine {
    bids: BookSide,
    asks: BookSide,
    trade_tape: Vec<Trade>,
    next_sequence: u64,
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchingEngine {
    pub fn new() -> Self {
        Self {
            bids: BookSide::new(Side::Buy),
            asks: BookSide::new(Side::Sell),
            trade_tape: Vec::new(),
            next_sequence: 1,
        }
    }

    pub fn bid_side(&self) -> &BookSide {
        &self.bids
    }

    pub fn ask_side(&self) -> &BookSide {
        &self.asks
    }

    pub fn book_side(&self, side: Side) -> &BookSide {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    pub fn trade_tape(&self) -> &[Trade] {
        &self.trade_tape
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.bids.best_price()
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.asks.best_price()
    }

    pub fn mid_price(&self) -> Option<Price> {
        let bid = self.bids.peek_best()?;
        let ask = self.asks.peek_best()?;
        Some((bid.price + ask.price) / 2.0)
    }

    pub fn spread(&self) -> Option<Price> {
        Some(self.best_ask()? - self.best_bid()?)
    }

    /// Signed volume imbalance over the first `depth` resting orders of each side, in [-1, 1].
    pub fn imbalance(&self, depth: usize) -> f64 {
        let bid_vol = self.bids.top_quantity(depth) as f64;
        let ask_vol = self.asks.top_quantity(depth) as f64;
        (bid_vol - ask_vol) / (bid_vol + ask_vol + IMBALANCE_EPSILON)
    }

    /// Matches `order` against the opposite side, then rests whatever is left.
    #[instrument(skip(self, order), fields(order_id = order.id, side = %order.side, price = order.price))]
    pub fn submit_limit_order(&mut self, mut order: Order) -> Result<LimitOrderReport, EngineError> {
        if let Err(err) = order.validate() {
            warn!(%err, "rejected limit order");
            metrics::counter!("engine_rejected_orders_total").increment(1);
            return Err(err);
        }
        metrics::counter!("engine_limit_orders_total").increment(1);

        let sequence = self.next_sequence;
        self.next_sequence += 1;
        order.sequence = sequence;

        let opposite = match order.side {
            Side::Buy => &mut self.asks,
            Side::Sell => &mut self.bids,
        };
        let mut trades = Vec::new();

        while order.quantity > 0 {
            let Some(best) = opposite.peek_best() else {
                break;
            };
            if !order.crosses(best.price) {
                break;
            }
            let (maker_id, maker_price) = (best.id, best.price);
            let fill_qty = order.quantity.min(best.quantity);

            opposite.reduce_best(fill_qty)?;
            order.quantity -= fill_qty;

            let trade = Trade {
                sequence: self.trade_tape.len() as u64,
                price: maker_price,
                quantity: fill_qty,
                maker_order_id: maker_id,
                taker_order_id: order.id,
                aggressor_side: order.side,
            };
            debug!(qty = fill_qty, price = maker_price, maker_order_id = maker_id, "match");
            self.trade_tape.push(trade.clone());
            trades.push(trade);
        }
        metrics::counter!("engine_trades_total").increment(trades.len() as u64);

        let order_id = order.id;
        let remaining = order.quantity;
        if remaining == 0 {
            return Ok(LimitOrderReport::FullyFilled {
                order_id,
                sequence,
                trades,
            });
        }

        match order.side {
            Side::Buy => self.bids.insert(order)?,
            Side::Sell => self.asks.insert(order)?,
        }

        if trades.is_empty() {
            Ok(LimitOrderReport::Posted {
                order_id,
                sequence,
                remaining,
            })
        } else {
            Ok(LimitOrderReport::PartiallyFilledAndPosted {
                order_id,
                sequence,
                remaining,
                trades,
            })
        }
    }

    /// Sweeps the opposite side without a price limit and reports transaction costs against
    /// the mid-price observed before the sweep. Sweep fills do not go on the trade tape.
    #[instrument(skip(self))]
    pub fn execute_market_order(&mut self, side: Side, quantity: Quantity) -> Result<ExecutionReport, EngineError> {
        if quantity == 0 {
            metrics::counter!("engine_rejected_orders_total").increment(1);
            return Err(InvalidOrderReason::ZeroQuantity.into());
        }
        let Some(arrival_price) = self.mid_price() else {
            warn!("insufficient liquidity to determine arrival price");
            metrics::counter!("engine_rejected_orders_total").increment(1);
            return Err(EngineError::InsufficientLiquidity);
        };
        metrics::counter!("engine_market_orders_total").increment(1);

        let target = match side {
            Side::Buy => &mut self.asks,
            Side::Sell => &mut self.bids,
        };
        let mut sweep = SweepAccumulator::new(side, quantity);

        while sweep.remaining() > 0 {
            let Some(best) = target.peek_best() else {
                break;
            };
            let fill = Fill {
                maker_order_id: best.id,
                price: best.price,
                quantity: sweep.remaining().min(best.quantity),
            };
            target.reduce_best(fill.quantity)?;
            debug!(qty = fill.quantity, price = fill.price, "sweep fill");
            sweep.record(fill);
        }

        let report = ExecutionReport::from_sweep(arrival_price, &sweep);
        match &report {
            ExecutionReport::Filled(summary) => {
                metrics::histogram!("engine_slippage").record(summary.slippage);
                info!(
                    filled = summary.filled_quantity,
                    requested = summary.requested,
                    vwap = summary.vwap,
                    arrival_price = summary.arrival_price,
                    slippage = summary.slippage,
                    "market order executed"
                );
            }
            ExecutionReport::NoFill { .. } => info!("market order found no liquidity"),
        }
        Ok(report)
    }

    /// Maintenance path: keeps the first `keep_count` resting orders of `side` and removes the
    /// rest, returning them in priority order.
    #[instrument(skip(self))]
    pub fn force_cancel_resting(&mut self, side: Side, keep_count: usize) -> Vec<Order> {
        let removed = match side {
            Side::Buy => self.bids.truncate(keep_count),
            Side::Sell => self.asks.truncate(keep_count),
        };
        info!(removed = removed.len(), "force-cancelled resting orders");
        removed
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            next_sequence: self.next_sequence,
            bids: self.bids.iter().cloned().collect(),
            asks: self.asks.iter().cloned().collect(),
            trade_tape: self.trade_tape.clone(),
        }
    }

    /// blake3 digest of the bincode-encoded snapshot.
    pub fn state_hash(&self) -> String {
        let bytes = bincode::serialize(&self.snapshot()).unwrap_or_default();
        blake3::hash(&bytes).to_hex().to_string()
    }
}
