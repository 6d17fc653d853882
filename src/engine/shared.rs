use std::sync::Arc;

use parking_lot::Mutex;

use crate::engine::matcher::{EngineSnapshot, LimitOrderReport, MatchingEngine};
use crate::error::EngineError;
use crate::matching::ExecutionReport;
use crate::models::Order;
use crate::types::{Price, Quantity, Side};

/// Cloneable handle that serializes every engine operation behind one lock, so readers never
/// observe a book in the middle of a match.
#[derive(Clone, Default)]
pub struct SharedEngine {
    inner: Arc<Mutex<MatchingEngine>>,
}

impl SharedEngine {
    pub fn new(engine: MatchingEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    pub fn submit_limit_order(&self, order: Order) -> Result<LimitOrderReport, EngineError> {
        self.inner.lock().submit_limit_order(order)
    }

    pub fn execute_market_order(&self, side: Side, quantity: Quantity) -> Result<ExecutionReport, EngineError> {
        self.inner.lock().execute_market_order(side, quantity)
    }

    pub fn force_cancel_resting(&self, side: Side, keep_count: usize) -> Vec<Order> {
        self.inner.lock().force_cancel_resting(side, keep_count)
    }

    pub fn mid_price(&self) -> Option<Price> {
        self.inner.lock().mid_price()
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        self.inner.lock().snapshot()
    }

    /// Runs `f` against a consistent view of the engine.
    pub fn read<R>(&self, f: impl FnOnce(&MatchingEngine) -> R) -> R {
        f(&self.inner.lock())
    }
}
