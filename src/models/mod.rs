use serde::{Deserialize, Serialize};

use crate::error::{EngineError, InvalidOrderReason};
use crate::types::{OrderId, Price, Quantity, Side};

/// A limit instruction. `quantity` is the remaining quantity and only ever decreases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub side: Side,
    pub price: Price,
    pub quantity: Quantity,
    /// Arrival sequence assigned by the engine on submission; 0 until then.
    pub sequence: u64,
}

impl Order {
    pub fn new(id: OrderId, side: Side, price: Price, quantity: Quantity) -> Result<Self, EngineError> {
        let order = Self {
            id,
            side,
            price,
            quantity,
            sequence: 0,
        };
        order.validate()?;
        Ok(order)
    }

    /// Builds an order from loosely typed input: side is matched case-insensitively and
    /// the quantity must be a positive integer.
    pub fn parse(id: OrderId, side: &str, price: Price, quantity: i64) -> Result<Self, EngineError> {
        let side: Side = side.parse()?;
        if quantity < 0 {
            return Err(InvalidOrderReason::NegativeQuantity(quantity).into());
        }
        Self::new(id, side, price, quantity as Quantity)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.quantity == 0 {
            return Err(InvalidOrderReason::ZeroQuantity.into());
        }
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(InvalidOrderReason::NonPositivePrice(self.price).into());
        }
        Ok(())
    }

    pub fn crosses(&self, resting_price: Price) -> bool {
        self.side.crosses(self.price, resting_price)
    }

    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }
}

/// One entry of the trade tape. Always priced at the resting order's price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub sequence: u64,
    pub price: Price,
    pub quantity: Quantity,
    pub maker_order_id: OrderId,
    pub taker_order_id: OrderId,
    pub aggressor_side: Side,
}

impl Trade {
    pub fn notional(&self) -> f64 {
        self.price * self.quantity as f64
    }
}

/// A single fill taken by a market sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub maker_order_id: OrderId,
    pub price: Price,
    pub quantity: Quantity,
}
