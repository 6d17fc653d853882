use std::collections::{BTreeMap, VecDeque};

use ordered_float::OrderedFloat;

use crate::error::{EngineError, InvalidOrderReason};
use crate::models::Order;
use crate::types::{Price, Quantity, Side};

type PriceKey = OrderedFloat<Price>;

#[derive(Debug, Clone, Default)]
struct Level {
    queue: VecDeque<usize>,
    total_qty: Quantity,
}

/// Resting orders for one side of the book.
///
/// Bids iterate by descending price, asks by ascending price; within a price level orders
/// are kept in ascending arrival sequence.
#[derive(Debug, Clone)]
pub struct BookSide {
    side: Side,
    levels: BTreeMap<PriceKey, Level>,
    orders: slab::Slab<Order>,
}

impl BookSide {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
            orders: slab::Slab::new(),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Number of resting orders.
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn peek_best(&self) -> Option<&Order> {
        let (_, level) = self.best_level()?;
        let key = *level.queue.front()?;
        self.orders.get(key)
    }

    pub fn best_price(&self) -> Option<Price> {
        self.best_level().map(|(price, _)| price.into_inner())
    }

    pub fn insert(&mut self, order: Order) -> Result<(), EngineError> {
        if order.quantity == 0 {
            return Err(InvalidOrderReason::ZeroQuantity.into());
        }
        let price = OrderedFloat(order.price);
        let sequence = order.sequence;
        let quantity = order.quantity;
        let key = self.orders.insert(order);

        let orders = &self.orders;
        let level = self.levels.entry(price).or_default();
        let pos = level.queue.partition_point(|&k| orders[k].sequence <= sequence);
        level.queue.insert(pos, key);
        level.total_qty += quantity;
        Ok(())
    }

    pub fn pop_best(&mut self) -> Result<Order, EngineError> {
        let (&price, _) = self.best_level().ok_or(EngineError::EmptyBook)?;
        let level = self.levels.get_mut(&price).ok_or(EngineError::EmptyBook)?;
        let key = level.queue.pop_front().ok_or(EngineError::EmptyBook)?;
        let order = self.orders.remove(key);
        level.total_qty -= order.quantity;
        if level.queue.is_empty() {
            self.levels.remove(&price);
        }
        Ok(order)
    }

    /// Takes `qty` from the best order. Returns the order when this exhausts it, in which
    /// case it has already been removed from the book.
    pub fn reduce_best(&mut self, qty: Quantity) -> Result<Option<Order>, EngineError> {
        let (&price, _) = self.best_level().ok_or(EngineError::EmptyBook)?;
        let level = self.levels.get_mut(&price).ok_or(EngineError::EmptyBook)?;
        let key = *level.queue.front().ok_or(EngineError::EmptyBook)?;
        let best = self.orders.get_mut(key).ok_or(EngineError::EmptyBook)?;
        if qty > best.quantity {
            return Err(EngineError::Overfill {
                requested: qty,
                available: best.quantity,
            });
        }

        best.quantity -= qty;
        level.total_qty -= qty;
        if best.quantity > 0 {
            return Ok(None);
        }

        level.queue.pop_front();
        let filled = self.orders.remove(key);
        if level.queue.is_empty() {
            self.levels.remove(&price);
        }
        Ok(Some(filled))
    }

    /// Keeps the first `keep` orders in priority order and removes the rest.
    pub fn truncate(&mut self, keep: usize) -> Vec<Order> {
        let prices: Vec<PriceKey> = self.levels_in_priority().map(|(price, _)| *price).collect();
        let mut kept = 0usize;
        let mut removed = Vec::new();

        for price in prices {
            let Some(level) = self.levels.get_mut(&price) else {
                continue;
            };
            let room = keep.saturating_sub(kept);
            if room >= level.queue.len() {
                kept += level.queue.len();
                continue;
            }
            kept += room;
            for key in level.queue.split_off(room) {
                let order = self.orders.remove(key);
                level.total_qty -= order.quantity;
                removed.push(order);
            }
            if level.queue.is_empty() {
                self.levels.remove(&price);
            }
        }
        removed
    }

    /// Resting orders, best first.
    pub fn iter(&self) -> impl Iterator<Item = &Order> + '_ {
        self.levels_in_priority()
            .flat_map(move |(_, level)| level.queue.iter().map(move |&key| &self.orders[key]))
    }

    /// Aggregated `(price, quantity)` for the best `depth` levels.
    pub fn depth(&self, depth: usize) -> Vec<(Price, Quantity)> {
        self.levels_in_priority()
            .take(depth)
            .map(|(price, level)| (price.into_inner(), level.total_qty))
            .collect()
    }

    /// Sum of the remaining quantity of the first `n` orders.
    pub fn top_quantity(&self, n: usize) -> Quantity {
        self.iter().take(n).map(|o| o.quantity).sum()
    }

    pub fn total_quantity(&self) -> Quantity {
        self.levels.values().map(|level| level.total_qty).sum()
    }

    fn best_level(&self) -> Option<(&PriceKey, &Level)> {
        match self.side {
            Side::Buy => self.levels.last_key_value(),
            Side::Sell => self.levels.first_key_value(),
        }
    }

    fn levels_in_priority(&self) -> Box<dyn Iterator<Item = (&PriceKey, &Level)> + '_> {
        match self.side {
            Side::Buy => Box::new(self.levels.iter().rev()),
            Side::Sell => Box::new(self.levels.iter()),
        }
    }
}
