use crate::types::{Price, Quantity};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidOrderReason {
    #[error("quantity must be positive")]
    ZeroQuantity,
    #[error("quantity {0} is negative")]
    NegativeQuantity(i64),
    #[error("price {0} must be a positive finite number")]
    NonPositivePrice(Price),
    #[error("unknown side {0:?}")]
    UnknownSide(String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("invalid order: {0}")]
    InvalidOrder(#[from] InvalidOrderReason),
    #[error("book side is empty")]
    EmptyBook,
    #[error("insufficient liquidity to establish an arrival price")]
    InsufficientLiquidity,
    #[error("cannot fill {requested} against resting quantity {available}")]
    Overfill { requested: Quantity, available: Quantity },
}
