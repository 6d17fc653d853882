pub mod config;
pub mod engine;
pub mod error;
pub mod matching;
pub mod models;
pub mod risk;
pub mod simulation;
pub mod types;

pub mod metrics;

pub use engine::{EngineSnapshot, LimitOrderReport, MatchingEngine, SharedEngine};
pub use error::{EngineError, InvalidOrderReason};
pub use matching::{BookSide, ExecutionReport, SweepAccumulator, TcaSummary};
pub use models::{Fill, Order, Trade};
pub use types::{OrderId, Price, Quantity, Side};
