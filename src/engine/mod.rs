pub mod matcher;
pub mod shared;

pub use matcher::{EngineSnapshot, LimitOrderReport, MatchingEngine};
pub use shared::SharedEngine;
