pub mod book_side;
pub mod tca;

pub use book_side::BookSide;
pub use tca::{ExecutionReport, SweepAccumulator, TcaSummary};
