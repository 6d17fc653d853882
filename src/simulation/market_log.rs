use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::engine::MatchingEngine;

pub const HEADER: [&str; 7] = ["Time", "MidPrice", "BestBid", "BestAsk", "Spread", "Imbalance", "TruePrice"];
pub const MID_PRICE_COLUMN: &str = "MidPrice";

/// One logged simulation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub time: u64,
    pub mid_price: f64,
    pub best_bid: f64,
    pub best_ask: f64,
    pub spread: f64,
    pub imbalance: f64,
    pub true_price: f64,
}

impl MarketSnapshot {
    /// `None` when either side of the book is empty.
    pub fn capture(time: u64, engine: &MatchingEngine, true_price: f64, imbalance_depth: usize) -> Option<Self> {
        let mid_price = engine.mid_price()?;
        let best_bid = engine.best_bid()?;
        let best_ask = engine.best_ask()?;
        Some(Self {
            time,
            mid_price,
            best_bid,
            best_ask,
            spread: best_ask - best_bid,
            imbalance: engine.imbalance(imbalance_depth),
            true_price,
        })
    }

    fn write_record(&self, out: &mut impl Write) -> std::io::Result<()> {
        writeln!(
            out,
            "{},{},{},{},{},{},{}",
            self.time, self.mid_price, self.best_bid, self.best_ask, self.spread, self.imbalance, self.true_price
        )
    }
}

/// Writes `rows` with a header line. Returns the number of data rows written.
pub fn write_market_log(path: &Path, rows: &[MarketSnapshot]) -> anyhow::Result<usize> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);
    writeln!(out, "{}", HEADER.join(","))?;
    for row in rows {
        row.write_record(&mut out)?;
    }
    out.flush()?;
    Ok(rows.len())
}

/// Reads one numeric column, located by header name.
pub fn read_column(path: &Path, column: &str) -> anyhow::Result<Vec<f64>> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let mut lines = text.lines();
    let header = lines.next().with_context(|| format!("{} is empty", path.display()))?;
    let index = header
        .split(',')
        .position(|name| name.trim() == column)
        .with_context(|| format!("column {column} not found in {}", path.display()))?;

    let mut values = Vec::new();
    for (line_no, line) in lines.enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let field = line
            .split(',')
            .nth(index)
            .with_context(|| format!("row {} has no {column} field", line_no + 2))?;
        let value = field
            .trim()
            .parse::<f64>()
            .with_context(|| format!("row {}: bad {column} value {field:?}", line_no + 2))?;
        values.push(value);
    }
    Ok(values)
}

pub fn read_mid_prices(path: &Path) -> anyhow::Result<Vec<f64>> {
    read_column(path, MID_PRICE_COLUMN)
}
