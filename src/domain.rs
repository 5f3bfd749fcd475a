// ===============================
// src/domain.rs
// ===============================
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Trade execution side as reported by the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn sign(&self) -> Decimal {
        match self {
            Side::Buy => Decimal::ONE,
            Side::Sell => -Decimal::ONE,
        }
    }
}

/// Direction of a round-trip position, fixed by the side of its first fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// The side that opens (adds to) a position of this direction.
    pub fn opening_side(&self) -> Side {
        match self {
            Direction::Long => Side::Buy,
            Direction::Short => Side::Sell,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
        }
    }
}

/// One matched trade execution, normalized by a data-source adapter.
/// Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub id: String,
    pub order_id: String,
    pub trade_id: String,
    pub symbol: String,
    pub side: Side,
    pub qty: Decimal,
    pub price: Decimal,
    pub fee: Decimal,
    pub ts: DateTime<Utc>,
}

impl Fill {
    /// Quantity with the side's sign applied: Buy adds, Sell subtracts.
    pub fn signed_qty(&self) -> Decimal {
        self.side.sign() * self.qty
    }
}

/// One closed round-trip: a maximal run of fills for one symbol from flat
/// back to flat. Built once at segment closure, immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedPosition {
    pub id: u64,
    pub symbol: String,
    pub direction: Direction,
    pub size: Decimal,
    pub notional_value: Decimal,
    pub entry_price: Decimal,
    pub exit_price: Decimal,
    pub entry_ts: DateTime<Utc>,
    pub exit_ts: DateTime<Utc>,
    pub duration: String,
    pub realized_pnl: Decimal,
    pub realized_pnl_pct: Decimal,
    pub total_fees: Decimal,
    pub fills: Vec<Fill>,
}

/// A symbol that did not return to flat by end of scan. Informational only:
/// not a position, not part of summary totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenSegment {
    pub symbol: String,
    pub net_qty: Decimal,
    pub fill_count: usize,
    pub first_fill_ts: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymbolSummary {
    pub positions: u64,
    pub realized_pnl: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_positions: u64,
    pub total_realized_pnl: Decimal,
    pub total_fees: Decimal,
    /// BTreeMap so repeated runs serialize identically.
    pub by_symbol: BTreeMap<String, SymbolSummary>,
}

/// Full output of one reconstruction run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionAnalysis {
    pub positions: Vec<CompletedPosition>,
    pub open_segments: BTreeMap<String, OpenSegment>,
    pub summary: Summary,
}
