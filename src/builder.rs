// ===============================
// src/builder.rs (closed segment -> CompletedPosition)
// ===============================
use rust_decimal::Decimal;

use crate::domain::{CompletedPosition, Direction, Fill, Side};
use crate::timeutil::format_duration;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

fn weighted_avg(value: Decimal, qty: Decimal) -> Decimal {
    if qty.is_zero() {
        Decimal::ZERO
    } else {
        value / qty
    }
}

/// Build one CompletedPosition from a closed segment.
///
/// The segment must be the chronological fill run of a single symbol whose
/// signed quantities sum to zero. An empty segment is "nothing to build" and
/// yields `None`. The id is assigned later by the engine, after the global
/// entry-time sort.
pub fn build_position(symbol: &str, segment: Vec<Fill>) -> Option<CompletedPosition> {
    let first = segment.first()?;

    let direction = match first.side {
        Side::Buy => Direction::Long,
        Side::Sell => Direction::Short,
    };
    let opening_side = direction.opening_side();

    let mut total_fees = Decimal::ZERO;
    let mut open_value = Decimal::ZERO;
    let mut open_qty = Decimal::ZERO;
    let mut close_value = Decimal::ZERO;
    let mut close_qty = Decimal::ZERO;

    let entry_ts = first.ts;
    // Last closing-side fill seen in scan order; falls back to the segment's
    // first timestamp for degenerate segments with no closing side.
    let mut exit_ts = entry_ts;

    for f in &segment {
        total_fees += f.fee;
        if f.side == opening_side {
            open_value += f.price * f.qty;
            open_qty += f.qty;
        } else {
            close_value += f.price * f.qty;
            close_qty += f.qty;
            exit_ts = f.ts;
        }
    }

    let entry_price = weighted_avg(open_value, open_qty);
    let exit_price = weighted_avg(close_value, close_qty);

    // Equal to both side totals by the zero-sum invariant; min guards the
    // degenerate all-zero-qty segment.
    let size = open_qty.min(close_qty);
    let notional_value = size * entry_price;

    let realized_pnl = match direction {
        Direction::Long => (exit_price - entry_price) * size,
        Direction::Short => (entry_price - exit_price) * size,
    };
    let realized_pnl_pct = if notional_value.is_zero() {
        Decimal::ZERO
    } else {
        realized_pnl / notional_value * HUNDRED
    };

    Some(CompletedPosition {
        id: 0,
        symbol: symbol.to_string(),
        direction,
        size,
        notional_value,
        entry_price,
        exit_price,
        entry_ts,
        exit_ts,
        duration: format_duration(entry_ts, exit_ts),
        realized_pnl,
        realized_pnl_pct,
        total_fees,
        fills: segment,
    })
}
