// ===============================
// src/engine.rs (round-trip reconstruction)
// ===============================
use ahash::AHashMap as HashMap;
use tracing::debug;

use crate::builder::build_position;
use crate::domain::{Fill, OpenSegment, PositionAnalysis, Summary, SymbolSummary};
use crate::ledger::SymbolLedger;

/// Reconstruct round-trip positions from an unordered collection of fills.
///
/// Pure function of its input: every run allocates its own ledger map, so
/// concurrent independent runs cannot interfere. Output order and ids are
/// independent of the incoming fill order (beyond timestamp ties, which keep
/// input order via the stable sort).
pub fn reconstruct(fills: Vec<Fill>) -> PositionAnalysis {
    // 1) Stable chronological sort; ties preserve input order.
    let mut sorted = fills;
    sorted.sort_by_key(|f| f.ts);

    // 2) Single scan, routing each fill to its symbol's ledger.
    let mut ledgers: HashMap<String, SymbolLedger> = HashMap::new();
    let mut positions = Vec::new();

    for fill in sorted {
        let ledger = ledgers
            .entry(fill.symbol.clone())
            .or_insert_with(|| SymbolLedger::new(fill.symbol.clone()));
        ledger.push(fill);

        // 3) Flatness check on the post-update net value closes the segment.
        if ledger.is_flat() {
            let segment = ledger.take_segment();
            if let Some(pos) = build_position(&ledger.symbol, segment) {
                positions.push(pos);
            }
        }
    }

    // 4) Ledgers still holding quantity are open positions: reported
    // separately, never counted in the summary.
    let mut open_segments = std::collections::BTreeMap::new();
    for (symbol, ledger) in &ledgers {
        if !ledger.is_flat() {
            let fills = ledger.open_fills();
            debug!(%symbol, net_qty = %ledger.net_qty(), fills = fills.len(), "open segment at end of scan");
            open_segments.insert(
                symbol.clone(),
                OpenSegment {
                    symbol: symbol.clone(),
                    net_qty: ledger.net_qty(),
                    fill_count: fills.len(),
                    first_fill_ts: fills[0].ts,
                },
            );
        }
    }

    // 5) Final order is entry time; closure order breaks ties (stable sort).
    positions.sort_by_key(|p| p.entry_ts);

    // 6) Ids are assigned after the sort so they ascend in output order and
    // do not depend on per-symbol closure interleaving.
    for (i, pos) in positions.iter_mut().enumerate() {
        pos.id = i as u64 + 1;
    }

    // 7) Summary over completed positions only.
    let mut summary = Summary::default();
    for pos in &positions {
        summary.total_positions += 1;
        summary.total_realized_pnl += pos.realized_pnl;
        summary.total_fees += pos.total_fees;
        let entry = summary
            .by_symbol
            .entry(pos.symbol.clone())
            .or_insert_with(SymbolSummary::default);
        entry.positions += 1;
        entry.realized_pnl += pos.realized_pnl;
    }

    PositionAnalysis {
        positions,
        open_segments,
        summary,
    }
}
