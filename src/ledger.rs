// ===============================
// src/ledger.rs (per-symbol running state)
// ===============================
use rust_decimal::Decimal;

use crate::domain::Fill;

/// Running state for one instrument during a reconstruction scan: the signed
/// net quantity and the buffered fills of the currently-open segment.
///
/// Invariant: `net_qty` equals the signed quantity sum of `open_fills`.
/// Quantities are exact decimals, so flatness is `net_qty == 0` with no
/// tolerance constant.
#[derive(Debug)]
pub struct SymbolLedger {
    pub symbol: String,
    net_qty: Decimal,
    open_fills: Vec<Fill>,
}

impl SymbolLedger {
    pub fn new(symbol: String) -> Self {
        Self {
            symbol,
            net_qty: Decimal::ZERO,
            open_fills: Vec::new(),
        }
    }

    /// Append a fill to the open segment and update net quantity.
    /// A zero-quantity fill leaves `net_qty` untouched but is still buffered,
    /// so its fee is attributed to the segment it lands in.
    pub fn push(&mut self, fill: Fill) {
        self.net_qty += fill.signed_qty();
        self.open_fills.push(fill);
    }

    /// Round-trip detection: the segment is closed when the net quantity is
    /// back to exactly zero. A fill that overshoots through zero to the
    /// opposite sign does NOT close the segment; the position stays open in
    /// the new direction.
    pub fn is_flat(&self) -> bool {
        self.net_qty == Decimal::ZERO
    }

    pub fn net_qty(&self) -> Decimal {
        self.net_qty
    }

    pub fn open_fills(&self) -> &[Fill] {
        &self.open_fills
    }

    /// Atomically take the closed segment: returns the buffered fills and
    /// resets the ledger to flat.
    pub fn take_segment(&mut self) -> Vec<Fill> {
        self.net_qty = Decimal::ZERO;
        std::mem::take(&mut self.open_fills)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Side;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn fill(side: Side, qty: Decimal) -> Fill {
        Fill {
            id: "1".into(),
            order_id: "o1".into(),
            trade_id: "t1".into(),
            symbol: "BTCUSDT".into(),
            side,
            qty,
            price: dec!(100),
            fee: Decimal::ZERO,
            ts: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        }
    }

    #[test]
    fn net_qty_tracks_signed_sum() {
        let mut ledger = SymbolLedger::new("BTCUSDT".into());
        ledger.push(fill(Side::Buy, dec!(0.3)));
        ledger.push(fill(Side::Sell, dec!(0.1)));
        assert_eq!(ledger.net_qty(), dec!(0.2));
        assert!(!ledger.is_flat());

        ledger.push(fill(Side::Sell, dec!(0.2)));
        assert!(ledger.is_flat());
        assert_eq!(ledger.open_fills().len(), 3);
    }

    #[test]
    fn exact_decimal_flatness_without_tolerance() {
        // 0.1 + 0.2 - 0.3 is not zero in binary floats; it is in Decimal.
        let mut ledger = SymbolLedger::new("BTCUSDT".into());
        ledger.push(fill(Side::Buy, dec!(0.1)));
        ledger.push(fill(Side::Buy, dec!(0.2)));
        ledger.push(fill(Side::Sell, dec!(0.3)));
        assert!(ledger.is_flat());
    }

    #[test]
    fn overshoot_does_not_flatten() {
        let mut ledger = SymbolLedger::new("BTCUSDT".into());
        ledger.push(fill(Side::Buy, dec!(3)));
        ledger.push(fill(Side::Sell, dec!(8)));
        assert_eq!(ledger.net_qty(), dec!(-5));
        assert!(!ledger.is_flat());
    }

    #[test]
    fn take_segment_resets_state() {
        let mut ledger = SymbolLedger::new("BTCUSDT".into());
        ledger.push(fill(Side::Buy, dec!(1)));
        ledger.push(fill(Side::Sell, dec!(1)));
        let seg = ledger.take_segment();
        assert_eq!(seg.len(), 2);
        assert!(ledger.is_flat());
        assert!(ledger.open_fills().is_empty());
    }

    #[test]
    fn zero_qty_fill_is_buffered_but_neutral() {
        let mut ledger = SymbolLedger::new("BTCUSDT".into());
        ledger.push(fill(Side::Buy, dec!(1)));
        ledger.push(fill(Side::Buy, Decimal::ZERO));
        assert_eq!(ledger.net_qty(), dec!(1));
        assert_eq!(ledger.open_fills().len(), 2);
    }
}
