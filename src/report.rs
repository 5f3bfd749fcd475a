// ===============================
// src/report.rs (rendering + JSONL export)
// ===============================
use std::fmt::Write as _;
use std::path::Path;

use tokio::{
    fs::{self, OpenOptions},
    io::{AsyncWriteExt, BufWriter},
};
use tracing::info;

use crate::domain::{CompletedPosition, PositionAnalysis};

/// Fixed-width table of completed positions.
pub fn render_table(analysis: &PositionAnalysis) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>4}  {:<10} {:>14} {:>14} {:<18} {:>14} {:>12} {:>10}",
        "ID", "SYMBOL", "SIZE", "ENTRY", "DURATION", "EXIT", "PNL", "FEES"
    );
    for p in &analysis.positions {
        let _ = writeln!(
            out,
            "{:>4}  {:<10} {:>14} {:>14} {:<18} {:>14} {:>12} {:>10}",
            p.id,
            p.symbol,
            p.size.normalize().to_string(),
            p.entry_price.round_dp(2).to_string(),
            p.duration,
            p.exit_price.round_dp(2).to_string(),
            format_signed(&p.realized_pnl),
            p.total_fees.round_dp(4).to_string(),
        );
    }
    out
}

/// Per-position human-readable breakdown, including every constituent
/// execution with its price, quantity, and fee.
pub fn render_breakdown(p: &CompletedPosition) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "#{} {} {} size={} entry={} exit={} pnl={} ({}%) fees={} duration={}",
        p.id,
        p.symbol,
        p.direction,
        p.size.normalize(),
        p.entry_price.round_dp(2),
        p.exit_price.round_dp(2),
        format_signed(&p.realized_pnl),
        p.realized_pnl_pct.round_dp(4),
        p.total_fees.round_dp(4),
        p.duration,
    );
    let _ = writeln!(
        out,
        "    opened {}  closed {}",
        p.entry_ts.format("%Y-%m-%d %H:%M:%S"),
        p.exit_ts.format("%Y-%m-%d %H:%M:%S")
    );
    for f in &p.fills {
        let _ = writeln!(
            out,
            "    {} {:?} qty={} px={} fee={} trade={}",
            f.ts.format("%Y-%m-%d %H:%M:%S"),
            f.side,
            f.qty.normalize(),
            f.price.normalize(),
            f.fee.normalize(),
            f.trade_id,
        );
    }
    out
}

/// Totals plus the per-symbol breakdown and any still-open segments.
pub fn render_summary(analysis: &PositionAnalysis) -> String {
    let s = &analysis.summary;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "positions={} realized_pnl={} fees={}",
        s.total_positions,
        format_signed(&s.total_realized_pnl),
        s.total_fees.round_dp(4),
    );
    for (symbol, sym) in &s.by_symbol {
        let _ = writeln!(
            out,
            "  {symbol}: {} positions, pnl {}",
            sym.positions,
            format_signed(&sym.realized_pnl)
        );
    }
    for (symbol, seg) in &analysis.open_segments {
        let _ = writeln!(
            out,
            "  open: {symbol} net_qty={} over {} fill(s) since {}",
            seg.net_qty.normalize(),
            seg.fill_count,
            seg.first_fill_ts.format("%Y-%m-%d %H:%M:%S")
        );
    }
    out
}

fn format_signed(d: &rust_decimal::Decimal) -> String {
    let rounded = d.round_dp(2);
    if rounded.is_sign_negative() {
        format!("{rounded}")
    } else {
        format!("+{rounded}")
    }
}

/// Append one JSON line per completed position to `path`, creating parent
/// directories as needed.
pub async fn export_jsonl(analysis: &PositionAnalysis, path: &str) -> std::io::Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    let mut writer = BufWriter::new(file);

    for p in &analysis.positions {
        let line = serde_json::to_string(p)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
    }
    writer.flush().await?;
    info!(%path, positions = analysis.positions.len(), "exported analysis");
    Ok(())
}
