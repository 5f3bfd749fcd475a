// ===============================
// src/main.rs
// ===============================
//
// pnl_recon_rust — reconstructs round-trip positions and realized PnL from
// account fills (Binance Spot myTrades or a JSONL file) and renders a
// position table, summary, optional per-position breakdown, and JSONL export.
//
mod binance;
mod builder;
mod config;
mod domain;
mod engine;
mod fetch;
mod ledger;
mod report;
mod timeutil;

use tracing::{error, info};

use crate::config::Config;
use crate::domain::Fill;

#[tokio::main]
async fn main() {
    // ---- Logging ----
    tracing_subscriber::fmt().with_env_filter("info").init();

    // ---- Load config & run ----
    let cfg = config::load();
    if let Err(e) = run(cfg).await {
        error!(error = %e, "fatal");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        symbols = ?cfg.symbols,
        source = ?cfg.source,
        rest = %cfg.rest_url,
        "startup config"
    );

    // ---- Gather fills ----
    let fills: Vec<Fill> = match &cfg.fills_file {
        Some(path) => fetch::load_jsonl(path).await?,
        None => {
            let api_key = cfg
                .api_key
                .clone()
                .ok_or("BINANCE_API_KEY missing (set it in .env or use --file)")?;
            let api_secret = cfg
                .api_secret
                .clone()
                .ok_or("BINANCE_API_SECRET missing (set it in .env or use --file)")?;
            let client = fetch::BinanceClient::new(
                cfg.rest_url.clone(),
                api_key,
                api_secret,
                cfg.recv_window,
            );
            let mut all = Vec::new();
            for symbol in &cfg.symbols {
                let batch = client
                    .fetch_account_fills(symbol, cfg.start_time_ms)
                    .await?;
                all.extend(batch);
            }
            all
        }
    };
    info!(fills = fills.len(), "reconstructing positions");

    // ---- Reconstruct & render ----
    let analysis = engine::reconstruct(fills);

    print!("{}", report::render_table(&analysis));
    println!();
    print!("{}", report::render_summary(&analysis));

    if cfg.detail {
        for p in &analysis.positions {
            println!();
            print!("{}", report::render_breakdown(p));
        }
    }

    if let Some(path) = &cfg.export_file {
        report::export_jsonl(&analysis, path).await?;
    }

    Ok(())
}
