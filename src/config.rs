// ===============================
// src/config.rs
// ===============================
use std::env;

use clap::Parser;
use dotenvy::dotenv;

/// Which venue the fills come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceMode {
    /// JSONL file on disk (offline / replay).
    File,
    BinanceSandbox,
    BinanceMainnet,
}

impl SourceMode {
    pub fn default_rest_url(&self) -> &'static str {
        match self {
            SourceMode::File => "https://testnet.binance.vision", // unused for file runs
            SourceMode::BinanceSandbox => "https://testnet.binance.vision",
            SourceMode::BinanceMainnet => "https://api.binance.com",
        }
    }
}

/// Reconstruct round-trip positions and realized PnL from account fills.
#[derive(Debug, Parser)]
#[command(name = "pnl_recon", version)]
pub struct Cli {
    /// Symbols to analyze, comma separated (falls back to SYMBOLS env, then BTCUSDT)
    #[arg(long)]
    pub symbols: Option<String>,

    /// Read fills from a JSONL file instead of the exchange
    #[arg(long)]
    pub file: Option<String>,

    /// Only fetch trades from the last N days
    #[arg(long)]
    pub days: Option<i64>,

    /// Append a per-position JSONL export to this path
    #[arg(long)]
    pub export: Option<String>,

    /// Print a detailed breakdown for every position
    #[arg(long)]
    pub detail: bool,

    /// Use Binance mainnet instead of the testnet sandbox
    #[arg(long)]
    pub mainnet: bool,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub symbols: Vec<String>,
    pub source: SourceMode,
    pub fills_file: Option<String>,
    pub rest_url: String,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub recv_window: u64,
    pub export_file: Option<String>,
    pub start_time_ms: Option<u64>,
    pub detail: bool,
}

pub fn load() -> Config {
    // Make sure .env is read (API keys, SYMBOLS, BINANCE_REST_URL, ...)
    let _ = dotenv();
    let cli = Cli::parse();
    from_cli(cli)
}

fn from_cli(cli: Cli) -> Config {
    // ===== Symbols =====
    // --symbols beats SYMBOLS env; both are comma separated.
    let raw_symbols = cli
        .symbols
        .or_else(|| env::var("SYMBOLS").ok())
        .unwrap_or_else(|| "BTCUSDT".to_string());
    let symbols: Vec<String> = raw_symbols
        .split(',')
        .map(|x| x.trim())
        .filter(|x| !x.is_empty())
        .map(|x| x.to_ascii_uppercase())
        .collect();

    // ===== Source =====
    let source = if cli.file.is_some() {
        SourceMode::File
    } else if cli.mainnet {
        SourceMode::BinanceMainnet
    } else {
        SourceMode::BinanceSandbox
    };

    let rest_url = env::var("BINANCE_REST_URL")
        .unwrap_or_else(|_| source.default_rest_url().to_string());
    let api_key = env::var("BINANCE_API_KEY").ok();
    let api_secret = env::var("BINANCE_API_SECRET").ok();
    let recv_window = env::var("BINANCE_RECV_WINDOW")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(5000);

    let start_time_ms = cli.days.map(|d| {
        let cutoff = chrono::Utc::now() - chrono::Duration::days(d.max(0));
        cutoff.timestamp_millis().max(0) as u64
    });

    Config {
        symbols,
        source,
        fills_file: cli.file,
        rest_url,
        api_key,
        api_secret,
        recv_window,
        export_file: cli.export,
        start_time_ms,
        detail: cli.detail,
    }
}
