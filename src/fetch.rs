// ===============================
// src/fetch.rs (fill sources: Binance REST + JSONL file)
// ===============================
//
// Adapters that produce normalized `Fill` records for the engine:
// - fetch_account_fills : signed GET /api/v3/myTrades per symbol, paginated
//                         with fromId, exponential backoff on rate limits
// - load_jsonl          : offline source, one Fill per line
//
// Malformed records are rejected here and never reach the engine.
//
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use tokio::time::{sleep, Duration};
use tracing::{info, warn};

use crate::binance::{sign_query, timestamp_ms, RawTrade};
use crate::domain::{Fill, Side};

const PAGE_LIMIT: u32 = 1000;
const MAX_RETRIES: u32 = 6;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("api error {status}: {body}")]
    Api { status: u16, body: String },
    #[error("malformed {field} value {value:?} in trade {trade_id}")]
    MalformedField {
        field: &'static str,
        value: String,
        trade_id: String,
    },
    #[error("bad timestamp {0} in trade {1}")]
    BadTimestamp(u64, String),
    #[error("read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parse line {line} of {path}: {source}")]
    Jsonl {
        path: String,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

// Exponential retry delay: 0.5s, 1s, 2s, ... capped at 32s.
// `attempt` is 1-based (the first retry waits 500ms).
fn backoff_ms(attempt: u32) -> u64 {
    let shift = attempt.saturating_sub(1).min(6);
    500u64.saturating_mul(1 << shift)
}

fn parse_decimal(field: &'static str, value: &str, trade_id: &str) -> Result<Decimal, FetchError> {
    let d: Decimal = value.parse().map_err(|_| FetchError::MalformedField {
        field,
        value: value.to_string(),
        trade_id: trade_id.to_string(),
    })?;
    if d.is_sign_negative() {
        return Err(FetchError::MalformedField {
            field,
            value: value.to_string(),
            trade_id: trade_id.to_string(),
        });
    }
    Ok(d)
}

/// Normalize one raw account trade into the engine's Fill shape.
pub fn normalize(raw: &RawTrade) -> Result<Fill, FetchError> {
    let trade_id = raw.id.to_string();
    let qty = parse_decimal("qty", &raw.qty, &trade_id)?;
    let price = parse_decimal("price", &raw.price, &trade_id)?;
    let fee = parse_decimal("commission", &raw.commission, &trade_id)?;
    let ts = Utc
        .timestamp_millis_opt(raw.time as i64)
        .single()
        .ok_or_else(|| FetchError::BadTimestamp(raw.time, trade_id.clone()))?;

    Ok(Fill {
        id: trade_id.clone(),
        order_id: raw.order_id.to_string(),
        trade_id,
        symbol: raw.symbol.clone(),
        side: if raw.is_buyer { Side::Buy } else { Side::Sell },
        qty,
        price,
        fee,
        ts,
    })
}

pub struct BinanceClient {
    http: reqwest::Client,
    rest_base: String,
    api_key: String,
    api_secret: String,
    recv_window: u64,
}

impl BinanceClient {
    pub fn new(rest_base: String, api_key: String, api_secret: String, recv_window: u64) -> Self {
        Self {
            http: reqwest::Client::new(),
            rest_base,
            api_key,
            api_secret,
            recv_window,
        }
    }

    /// Fetch the full account trade history for one symbol, oldest first.
    ///
    /// Pages forward with `fromId` until a short page arrives. 429/418
    /// responses back off exponentially (0.5s doubling, capped at 32s)
    /// before retrying.
    pub async fn fetch_account_fills(
        &self,
        symbol: &str,
        start_time_ms: Option<u64>,
    ) -> Result<Vec<Fill>, FetchError> {
        let mut fills = Vec::new();
        let mut from_id: Option<u64> = None;
        let mut attempt: u32 = 0;

        loop {
            let mut params = vec![
                ("symbol".to_string(), symbol.to_ascii_uppercase()),
                ("limit".to_string(), PAGE_LIMIT.to_string()),
                ("timestamp".to_string(), timestamp_ms().to_string()),
                ("recvWindow".to_string(), self.recv_window.to_string()),
            ];
            match from_id {
                Some(id) => params.push(("fromId".to_string(), id.to_string())),
                // startTime only applies to the first page; fromId supersedes it.
                None => {
                    if let Some(st) = start_time_ms {
                        params.push(("startTime".to_string(), st.to_string()));
                    }
                }
            }

            let query = params
                .iter()
                .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
                .collect::<Vec<_>>()
                .join("&");
            let sig = sign_query(&self.api_secret, &query);
            let url = format!("{}/api/v3/myTrades?{}&signature={}", self.rest_base, query, sig);

            let rsp = self
                .http
                .get(url)
                .header("X-MBX-APIKEY", &self.api_key)
                .send()
                .await?;

            let status = rsp.status();
            if status.as_u16() == 429 || status.as_u16() == 418 {
                attempt = attempt.saturating_add(1);
                if attempt > MAX_RETRIES {
                    return Err(FetchError::Api {
                        status: status.as_u16(),
                        body: "rate limited, retries exhausted".to_string(),
                    });
                }
                let delay_ms = backoff_ms(attempt);
                warn!(%symbol, attempt, delay_ms, "rate limited, backing off");
                sleep(Duration::from_millis(delay_ms)).await;
                continue;
            }
            if !status.is_success() {
                let body = rsp.text().await.unwrap_or_default();
                return Err(FetchError::Api {
                    status: status.as_u16(),
                    body,
                });
            }
            attempt = 0;

            let page: Vec<RawTrade> = rsp.json().await?;
            let page_len = page.len();
            for raw in &page {
                fills.push(normalize(raw)?);
            }

            info!(%symbol, page_len, total = fills.len(), "fetched trades page");
            if page_len < PAGE_LIMIT as usize {
                break;
            }
            // Next page starts after the last trade id seen.
            from_id = page.last().map(|t| t.id + 1);
        }

        Ok(fills)
    }
}

/// Load fills from a JSONL file (one Fill per line), e.g. a prior export or
/// a hand-written replay fixture. Blank lines are skipped.
pub async fn load_jsonl(path: &str) -> Result<Vec<Fill>, FetchError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| FetchError::Io {
            path: path.to_string(),
            source: e,
        })?;

    let mut fills = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let fill: Fill = serde_json::from_str(line).map_err(|e| FetchError::Jsonl {
            path: path.to_string(),
            line: idx + 1,
            source: e,
        })?;
        fills.push(fill);
    }
    info!(%path, count = fills.len(), "loaded fills from file");
    Ok(fills)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn raw() -> RawTrade {
        RawTrade {
            id: 28457,
            order_id: 100234,
            symbol: "BTCUSDT".into(),
            price: "106235.40000000".into(),
            qty: "0.00037000".into(),
            commission: "0.03930710".into(),
            commission_asset: "USDT".into(),
            time: 1_735_000_000_000,
            is_buyer: true,
            is_maker: false,
        }
    }

    #[test]
    fn backoff_starts_at_half_second_and_caps() {
        assert_eq!(backoff_ms(1), 500);
        assert_eq!(backoff_ms(2), 1_000);
        assert_eq!(backoff_ms(3), 2_000);
        assert_eq!(backoff_ms(7), 32_000);
        assert_eq!(backoff_ms(100), 32_000);
    }

    #[test]
    fn normalizes_raw_trade() {
        let f = normalize(&raw()).unwrap();
        assert_eq!(f.symbol, "BTCUSDT");
        assert_eq!(f.side, Side::Buy);
        assert_eq!(f.qty, dec!(0.00037000));
        assert_eq!(f.price, dec!(106235.40000000));
        assert_eq!(f.fee, dec!(0.03930710));
        assert_eq!(f.trade_id, "28457");
        assert_eq!(f.order_id, "100234");
        assert_eq!(f.ts.timestamp_millis(), 1_735_000_000_000);
    }

    #[test]
    fn seller_side_maps_to_sell() {
        let mut r = raw();
        r.is_buyer = false;
        assert_eq!(normalize(&r).unwrap().side, Side::Sell);
    }

    #[test]
    fn rejects_non_numeric_qty() {
        let mut r = raw();
        r.qty = "abc".into();
        let err = normalize(&r).unwrap_err();
        assert!(matches!(err, FetchError::MalformedField { field: "qty", .. }));
    }

    #[test]
    fn rejects_negative_price() {
        let mut r = raw();
        r.price = "-1".into();
        assert!(matches!(
            normalize(&r).unwrap_err(),
            FetchError::MalformedField { field: "price", .. }
        ));
    }

    #[test]
    fn fill_jsonl_round_trips_through_serde() {
        let f = normalize(&raw()).unwrap();
        let line = serde_json::to_string(&f).unwrap();
        let back: Fill = serde_json::from_str(&line).unwrap();
        assert_eq!(f, back);
    }
}
