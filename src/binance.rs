// ===============================
// src/binance.rs
// ===============================
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};

pub fn timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

pub fn sign_query(secret: &str, query: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC can take key");
    mac.update(query.as_bytes());
    let sig = mac.finalize().into_bytes();
    hex::encode(sig)
}

// ---- Minimal account-trade model (GET /api/v3/myTrades) ----
//
// Numeric fields arrive as strings; they are parsed into Decimal at the
// normalization boundary in fetch.rs, not here.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTrade {
    pub id: u64,
    pub order_id: u64,
    pub symbol: String,
    pub price: String,
    pub qty: String,
    pub commission: String,
    pub commission_asset: String,
    pub time: u64, // epoch millis
    pub is_buyer: bool,
    pub is_maker: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_query_matches_binance_docs_vector() {
        // Test vector from the official signed-endpoint examples.
        let secret = "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j";
        let query = "symbol=LTCBTC&side=BUY&type=LIMIT&timeInForce=GTC&quantity=1&price=0.1&recvWindow=5000&timestamp=1499827319559";
        assert_eq!(
            sign_query(secret, query),
            "c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b71"
        );
    }

    #[test]
    fn parses_my_trades_payload() {
        let body = r#"[{
            "symbol": "BTCUSDT",
            "id": 28457,
            "orderId": 100234,
            "orderListId": -1,
            "price": "106235.40000000",
            "qty": "0.00037000",
            "quoteQty": "39.30709800",
            "commission": "0.03930710",
            "commissionAsset": "USDT",
            "time": 1735000000000,
            "isBuyer": true,
            "isMaker": false,
            "isBestMatch": true
        }]"#;
        let trades: Vec<RawTrade> = serde_json::from_str(body).unwrap();
        assert_eq!(trades.len(), 1);
        let t = &trades[0];
        assert_eq!(t.id, 28457);
        assert_eq!(t.order_id, 100234);
        assert_eq!(t.symbol, "BTCUSDT");
        assert!(t.is_buyer);
        assert_eq!(t.price, "106235.40000000");
        assert_eq!(t.commission_asset, "USDT");
    }
}
