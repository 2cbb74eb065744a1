//! Binance API data types and structures

use serde::Deserialize;
use serde_json::Value;

use crate::market_data::{Candle, PriceText, SymbolName, TickerRow};

/// 24hr rolling window statistics from `/api/v3/ticker/24hr`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticker24hrResponse {
    pub symbol: String,
    pub last_price: String,
    pub price_change_percent: String,
    pub high_price: String,
    pub low_price: String,
    pub volume: String,
    pub quote_volume: String,
    #[serde(default)]
    pub count: u64,
    /// Milliseconds
    #[serde(default)]
    pub close_time: u64,
}

impl Ticker24hrResponse {
    /// Convert into a ticker row for `symbol`.
    ///
    /// Numeric fields must parse; volumes default to zero when absent.
    pub fn into_row(self, symbol: SymbolName) -> Result<TickerRow, RestApiError> {
        let price = parse_number("lastPrice", &self.last_price)?;
        let change_24h = parse_number("priceChangePercent", &self.price_change_percent)?;
        let high_24h = parse_number("highPrice", &self.high_price)?;
        let low_24h = parse_number("lowPrice", &self.low_price)?;

        Ok(TickerRow {
            symbol,
            price,
            change_24h,
            high_24h,
            low_24h,
            volume_base: self.volume.parse().unwrap_or(0.0),
            volume_quote: self.quote_volume.parse().unwrap_or(0.0),
            trade_count: self.count,
            timestamp: sample_time(self.close_time),
            price_text: PriceText::from_str_or_empty(&self.last_price),
            high_text: PriceText::from_str_or_empty(&self.high_price),
            low_text: PriceText::from_str_or_empty(&self.low_price),
        })
    }
}

/// Seconds of the sample; payloads without `closeTime` are stamped with the local clock
fn sample_time(close_time_ms: u64) -> u64 {
    if close_time_ms > 0 {
        close_time_ms / 1000
    } else {
        u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0).max(1)
    }
}

fn parse_number(field: &str, text: &str) -> Result<f64, RestApiError> {
    text.parse::<f64>()
        .map_err(|e| RestApiError::Parse(format!("{field} {text:?}: {e}")))
}

fn text_at(row: &[Value], idx: usize) -> Option<&str> {
    row.get(idx).and_then(Value::as_str)
}

fn number_at(row: &[Value], idx: usize) -> f64 {
    match row.get(idx) {
        Some(Value::String(s)) => s.parse().unwrap_or(0.0),
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Decode one kline array.
///
/// Layout: `[openTime, open, high, low, close, volume, closeTime,
/// quoteVolume, trades, takerBuyBase, takerBuyQuote, ignore]`.
/// Returns `None` for rows that are malformed or have a non-positive span.
pub fn parse_kline(row: &[Value]) -> Option<Candle> {
    let open_time = row.first()?.as_u64()? / 1000;
    let close_time = row.get(6)?.as_u64()? / 1000;
    if open_time >= close_time {
        return None;
    }

    let open_text = text_at(row, 1)?;
    let high_text = text_at(row, 2)?;
    let low_text = text_at(row, 3)?;
    let close_text = text_at(row, 4)?;

    let mut candle = Candle::new(
        open_time,
        close_time,
        open_text.parse().ok()?,
        high_text.parse().ok()?,
        low_text.parse().ok()?,
        close_text.parse().ok()?,
    );
    candle.open_text = PriceText::from_str_or_empty(open_text);
    candle.high_text = PriceText::from_str_or_empty(high_text);
    candle.low_text = PriceText::from_str_or_empty(low_text);
    candle.close_text = PriceText::from_str_or_empty(close_text);
    candle.volume_base = number_at(row, 5);
    candle.volume_quote = number_at(row, 7);
    candle.trade_count = row.get(8).and_then(Value::as_u64).unwrap_or(0);
    candle.taker_buy_base = number_at(row, 9);
    candle.taker_buy_quote = number_at(row, 10);
    Some(candle)
}

/// Decode a klines payload, skipping rows that fail to parse
pub fn parse_klines(rows: &[Vec<Value>]) -> Vec<Candle> {
    rows.iter().filter_map(|row| parse_kline(row)).collect()
}

/// Error types for REST API operations
#[derive(Debug, thiserror::Error)]
pub enum RestApiError {
    #[error("HTTP request error: {0}")]
    HttpRequest(String),
    #[error("HTTP status error: {0} - {1}")]
    HttpStatus(u16, String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Request timed out")]
    Timeout,
}

impl From<reqwest::Error> for RestApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RestApiError::Timeout
        } else if err.is_decode() {
            RestApiError::Parse(err.to_string())
        } else {
            RestApiError::HttpRequest(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn kline(open_ms: u64, close_ms: u64, o: &str, h: &str, l: &str, c: &str) -> Vec<Value> {
        vec![
            json!(open_ms),
            json!(o),
            json!(h),
            json!(l),
            json!(c),
            json!("12.5"),
            json!(close_ms),
            json!("1000.25"),
            json!(42),
            json!("6.0"),
            json!("480.1"),
            json!("0"),
        ]
    }

    #[test]
    fn test_ticker_response_into_row() {
        let body = r#"{
            "symbol": "BTCUSDT",
            "lastPrice": "43250.10000000",
            "priceChangePercent": "-1.250",
            "highPrice": "44000.00",
            "lowPrice": "42000.00",
            "volume": "1234.5",
            "quoteVolume": "53000000.0",
            "count": 987654,
            "closeTime": 1700000000123
        }"#;
        let response: Ticker24hrResponse = serde_json::from_str(body).unwrap();
        let row = response
            .into_row(SymbolName::new("BTCUSDT").unwrap())
            .unwrap();

        assert_eq!(row.price, 43250.1);
        assert_eq!(row.change_24h, -1.25);
        assert_eq!(row.trade_count, 987654);
        assert_eq!(row.timestamp, 1_700_000_000);
        assert_eq!(row.price_text.as_str(), "43250.10000000");
        assert_eq!(row.low_text.as_str(), "42000.00");
    }

    #[test]
    fn test_ticker_response_rejects_bad_price() {
        let body = r#"{"symbol":"BTCUSDT","lastPrice":"n/a","priceChangePercent":"0",
            "highPrice":"1","lowPrice":"1","volume":"0","quoteVolume":"0"}"#;
        let response: Ticker24hrResponse = serde_json::from_str(body).unwrap();
        let result = response.into_row(SymbolName::new("BTCUSDT").unwrap());
        assert!(matches!(result, Err(RestApiError::Parse(_))));
    }

    #[test]
    fn test_parse_kline_converts_millis_and_keeps_text() {
        let candle = parse_kline(&kline(60_000, 119_999, "1.10", "1.50", "1.00", "1.40")).unwrap();
        assert_eq!(candle.open_time, 60);
        assert_eq!(candle.close_time, 119);
        assert_eq!(candle.high, 1.5);
        assert_eq!(candle.close_text.as_str(), "1.40");
        assert_eq!(candle.volume_quote, 1000.25);
        assert_eq!(candle.trade_count, 42);
        assert_eq!(candle.taker_buy_quote, 480.1);
    }

    #[test]
    fn test_parse_klines_skips_invalid_rows() {
        let rows = vec![
            kline(0, 59_999, "1", "2", "0.5", "1.5"),
            kline(60_000, 60_000, "1", "2", "0.5", "1.5"),
            kline(120_000, 179_999, "oops", "2", "0.5", "1.5"),
            vec![json!(1)],
            kline(180_000, 239_999, "1", "2", "0.5", "1.5"),
        ];
        let candles = parse_klines(&rows);
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[1].open_time, 180);
    }
}
