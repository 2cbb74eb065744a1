//! REST client tests against a local mock server

use std::time::Duration;

use cticker::binance::{BinanceRestClient, MarketDataClient, RestApiError};
use cticker::market_data::{Period, SymbolName};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn btc() -> SymbolName {
    SymbolName::new("BTCUSDT").unwrap()
}

fn ticker_body() -> serde_json::Value {
    json!({
        "symbol": "BTCUSDT",
        "lastPrice": "43250.10000000",
        "priceChangePercent": "2.500",
        "highPrice": "44000.00000000",
        "lowPrice": "42000.00000000",
        "volume": "12345.67800000",
        "quoteVolume": "530000000.12000000",
        "count": 1200345,
        "closeTime": 1700000000123u64
    })
}

fn kline(open_ms: u64, close_ms: u64, open: &str, close: &str) -> serde_json::Value {
    json!([
        open_ms, open, "110.0", "90.0", close, "15.5", close_ms,
        "1600.25", 42, "7.0", "700.5", "0"
    ])
}

#[tokio::test]
async fn test_fetch_snapshot_maps_ticker_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/ticker/24hr"))
        .and(query_param("symbol", "BTCUSDT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ticker_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = BinanceRestClient::new(server.uri());
    let row = client.fetch_snapshot(&btc()).await.unwrap();

    assert_eq!(row.symbol, btc());
    assert_eq!(row.price, 43250.1);
    assert_eq!(row.change_24h, 2.5);
    assert_eq!(row.high_24h, 44000.0);
    assert_eq!(row.low_24h, 42000.0);
    assert_eq!(row.trade_count, 1_200_345);
    assert_eq!(row.timestamp, 1_700_000_000);
    assert_eq!(row.price_text.as_str(), "43250.10000000");
    assert!(row.has_data());
}

#[tokio::test]
async fn test_fetch_snapshot_trailing_slash_in_base_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/ticker/24hr"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ticker_body()))
        .mount(&server)
        .await;

    let client = BinanceRestClient::new(format!("{}/", server.uri()));
    assert!(client.fetch_snapshot(&btc()).await.is_ok());
}

#[tokio::test]
async fn test_fetch_snapshot_http_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/ticker/24hr"))
        .respond_with(
            ResponseTemplate::new(400).set_body_string(r#"{"code":-1121,"msg":"Invalid symbol."}"#),
        )
        .mount(&server)
        .await;

    let client = BinanceRestClient::new(server.uri());
    match client.fetch_snapshot(&btc()).await {
        Err(RestApiError::HttpStatus(400, body)) => assert!(body.contains("Invalid symbol")),
        other => panic!("expected HTTP 400, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_snapshot_malformed_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/ticker/24hr"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = BinanceRestClient::new(server.uri());
    assert!(matches!(
        client.fetch_snapshot(&btc()).await,
        Err(RestApiError::Json(_))
    ));
}

#[tokio::test]
async fn test_fetch_snapshot_unparsable_price() {
    let mut body = ticker_body();
    body["lastPrice"] = json!("n/a");

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/ticker/24hr"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let client = BinanceRestClient::new(server.uri());
    assert!(matches!(
        client.fetch_snapshot(&btc()).await,
        Err(RestApiError::Parse(_))
    ));
}

#[tokio::test]
async fn test_fetch_snapshot_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/ticker/24hr"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(ticker_body())
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let client = BinanceRestClient::with_timeout(server.uri(), Duration::from_millis(50));
    assert!(matches!(
        client.fetch_snapshot(&btc()).await,
        Err(RestApiError::Timeout)
    ));
}

#[tokio::test]
async fn test_fetch_candles_requests_interval_and_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/klines"))
        .and(query_param("symbol", "BTCUSDT"))
        .and(query_param("interval", "4h"))
        .and(query_param("limit", "180"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            kline(1_700_000_000_000, 1_700_014_399_999, "100.0", "105.0"),
            kline(1_700_014_400_000, 1_700_028_799_999, "105.0", "98.5"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = BinanceRestClient::new(server.uri());
    let candles = client.fetch_candles(&btc(), Period::FourHours).await.unwrap();

    assert_eq!(candles.len(), 2);
    assert_eq!(candles[0].open_time, 1_700_000_000);
    assert_eq!(candles[0].close_time, 1_700_014_399);
    assert!(candles[0].is_bullish());
    assert!(!candles[1].is_bullish());
    assert_eq!(candles[1].close_text.as_str(), "98.5");
    assert_eq!(candles[1].trade_count, 42);
    assert_eq!(candles[1].taker_buy_quote, 700.5);
}

#[tokio::test]
async fn test_fetch_candles_skips_malformed_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/klines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            kline(1_700_000_000_000, 1_700_086_399_999, "100.0", "101.0"),
            ["garbage"],
            kline(1_700_086_400_000, 1_700_086_400_000, "101.0", "102.0"),
        ])))
        .mount(&server)
        .await;

    let client = BinanceRestClient::new(server.uri());
    let candles = client.fetch_candles(&btc(), Period::OneDay).await.unwrap();
    assert_eq!(candles.len(), 1);
}
