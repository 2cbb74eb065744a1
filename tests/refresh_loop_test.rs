//! Refresh loop behaviour through the runtime context

use std::sync::Arc;
use std::time::Duration;

use cticker::binance::mock::MockMarketDataClient;
use cticker::config::{Settings, Watchlist};
use cticker::market_data::{FetchStatus, SymbolName};
use cticker::session::RuntimeContext;

fn sym(name: &str) -> SymbolName {
    SymbolName::new(name).unwrap()
}

fn context_with(names: &[&str]) -> (RuntimeContext, Arc<MockMarketDataClient>) {
    let client = Arc::new(MockMarketDataClient::new());
    let watchlist = Watchlist::new(names.iter().map(|n| sym(n)).collect());
    let context = RuntimeContext::new(Settings::default(), watchlist, client.clone()).unwrap();
    (context, client)
}

#[tokio::test]
async fn test_initial_fetch_fills_store_in_watchlist_order() {
    let (context, client) = context_with(&["ETHUSDT", "BTCUSDT", "BNBUSDT"]);
    client.set_price(sym("BTCUSDT"), 43000.0);
    client.set_price(sym("ETHUSDT"), 2300.0);
    client.set_price(sym("BNBUSDT"), 250.0);

    let report = context.refresh_loop().initial_fetch().await.unwrap();
    assert_eq!(report.updated, 3);
    assert_eq!(context.status().get(), FetchStatus::Normal);

    let mut rows = Vec::new();
    context.store().snapshot_into(&mut rows);
    let symbols: Vec<_> = rows.iter().map(|r| r.symbol.to_string()).collect();
    assert_eq!(symbols, ["ETHUSDT", "BTCUSDT", "BNBUSDT"]);
    assert_eq!(rows[1].price, 43000.0);
}

#[tokio::test]
async fn test_failed_symbol_reports_network_error_then_recovers() {
    let (context, client) = context_with(&["BTCUSDT", "ETHUSDT"]);
    client.set_price(sym("BTCUSDT"), 43000.0);
    client.set_price(sym("ETHUSDT"), 2300.0);
    client.fail_symbol(sym("ETHUSDT"));

    let mut refresh = context.refresh_loop();
    let report = refresh.initial_fetch().await.unwrap();
    assert_eq!(report.failed, 1);
    assert_eq!(context.status().get(), FetchStatus::NetworkError);
    assert!(context.store().row_at(0).unwrap().has_data());
    assert!(!context.store().row_at(1).unwrap().has_data());
    assert_eq!(context.metrics().snapshot().failed_fetches, 1);

    client.recover_symbol(sym("ETHUSDT"));
    let report = refresh.run_cycle().await.unwrap();
    assert_eq!(report.failed, 0);
    assert_eq!(context.status().get(), FetchStatus::Normal);
    assert_eq!(context.store().row_at(1).unwrap().price, 2300.0);
    assert_eq!(context.metrics().snapshot().cycles, 2);
}

#[tokio::test(start_paused = true)]
async fn test_background_loop_publishes_new_prices_each_interval() {
    let (context, client) = context_with(&["BTCUSDT"]);
    client.set_price(sym("BTCUSDT"), 100.0);

    let mut refresh = context.refresh_loop();
    refresh.initial_fetch().await.unwrap();
    let task = tokio::spawn(refresh.run());

    client.set_price(sym("BTCUSDT"), 101.0);
    tokio::time::sleep(Duration::from_millis(100)).await;
    // Primed by the initial fetch, so nothing new yet
    assert_eq!(context.store().row_at(0).unwrap().price, 100.0);
    assert_eq!(client.snapshot_calls(), 1);

    tokio::time::sleep(context.settings().refresh_interval()).await;
    assert_eq!(context.store().row_at(0).unwrap().price, 101.0);

    context.request_shutdown();
    tokio::time::timeout(Duration::from_secs(1), task)
        .await
        .expect("refresh loop should stop within one poll")
        .unwrap();
    assert!(!context.is_running());
}

#[tokio::test]
async fn test_signal_task_exits_when_shutdown_requested() {
    let (context, _client) = context_with(&["BTCUSDT"]);
    let handle = context.install_signal_handlers();

    context.request_shutdown();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("signal task should observe shutdown")
        .unwrap();
}

#[test]
fn test_empty_watchlist_is_rejected() {
    let client = Arc::new(MockMarketDataClient::new());
    let result = RuntimeContext::new(Settings::default(), Watchlist::new(Vec::new()), client);
    assert!(result.is_err());
}
