//! Integration tests for the monitoring cycle.
//!
//! Stands up two `wiremock` servers per test, one playing the stock
//! provider and one playing the channel API, and drives
//! `run_monitor_cycle` against them. Covers the restock transition
//! (alert exactly once), per-product failure isolation, and the
//! overlapping-cycle guard.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::RwLock;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use restockd_bot::monitor::{run_monitor_cycle, MonitorContext};
use restockd_bot::sink::ChannelSink;
use restockd_core::{Catalog, Priority, ProductSpec, StatusStore};
use restockd_lookup::StockClient;

fn spec(sku: &str, zip_code: &str) -> ProductSpec {
    ProductSpec {
        sku: sku.to_string(),
        zip_code: zip_code.to_string(),
        name: format!("Product {sku}"),
        priority: Priority::Medium,
        category: "Trading Cards".to_string(),
        set_name: "Test Set".to_string(),
    }
}

/// Payload with one location that has pickup stock.
fn in_stock_body() -> serde_json::Value {
    json!({
        "items": [{
            "sku": "6614259",
            "locations": [{
                "locationId": 101,
                "availability": {"availablePickupQuantity": 3}
            }]
        }],
        "locations": [{"id": 101, "name": "Best Buy Torrance", "city": "Torrance"}]
    })
}

/// Payload with one location and zero quantity everywhere.
fn out_of_stock_body() -> serde_json::Value {
    json!({
        "items": [{
            "sku": "6614259",
            "locations": [{
                "locationId": 101,
                "availability": {"availablePickupQuantity": 0}
            }]
        }],
        "locations": [{"id": 101, "name": "Best Buy Torrance", "city": "Torrance"}]
    })
}

/// Mounts a catch-all 200 on the channel server's message endpoint.
async fn mount_channel(channel: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/channels/42/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({"id": "1"})))
        .mount(channel)
        .await;
}

fn test_context(provider: &MockServer, channel: &MockServer, catalog: Catalog) -> MonitorContext {
    let client = StockClient::with_base_url(5, "restockd-test/1.0", &provider.uri())
        .expect("failed to build test StockClient");
    let sink = ChannelSink::with_base_url("test-token", 42, 7, &channel.uri())
        .expect("failed to build test ChannelSink");
    MonitorContext::new(
        Arc::new(RwLock::new(catalog)),
        Arc::new(RwLock::new(StatusStore::default())),
        client,
        sink,
        2,
    )
}

// ---------------------------------------------------------------------------
// Restock transition alerts exactly once
// ---------------------------------------------------------------------------

/// Out of stock on the first cycle, in stock from the second onwards:
/// exactly one alert goes out, on the cycle where the transition happens.
#[tokio::test]
async fn restock_transition_alerts_exactly_once() {
    let provider = MockServer::start().await;
    let channel = MockServer::start().await;
    mount_channel(&channel).await;

    // First stock request returns the out-of-stock payload (served once).
    Mock::given(method("GET"))
        .and(path("/stock/bestbuy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&out_of_stock_body()))
        .up_to_n_times(1)
        .mount(&provider)
        .await;

    // Later requests fall through to the in-stock payload.
    Mock::given(method("GET"))
        .and(path("/stock/bestbuy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&in_stock_body()))
        .mount(&provider)
        .await;

    let catalog =
        Catalog::from_products(vec![spec("6614259", "90503")]).expect("catalog should build");
    let ctx = test_context(&provider, &channel, catalog);

    run_monitor_cycle(&ctx).await;
    let sent = channel.received_requests().await.expect("requests recorded");
    assert!(sent.is_empty(), "no alert while still out of stock");

    run_monitor_cycle(&ctx).await;
    let sent = channel.received_requests().await.expect("requests recorded");
    assert_eq!(sent.len(), 1, "one alert on the restock transition");

    run_monitor_cycle(&ctx).await;
    let sent = channel.received_requests().await.expect("requests recorded");
    assert_eq!(sent.len(), 1, "no repeat alert while stock persists");

    let body: serde_json::Value =
        serde_json::from_slice(&sent[0].body).expect("alert body should be JSON");
    assert_eq!(
        body["content"], "<@7>",
        "alert should mention the operator in the content"
    );
    assert_eq!(body["embeds"][0]["title"], "📦 RESTOCK ALERT! 📦");
    assert_eq!(
        body["embeds"][0]["description"],
        "**Product 6614259** is back in stock!"
    );
}

// ---------------------------------------------------------------------------
// Provider failures stay contained to their product
// ---------------------------------------------------------------------------

/// A 404 for one product must not block the alert or the status update
/// for the other, and must leave no record behind for the failed one.
#[tokio::test]
async fn provider_failure_does_not_block_other_products() {
    let provider = MockServer::start().await;
    let channel = MockServer::start().await;
    mount_channel(&channel).await;

    Mock::given(method("GET"))
        .and(path("/stock/bestbuy"))
        .and(query_param("sku", "1000001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&in_stock_body()))
        .mount(&provider)
        .await;

    Mock::given(method("GET"))
        .and(path("/stock/bestbuy"))
        .and(query_param("sku", "2000002"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&provider)
        .await;

    let catalog = Catalog::from_products(vec![spec("1000001", "90503"), spec("2000002", "90503")])
        .expect("catalog should build");
    let ctx = test_context(&provider, &channel, catalog);

    run_monitor_cycle(&ctx).await;

    let sent = channel.received_requests().await.expect("requests recorded");
    assert_eq!(sent.len(), 1, "only the healthy product should alert");

    let store = ctx.store.read().await;
    assert!(
        store.get("1000001", "90503").is_some(),
        "healthy product should have a status record"
    );
    assert!(
        store.get("2000002", "90503").is_none(),
        "failed check should leave no status record"
    );
}

// ---------------------------------------------------------------------------
// Overlapping cycles are skipped, not queued
// ---------------------------------------------------------------------------

/// Two concurrent cycle invocations on the same context: the second one
/// finds the guard held and returns without touching the provider.
#[tokio::test]
async fn concurrent_cycle_is_skipped() {
    let provider = MockServer::start().await;
    let channel = MockServer::start().await;
    mount_channel(&channel).await;

    Mock::given(method("GET"))
        .and(path("/stock/bestbuy"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(&in_stock_body())
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&provider)
        .await;

    let catalog =
        Catalog::from_products(vec![spec("6614259", "90503")]).expect("catalog should build");
    let ctx = test_context(&provider, &channel, catalog);

    tokio::join!(run_monitor_cycle(&ctx), run_monitor_cycle(&ctx));

    let checked = provider
        .received_requests()
        .await
        .expect("requests recorded");
    assert_eq!(
        checked.len(),
        1,
        "the overlapping cycle should skip instead of re-checking"
    );
}
