//! End-to-end scans through the public API against a mock Steam Community

use std::time::Duration;

use serde_json::json;
use steam_inventory::result_cache::ScanKey;
use steam_inventory::{Game, InventoryError, ScanConfig, Scanner, SteamId};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const STEAM_ID: &str = "76561198111717059";

fn steam_id() -> SteamId {
    SteamId::parse(STEAM_ID).unwrap()
}

fn scanner_for(mock_server: &MockServer) -> Scanner {
    scanner_with(mock_server, None)
}

fn scanner_with(mock_server: &MockServer, max_priced_assets: Option<usize>) -> Scanner {
    let config = ScanConfig {
        page_delay: Duration::ZERO,
        price_interval: Duration::from_millis(10),
        max_priced_assets,
        ..ScanConfig::with_base_url(mock_server.uri())
    };
    Scanner::new(config).unwrap()
}

fn asset(asset_id: &str, class_id: &str) -> serde_json::Value {
    json!({
        "appid": 730,
        "contextid": "2",
        "assetid": asset_id,
        "classid": class_id,
        "instanceid": "0",
        "amount": "1"
    })
}

fn description(class_id: &str, name: &str, marketable: u8) -> serde_json::Value {
    json!({
        "appid": 730,
        "classid": class_id,
        "instanceid": "0",
        "name": name,
        "market_name": name,
        "market_hash_name": name,
        "type": "Container",
        "tradable": 1,
        "marketable": marketable,
        "commodity": 1
    })
}

fn page(
    assets: Vec<serde_json::Value>,
    descriptions: Vec<serde_json::Value>,
    total: u32,
) -> serde_json::Value {
    json!({
        "assets": assets,
        "descriptions": descriptions,
        "total_inventory_count": total,
        "success": 1
    })
}

async fn mount_price(mock_server: &MockServer, name: &str, price: &str) {
    Mock::given(method("GET"))
        .and(path("/market/priceoverview/"))
        .and(query_param("market_hash_name", name))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "lowest_price": price,
            "volume": "120",
            "median_price": price
        })))
        .mount(mock_server)
        .await;
}

/// Three assets: two cases of the same kind and one unmarketable coin.
async fn mount_small_inventory(mock_server: &MockServer, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/inventory/{STEAM_ID}/730/2")))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![asset("1", "100"), asset("2", "200"), asset("3", "100")],
            vec![
                description("100", "Recoil Case", 1),
                description("200", "Service Medal", 0),
            ],
            3,
        )))
        .expect(expected_calls)
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn full_scan_then_cache_hit() {
    let mock_server = MockServer::start().await;
    mount_small_inventory(&mock_server, 1).await;
    mount_price(&mock_server, "Recoil Case", "12,40 руб.").await;

    let scanner = scanner_for(&mock_server);
    let id = scanner.resolve(STEAM_ID).await.unwrap();
    let cancel = CancellationToken::new();

    let first = scanner.scan(&id, Game::from_app_id(730), &cancel).await.unwrap();
    assert!(!first.from_cache());
    assert_eq!(first.total_count, Some(3));
    assert_eq!(first.items.len(), 2);
    assert_eq!(first.items[0].price, "12,40 руб. (lowest)");
    assert_eq!(first.skipped.not_marketable, 1);
    assert_eq!(first.price_lookups, 1);
    assert_eq!(first.stats.count, 2);
    assert!((first.stats.total_value - 24.8).abs() < 1e-9);
    assert!(first.stopped_by.is_none());

    let second = scanner.scan(&id, Game::from_app_id(730), &cancel).await.unwrap();
    assert!(second.from_cache());
    assert_eq!(second.total_count, None);
    assert_eq!(second.items, first.items);
    assert_eq!(second.stats, first.stats);
    assert_eq!(second.price_lookups, 0);
}

#[tokio::test]
async fn vanity_name_is_resolved_before_scanning() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/id/gabelogannewell/"))
        .and(query_param("xml", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "<profile><steamID64>{STEAM_ID}</steamID64></profile>"
        )))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_small_inventory(&mock_server, 1).await;
    mount_price(&mock_server, "Recoil Case", "$0.35").await;

    let scanner = scanner_for(&mock_server);
    let id = scanner
        .resolve("https://steamcommunity.com/id/gabelogannewell/")
        .await
        .unwrap();
    assert_eq!(id, steam_id());

    let report = scanner
        .scan(&id, Game::from_app_id(730), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(report.items.len(), 2);
}

#[tokio::test]
async fn unresolvable_input_is_an_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/id/nobody/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<response><error>The specified profile could not be found.</error></response>"))
        .mount(&mock_server)
        .await;

    let scanner = scanner_for(&mock_server);
    let err = scanner.resolve("nobody").await.unwrap_err();
    assert!(matches!(err, InventoryError::Unresolved(ref input) if input == "nobody"));
}

#[tokio::test]
async fn partial_read_is_reported_and_not_cached() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/inventory/{STEAM_ID}/730/2")))
        .and(query_param_is_missing("start_assetid"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "assets": [asset("1", "100")],
            "descriptions": [description("100", "Recoil Case", 1)],
            "total_inventory_count": 2,
            "more_items": 1,
            "last_assetid": "1",
            "success": 1
        })))
        .expect(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/inventory/{STEAM_ID}/730/2")))
        .and(query_param("start_assetid", "1"))
        .respond_with(ResponseTemplate::new(429))
        .expect(2)
        .mount(&mock_server)
        .await;
    mount_price(&mock_server, "Recoil Case", "5 руб.").await;

    let scanner = scanner_for(&mock_server);
    let cancel = CancellationToken::new();

    let report = scanner.scan(&steam_id(), Game::from_app_id(730), &cancel).await.unwrap();
    assert_eq!(report.items.len(), 1);
    assert!(matches!(report.stopped_by, Some(InventoryError::HttpStatus(s)) if s.as_u16() == 429));

    // Incomplete reads are scanned again rather than served from cache
    let again = scanner.scan(&steam_id(), Game::from_app_id(730), &cancel).await.unwrap();
    assert!(!again.from_cache());
}

#[tokio::test]
async fn asset_cap_truncates_before_pricing() {
    let mock_server = MockServer::start().await;
    mount_small_inventory(&mock_server, 1).await;
    mount_price(&mock_server, "Recoil Case", "1 руб.").await;

    let scanner = scanner_with(&mock_server, Some(1));
    let report = scanner
        .scan(&steam_id(), Game::from_app_id(730), &CancellationToken::new())
        .await
        .unwrap();

    assert!(report.truncated);
    assert_eq!(report.items.len(), 1);
    assert_eq!(report.items[0].asset_id, "1");
    assert_eq!(report.skipped.not_marketable, 0);
}

#[tokio::test]
async fn all_games_skips_empty_inventories() {
    let mock_server = MockServer::start().await;
    mount_small_inventory(&mock_server, 1).await;
    mount_price(&mock_server, "Recoil Case", "10 руб.").await;
    Mock::given(method("GET"))
        .and(path(format!("/inventory/{STEAM_ID}/570/2")))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![], vec![], 0)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let scanner = scanner_for(&mock_server);
    let games = [Game::from_app_id(730), Game::from_app_id(570)];
    let report = scanner
        .scan_all_games(&steam_id(), &games, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.games.len(), 1);
    assert_eq!(report.games[0].game.app_id, 730);
    assert_eq!(report.total_items, 2);
    assert!((report.total_value - 20.0).abs() < 1e-9);
}

#[tokio::test]
async fn all_games_keeps_games_that_failed_to_load() {
    let mock_server = MockServer::start().await;
    mount_small_inventory(&mock_server, 1).await;
    mount_price(&mock_server, "Recoil Case", "10 руб.").await;
    Mock::given(method("GET"))
        .and(path(format!("/inventory/{STEAM_ID}/570/2")))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&mock_server)
        .await;

    let scanner = scanner_for(&mock_server);
    let games = [Game::from_app_id(730), Game::from_app_id(570)];
    let report = scanner
        .scan_all_games(&steam_id(), &games, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.games.len(), 2);
    let dota = &report.games[1];
    assert_eq!(dota.game.app_id, 570);
    assert!(dota.items.is_empty());
    assert!(matches!(dota.stopped_by, Some(InventoryError::HttpStatus(s)) if s.as_u16() == 403));
    assert_eq!(report.total_items, 2);
}

#[tokio::test]
async fn timeout_cancels_scan_and_caches_nothing() {
    let mock_server = MockServer::start().await;
    mount_small_inventory(&mock_server, 1).await;
    Mock::given(method("GET"))
        .and(path("/market/priceoverview/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "lowest_price": "1 руб." }))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let scanner = scanner_for(&mock_server);
    let budget = Duration::from_millis(300);

    let err = scanner
        .scan_with_timeout(&steam_id(), Game::from_app_id(730), budget)
        .await
        .unwrap_err();

    assert!(matches!(err, InventoryError::Timeout(d) if d == budget));
    assert_eq!(err.kind(), "transport");
    assert!(scanner
        .cache()
        .get(&ScanKey::new(steam_id(), 730))
        .await
        .is_none());
}

#[tokio::test]
async fn cancelled_scan_returns_cancelled() {
    let mock_server = MockServer::start().await;
    mount_small_inventory(&mock_server, 0).await;

    let scanner = scanner_for(&mock_server);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = scanner
        .scan(&steam_id(), Game::from_app_id(730), &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, InventoryError::Cancelled));
}

#[tokio::test]
async fn single_price_lookup_goes_through_limiter() {
    let mock_server = MockServer::start().await;
    mount_price(&mock_server, "AK-47 | Redline (Field-Tested)", "1 052,36 руб.").await;

    let scanner = scanner_for(&mock_server);
    let price = scanner.price(730, "AK-47 | Redline (Field-Tested)").await;

    assert_eq!(price.as_deref(), Some("1 052,36 руб. (lowest)"));
    assert!(scanner.price(730, "Unknown Item").await.is_none());
}
