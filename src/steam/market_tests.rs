//! Tests for market price lookups

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::{parse_price, SteamClient};
use crate::config::{ScanConfig, BROWSER_USER_AGENT};
use crate::error::InventoryError;

const REDLINE: &str = "AK-47 | Redline (Field-Tested)";

fn client_for(mock_server: &MockServer) -> SteamClient {
    SteamClient::new(&ScanConfig::with_base_url(mock_server.uri())).unwrap()
}

// ── parse_price ──────────────────────────────────────────────────────

#[test]
fn parses_rouble_price_with_annotation() {
    assert!((parse_price("15,50 руб. (lowest)") - 15.50).abs() < 1e-9);
}

#[test]
fn garbage_parses_to_zero() {
    assert_eq!(parse_price("garbage"), 0.0);
    assert_eq!(parse_price(""), 0.0);
}

#[test]
fn removes_thousands_separators() {
    assert!((parse_price("1 234,56 руб.") - 1234.56).abs() < 1e-9);
}

#[test]
fn handles_prefixed_currency_symbols() {
    assert!((parse_price("$3.07 (lowest)") - 3.07).abs() < 1e-9);
    assert!((parse_price("2,10€") - 2.10).abs() < 1e-9);
}

#[test]
fn grouping_marks_are_not_decimal_points() {
    assert!((parse_price("$1,234.56 (lowest)") - 1234.56).abs() < 1e-9);
    assert!((parse_price("1.234,56€") - 1234.56).abs() < 1e-9);
    assert!((parse_price("1.234.567 руб.") - 1234567.0).abs() < 1e-9);
    assert!((parse_price("$1,000,000") - 1_000_000.0).abs() < 1e-9);
}

#[test]
fn whole_numbers_parse() {
    assert_eq!(parse_price("42 руб."), 42.0);
}

// ── lowest_price ─────────────────────────────────────────────────────

#[tokio::test]
async fn returns_annotated_lowest_price() {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server);

    Mock::given(method("GET"))
        .and(path("/market/priceoverview/"))
        .and(query_param("appid", "730"))
        .and(query_param("currency", "5"))
        .and(query_param("market_hash_name", REDLINE))
        .and(header("User-Agent", BROWSER_USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "lowest_price": " 1 052,36 руб. ",
            "volume": "1,184",
            "median_price": "1 060,00 руб."
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let price = client.lowest_price(730, REDLINE).await;
    assert_eq!(price.as_deref(), Some("1 052,36 руб. (lowest)"));
    assert!((parse_price(price.as_deref().unwrap()) - 1052.36).abs() < 1e-9);
}

#[tokio::test]
async fn missing_lowest_price_is_empty() {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server);

    Mock::given(method("GET"))
        .and(path("/market/priceoverview/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "median_price": "10,00 руб."
        })))
        .mount(&mock_server)
        .await;

    assert!(client.lowest_price(730, REDLINE).await.is_none());
}

#[tokio::test]
async fn unsuccessful_overview_is_empty() {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server);

    Mock::given(method("GET"))
        .and(path("/market/priceoverview/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": false })))
        .mount(&mock_server)
        .await;

    assert!(client.lowest_price(730, REDLINE).await.is_none());
    assert!(matches!(
        client.fetch_price_overview(730, REDLINE).await,
        Err(InventoryError::Upstream(_))
    ));
}

#[tokio::test]
async fn rate_limited_response_is_empty() {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server);

    Mock::given(method("GET"))
        .and(path("/market/priceoverview/"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock_server)
        .await;

    assert!(client.lowest_price(730, REDLINE).await.is_none());
}

#[tokio::test]
async fn non_json_response_is_empty() {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server);

    Mock::given(method("GET"))
        .and(path("/market/priceoverview/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>busy</html>"))
        .mount(&mock_server)
        .await;

    assert!(client.lowest_price(730, REDLINE).await.is_none());
    assert!(matches!(
        client.fetch_price_overview(730, REDLINE).await,
        Err(InventoryError::Parse(_))
    ));
}
