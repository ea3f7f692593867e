//! Steam market price lookups and price string normalization

use super::SteamClient;
use crate::error::{InventoryError, Result};
use crate::models::MarketPriceResponse;

/// Annotation appended to prices taken from the `lowest_price` field
pub const LOWEST_PRICE_SUFFIX: &str = " (lowest)";

impl SteamClient {
    /// Fetches the raw price overview for one market hash name.
    pub async fn fetch_price_overview(
        &self,
        app_id: u32,
        market_hash_name: &str,
    ) -> Result<MarketPriceResponse> {
        let url = format!(
            "{}/market/priceoverview/?appid={}&currency={}&market_hash_name={}",
            self.base_url,
            app_id,
            self.currency,
            urlencoding::encode(market_hash_name)
        );

        log::debug!("Fetching market price: {}", market_hash_name);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(InventoryError::HttpStatus(response.status()));
        }

        let body = response.text().await?;
        let overview: MarketPriceResponse = serde_json::from_str(&body)?;
        if !overview.success {
            return Err(InventoryError::Upstream(format!(
                "no price overview for {}",
                market_hash_name
            )));
        }

        Ok(overview)
    }

    /// Lowest listed price, annotated with [`LOWEST_PRICE_SUFFIX`].
    ///
    /// Any failure or a missing `lowest_price` yields `None`.
    pub async fn lowest_price(&self, app_id: u32, market_hash_name: &str) -> Option<String> {
        match self.fetch_price_overview(app_id, market_hash_name).await {
            Ok(overview) => {
                let price = overview
                    .lowest_price
                    .as_deref()
                    .map(str::trim)
                    .filter(|p| !p.is_empty())?;
                Some(format!("{}{}", price, LOWEST_PRICE_SUFFIX))
            }
            Err(e) => {
                log::debug!(
                    "Price lookup for '{}' failed ({}): {}",
                    market_hash_name,
                    e.kind(),
                    e
                );
                None
            }
        }
    }
}

/// Converts a market price string to a number.
///
/// Drops the lowest-price annotation, whitespace and any currency text,
/// then reads the leading number. The last `,` or `.` is the decimal
/// separator unless it repeats, in which case every separator groups digits.
/// Unparseable input gives `0.0`.
pub fn parse_price(price: &str) -> f64 {
    let price = price.trim().replacen(LOWEST_PRICE_SUFFIX, "", 1);

    let numeric: String = price
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();
    // Currency abbreviations like "руб." leave a trailing separator behind
    let numeric = normalize_separators(numeric.trim_end_matches([',', '.']));

    leading_number(&numeric).unwrap_or(0.0)
}

/// Rewrites the decimal separator as `.` and drops grouping marks
fn normalize_separators(s: &str) -> String {
    let Some(decimal_at) = s.rfind([',', '.']) else {
        return s.to_string();
    };
    let decimal = char::from(s.as_bytes()[decimal_at]);
    let grouping_only = s[..decimal_at].contains(decimal);

    s.char_indices()
        .filter_map(|(i, c)| match c {
            ',' | '.' if i == decimal_at && !grouping_only => Some('.'),
            ',' | '.' => None,
            c => Some(c),
        })
        .collect()
}

/// Longest prefix of `s` that reads as a decimal number
fn leading_number(s: &str) -> Option<f64> {
    let mut end = 0;
    let mut seen_dot = false;

    for (i, c) in s.char_indices() {
        match c {
            '-' if i == 0 => {}
            '.' if !seen_dot => seen_dot = true,
            c if c.is_ascii_digit() => {}
            _ => break,
        }
        end = i + c.len_utf8();
    }

    s[..end].trim_end_matches('.').parse().ok()
}
