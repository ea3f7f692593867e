//! Joins assets to their descriptions, filters to sellable items and prices them

use std::collections::HashMap;
use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::models::{Asset, Description, ItemKey, PricedItem};
use crate::rate_limiter::RateLimiter;
use crate::steam::SteamClient;

/// Anything that can quote a market price for an item
pub trait PriceSource {
    /// Annotated price string, or `None` when no price is available.
    fn lowest_price(
        &self,
        app_id: u32,
        market_hash_name: &str,
    ) -> impl Future<Output = Option<String>> + Send;
}

/// Steam market lookups spaced out by a rate limiter
pub struct ThrottledPrices<'a> {
    client: &'a SteamClient,
    limiter: &'a RateLimiter,
}

impl<'a> ThrottledPrices<'a> {
    pub fn new(client: &'a SteamClient, limiter: &'a RateLimiter) -> Self {
        Self { client, limiter }
    }
}

impl PriceSource for ThrottledPrices<'_> {
    async fn lowest_price(&self, app_id: u32, market_hash_name: &str) -> Option<String> {
        self.limiter.acquire().await;
        self.client.lowest_price(app_id, market_hash_name).await
    }
}

/// Prices already looked up during one scan, keyed by market hash name.
/// Misses are remembered too, so each name is requested at most once.
#[derive(Debug, Default)]
pub struct PriceCache {
    prices: HashMap<String, Option<String>>,
    lookups: usize,
}

impl PriceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn resolve<P: PriceSource>(
        &mut self,
        source: &P,
        app_id: u32,
        market_hash_name: &str,
    ) -> Option<String> {
        if let Some(cached) = self.prices.get(market_hash_name) {
            return cached.clone();
        }

        let price = source.lowest_price(app_id, market_hash_name).await;
        self.lookups += 1;
        self.prices
            .insert(market_hash_name.to_string(), price.clone());
        price
    }

    /// Number of external lookups performed
    pub fn lookups(&self) -> usize {
        self.lookups
    }
}

/// Why assets did not become priced items
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SkipCounts {
    pub no_description: usize,
    pub not_marketable: usize,
    pub no_market_hash: usize,
    /// Sellable, but the market returned no price
    pub unpriced: usize,
}

#[derive(Debug, Default)]
pub struct JoinOutcome {
    /// Priced items in asset order
    pub items: Vec<PricedItem>,
    pub skipped: SkipCounts,
    pub price_lookups: usize,
    /// Set when the cancellation token fired before every asset was handled
    pub cancelled: bool,
}

/// Walks assets in order, keeps marketable ones with a hash name and a price.
pub async fn join_and_price<P: PriceSource + Sync>(
    assets: &[Asset],
    descriptions: &HashMap<ItemKey, Description>,
    app_id: u32,
    source: &P,
    cancel: &CancellationToken,
) -> JoinOutcome {
    let mut outcome = JoinOutcome::default();
    let mut prices = PriceCache::new();

    for asset in assets {
        let Some(description) = descriptions.get(&asset.key()) else {
            outcome.skipped.no_description += 1;
            continue;
        };

        if !description.marketable {
            outcome.skipped.not_marketable += 1;
            continue;
        }

        if description.market_hash_name.is_empty() {
            outcome.skipped.no_market_hash += 1;
            continue;
        }

        if cancel.is_cancelled() {
            outcome.cancelled = true;
            break;
        }

        match prices
            .resolve(source, app_id, &description.market_hash_name)
            .await
        {
            Some(price) => outcome
                .items
                .push(PricedItem::new(asset, description, price)),
            None => outcome.skipped.unpriced += 1,
        }
    }

    outcome.price_lookups = prices.lookups();

    log::debug!(
        "Skipped - no description: {}, not marketable: {}, no hash: {}, no price: {}",
        outcome.skipped.no_description,
        outcome.skipped.not_marketable,
        outcome.skipped.no_market_hash,
        outcome.skipped.unpriced
    );

    outcome
}
