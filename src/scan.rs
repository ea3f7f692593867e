//! Scan pipeline: resolve, fetch, join and price, aggregate, cache
//!
//! A [`Scanner`] owns the Steam client, the price rate limiter and the result
//! cache. Front-ends hold one scanner and translate their input into calls on
//! it; none of them re-implement any of these steps.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::ScanConfig;
use crate::error::{InventoryError, Result};
use crate::join::{join_and_price, SkipCounts, ThrottledPrices};
use crate::models::{Game, PricedItem, SteamId};
use crate::rate_limiter::RateLimiter;
use crate::result_cache::{ResultCache, ScanKey};
use crate::stats::{top_items, InventoryStats};
use crate::steam::SteamClient;

/// Outcome of scanning one application of one profile
#[derive(Debug)]
pub struct ScanReport {
    pub steam_id: SteamId,
    pub game: Game,
    /// Inventory size reported by Steam; unknown for cached results
    pub total_count: Option<u32>,
    /// Priced items in asset order
    pub items: Vec<PricedItem>,
    pub skipped: SkipCounts,
    pub stats: InventoryStats,
    pub price_lookups: usize,
    /// Assets beyond `max_priced_assets` were not priced
    pub truncated: bool,
    /// When the served result was originally computed, for cache hits
    pub cached_at: Option<DateTime<Local>>,
    /// Why the inventory read ended early, if it did
    pub stopped_by: Option<InventoryError>,
    pub elapsed: Duration,
}

impl ScanReport {
    pub fn from_cache(&self) -> bool {
        self.cached_at.is_some()
    }

    /// Most valuable items, highest first
    pub fn top_items(&self, n: usize) -> Vec<&PricedItem> {
        top_items(&self.items, n)
    }
}

/// Combined result of scanning several games
#[derive(Debug)]
pub struct MultiGameReport {
    pub steam_id: SteamId,
    /// Reports for games that had items or could not be read
    pub games: Vec<ScanReport>,
    pub total_items: usize,
    pub total_value: f64,
    pub elapsed: Duration,
}

#[derive(Clone)]
pub struct Scanner {
    client: SteamClient,
    limiter: Arc<RateLimiter>,
    cache: Arc<ResultCache>,
    config: Arc<ScanConfig>,
}

impl Scanner {
    /// Builds the pipeline. Starts the rate limiter, so a tokio runtime must be running.
    pub fn new(config: ScanConfig) -> Result<Self> {
        let client = SteamClient::new(&config)?;
        let limiter = Arc::new(RateLimiter::new(config.price_interval));
        let cache = Arc::new(ResultCache::new(config.result_ttl));

        Ok(Self {
            client,
            limiter,
            cache,
            config: Arc::new(config),
        })
    }

    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Starts the periodic sweep of expired results (long-running front-ends).
    pub fn spawn_cache_sweeper(&self) -> JoinHandle<()> {
        self.cache.spawn_sweeper(self.config.sweep_interval)
    }

    /// Resolves user input to a Steam ID.
    pub async fn resolve(&self, input: &str) -> Result<SteamId> {
        self.client
            .resolve_identity(input)
            .await
            .ok_or_else(|| InventoryError::Unresolved(input.trim().to_string()))
    }

    /// Looks up one item's price through the rate limiter.
    pub async fn price(&self, app_id: u32, market_hash_name: &str) -> Option<String> {
        self.limiter.acquire().await;
        self.client.lowest_price(app_id, market_hash_name).await
    }

    /// Scans one game, serving from the result cache when possible.
    ///
    /// Only cancellation is an error. Fetch failures produce a partial report
    /// with the cause in [`ScanReport::stopped_by`].
    pub async fn scan(
        &self,
        steam_id: &SteamId,
        game: Game,
        cancel: &CancellationToken,
    ) -> Result<ScanReport> {
        let started = Instant::now();
        let key = ScanKey::new(steam_id.clone(), game.app_id);

        if let Some(hit) = self.cache.get(&key).await {
            log::info!(
                "Using cached scan for {} ({}) from {}",
                steam_id,
                game,
                hit.created_at.format("%H:%M:%S")
            );
            return Ok(ScanReport {
                steam_id: steam_id.clone(),
                game,
                total_count: None,
                stats: InventoryStats::from_items(&hit.items),
                items: hit.items,
                skipped: SkipCounts::default(),
                price_lookups: 0,
                truncated: false,
                cached_at: Some(hit.created_at),
                stopped_by: None,
                elapsed: started.elapsed(),
            });
        }

        let inventory = self.client.fetch_inventory(steam_id, game, cancel).await;
        if matches!(inventory.stopped_by, Some(InventoryError::Cancelled)) {
            return Err(InventoryError::Cancelled);
        }

        let mut assets = inventory.assets.as_slice();
        let mut truncated = false;
        if let Some(limit) = self.config.max_priced_assets {
            if assets.len() > limit {
                log::info!(
                    "Inventory has {} assets, pricing only the first {}",
                    assets.len(),
                    limit
                );
                assets = &assets[..limit];
                truncated = true;
            }
        }

        let prices = ThrottledPrices::new(&self.client, &self.limiter);
        let outcome = join_and_price(
            assets,
            &inventory.descriptions,
            game.app_id,
            &prices,
            cancel,
        )
        .await;
        if outcome.cancelled {
            return Err(InventoryError::Cancelled);
        }

        let stats = InventoryStats::from_items(&outcome.items);

        if inventory.is_complete() && !outcome.items.is_empty() {
            self.cache.set(key, outcome.items.clone()).await;
        }

        let report = ScanReport {
            steam_id: steam_id.clone(),
            game,
            total_count: Some(inventory.total_count),
            items: outcome.items,
            skipped: outcome.skipped,
            stats,
            price_lookups: outcome.price_lookups,
            truncated,
            cached_at: None,
            stopped_by: inventory.stopped_by,
            elapsed: started.elapsed(),
        };

        log::info!(
            "Scan of {} ({}) finished in {:.1}s: {} priced of {} total, value {:.2}",
            steam_id,
            game,
            report.elapsed.as_secs_f64(),
            report.stats.count,
            inventory.total_count,
            report.stats.total_value
        );

        Ok(report)
    }

    /// Runs [`Scanner::scan`] on its own task with a wall-clock budget.
    ///
    /// When the budget runs out the scan is cancelled and `Timeout` is
    /// returned; the task stops at its next page or price boundary and caches nothing.
    pub async fn scan_with_timeout(
        &self,
        steam_id: &SteamId,
        game: Game,
        budget: Duration,
    ) -> Result<ScanReport> {
        let cancel = CancellationToken::new();
        let scanner = self.clone();
        let task_id = steam_id.clone();
        let task_cancel = cancel.clone();

        let mut task =
            tokio::spawn(async move { scanner.scan(&task_id, game, &task_cancel).await });

        match tokio::time::timeout(budget, &mut task).await {
            Ok(joined) => joined?,
            Err(_) => {
                log::warn!(
                    "Scan of {} ({}) exceeded {:?}, cancelling",
                    steam_id,
                    game,
                    budget
                );
                cancel.cancel();
                Err(InventoryError::Timeout(budget))
            }
        }
    }

    /// Scans each game in turn. Games whose inventory was read and found
    /// empty are left out; failed reads are kept with their cause.
    pub async fn scan_all_games(
        &self,
        steam_id: &SteamId,
        games: &[Game],
        cancel: &CancellationToken,
    ) -> Result<MultiGameReport> {
        let started = Instant::now();
        let mut reports = Vec::new();

        for &game in games {
            let report = self.scan(steam_id, game, cancel).await?;

            if let Some(cause) = &report.stopped_by {
                log::info!("{}: inventory not fully read ({}): {}", game, cause.kind(), cause);
            } else if report.total_count == Some(0) && report.items.is_empty() {
                log::debug!("{}: no items", game);
                continue;
            }
            reports.push(report);
        }

        let total_items = reports.iter().map(|r| r.stats.count).sum();
        let total_value = reports.iter().map(|r| r.stats.total_value).sum();

        Ok(MultiGameReport {
            steam_id: steam_id.clone(),
            games: reports,
            total_items,
            total_value,
            elapsed: started.elapsed(),
        })
    }
}
