//! Paginated inventory retrieval with description deduplication

use std::collections::HashMap;

use tokio_util::sync::CancellationToken;

use super::SteamClient;
use crate::error::{InventoryError, Result};
use crate::models::{Asset, Description, Game, InventoryPage, ItemKey, SteamId};

/// Everything read from one application/context listing
#[derive(Debug, Default)]
pub struct AggregatedInventory {
    /// Assets in page-arrival order
    pub assets: Vec<Asset>,
    /// First description seen for each composite key
    pub descriptions: HashMap<ItemKey, Description>,
    /// Total reported by the most recent page
    pub total_count: u32,
    /// Number of pages read successfully
    pub pages: usize,
    /// Why reading stopped early; `None` when the listing was read to the end
    pub stopped_by: Option<InventoryError>,
}

impl AggregatedInventory {
    /// Merges one page: assets are appended, unseen description keys are
    /// added (existing ones are kept), and the total is replaced.
    pub fn absorb(&mut self, page: InventoryPage) {
        self.assets.extend(page.assets);
        for description in page.descriptions {
            self.descriptions
                .entry(description.key())
                .or_insert(description);
        }
        self.total_count = page.total_inventory_count;
        self.pages += 1;
    }

    pub fn description_for(&self, asset: &Asset) -> Option<&Description> {
        self.descriptions.get(&asset.key())
    }

    /// True when every page was read
    pub fn is_complete(&self) -> bool {
        self.stopped_by.is_none()
    }
}

impl SteamClient {
    /// Fetches a single inventory page, optionally continuing from `cursor`.
    pub async fn fetch_inventory_page(
        &self,
        steam_id: &SteamId,
        game: Game,
        cursor: Option<&str>,
    ) -> Result<InventoryPage> {
        let url = format!(
            "{}/inventory/{}/{}/{}",
            self.base_url, steam_id, game.app_id, game.context_id
        );

        let mut request = self.client.get(&url);
        if let Some(cursor) = cursor {
            request = request.query(&[("start_assetid", cursor)]);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(InventoryError::HttpStatus(response.status()));
        }

        let body = response.text().await?;
        let page: InventoryPage = serde_json::from_str(&body)?;

        if !page.success {
            let message = page
                .error
                .clone()
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| "success flag not set".to_string());
            return Err(InventoryError::Upstream(message));
        }

        Ok(page)
    }

    /// Reads every page of a listing.
    ///
    /// Best effort: any failure ends the loop but whatever was accumulated is
    /// returned, with the cause in `stopped_by`. No request is retried. Pages
    /// after the first are spaced by the configured page delay.
    pub async fn fetch_inventory(
        &self,
        steam_id: &SteamId,
        game: Game,
        cancel: &CancellationToken,
    ) -> AggregatedInventory {
        let mut inventory = AggregatedInventory::default();
        let mut cursor: Option<String> = None;

        log::info!("Fetching inventory for {} ({})", steam_id, game);

        loop {
            if cancel.is_cancelled() {
                inventory.stopped_by = Some(InventoryError::Cancelled);
                break;
            }

            if inventory.pages >= self.max_pages {
                log::warn!(
                    "Inventory {} still reports more items after {} pages, stopping",
                    steam_id,
                    inventory.pages
                );
                inventory.stopped_by = Some(InventoryError::PageLimitExceeded(inventory.pages));
                break;
            }

            if inventory.pages > 0 && !self.page_delay.is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(self.page_delay) => {}
                    _ = cancel.cancelled() => {
                        inventory.stopped_by = Some(InventoryError::Cancelled);
                        break;
                    }
                }
            }

            let page_number = inventory.pages + 1;
            log::debug!(
                "Fetching page {} (start_assetid={})",
                page_number,
                cursor.as_deref().unwrap_or("")
            );

            match self
                .fetch_inventory_page(steam_id, game, cursor.as_deref())
                .await
            {
                Ok(page) => {
                    let next = page.next_cursor().map(str::to_owned);
                    log::debug!(
                        "Page {}: assets={}, descriptions={}, more_items={}",
                        page_number,
                        page.assets.len(),
                        page.descriptions.len(),
                        page.more_items
                    );
                    inventory.absorb(page);

                    match next {
                        Some(next) => cursor = Some(next),
                        None => break,
                    }
                }
                Err(e) => {
                    log::debug!(
                        "Page {} of {} failed ({}): {}",
                        page_number,
                        steam_id,
                        e.kind(),
                        e
                    );
                    inventory.stopped_by = Some(e);
                    break;
                }
            }
        }

        log::info!(
            "Fetched {} assets and {} descriptions in {} page(s), total {}",
            inventory.assets.len(),
            inventory.descriptions.len(),
            inventory.pages,
            inventory.total_count
        );

        inventory
    }
}
