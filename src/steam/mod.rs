//! Steam Community client: profile resolution, paginated inventories and
//! market price lookups.
//!
//! Uses async reqwest with one shared connection pool. Every request carries
//! the configured timeout and a browser-like User-Agent; no credentials are sent.

mod identity;
mod inventory;
mod market;

pub use identity::{classify_input, IdentityInput};
pub use inventory::AggregatedInventory;
pub use market::{parse_price, LOWEST_PRICE_SUFFIX};

use reqwest::Client;
use std::time::Duration;

use crate::config::ScanConfig;
use crate::error::Result;

/// HTTP client for the Steam Community endpoints
#[derive(Debug, Clone)]
pub struct SteamClient {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) page_delay: Duration,
    pub(crate) max_pages: usize,
    pub(crate) currency: u32,
}

impl SteamClient {
    /// Builds a client from the scan configuration.
    pub fn new(config: &ScanConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        log::debug!("Created Steam client for {}", config.base_url);

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            page_delay: config.page_delay,
            max_pages: config.max_pages.max(1),
            currency: config.currency,
        })
    }
}



#[cfg(test)]
#[path = "market_tests.rs"]
mod market_tests;
