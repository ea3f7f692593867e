//! Scan configuration

use std::time::Duration;

/// Steam Community host serving inventories, market prices and profiles
pub const STEAM_COMMUNITY_URL: &str = "https://steamcommunity.com";

/// Browser-like identification; Steam rejects some requests without one
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Steam market currency code for RUB
pub const DEFAULT_CURRENCY: u32 = 5;

/// Tunables for one scanner instance
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Base URL for all outbound requests
    pub base_url: String,
    pub user_agent: String,
    /// Timeout applied to each outbound request
    pub request_timeout: Duration,
    /// Pause between successive inventory pages
    pub page_delay: Duration,
    /// Hard cap on inventory pages read per scan
    pub max_pages: usize,
    /// Refill interval of the price lookup rate limiter
    pub price_interval: Duration,
    /// Lifetime of a cached scan result
    pub result_ttl: Duration,
    /// How often expired scan results are swept
    pub sweep_interval: Duration,
    /// Wall-clock budget for timeout-bounded scans
    pub scan_timeout: Duration,
    /// Only the first N assets are priced when set
    pub max_priced_assets: Option<usize>,
    pub currency: u32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            base_url: STEAM_COMMUNITY_URL.to_string(),
            user_agent: BROWSER_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(30),
            page_delay: Duration::from_secs(1),
            max_pages: 100,
            price_interval: Duration::from_secs(3),
            result_ttl: Duration::from_secs(30 * 60),
            sweep_interval: Duration::from_secs(5 * 60),
            scan_timeout: Duration::from_secs(2 * 60),
            max_priced_assets: None,
            currency: DEFAULT_CURRENCY,
        }
    }
}

impl ScanConfig {
    /// Config pointed at another host, used by tests against a mock server.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }
}
