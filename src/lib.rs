//! Steam Inventory - value estimation for public Steam inventories
//!
//! Resolves a profile, reads its inventory page by page, prices every
//! marketable item on the Steam Community Market and summarises the result.
//! Finished scans are cached in memory for a limited time.

pub mod config;
pub mod error;
pub mod export;
pub mod join;
pub mod models;
pub mod rate_limiter;
pub mod result_cache;
pub mod scan;
pub mod stats;
pub mod steam;

pub use config::ScanConfig;
pub use error::{InventoryError, Result};
pub use models::{Game, PricedItem, SteamId, DEFAULT_APP_ID, KNOWN_GAMES};
pub use scan::{MultiGameReport, ScanReport, Scanner};
pub use stats::InventoryStats;
pub use steam::{parse_price, SteamClient};
