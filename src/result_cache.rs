//! In-memory, time-bounded cache of finished scans
//!
//! Entries expire a fixed TTL after they are written. Reads check expiry
//! themselves; the periodic sweep only reclaims memory.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::models::{PricedItem, SteamId};

/// Scans are cached per profile and application
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScanKey {
    pub steam_id: SteamId,
    pub app_id: u32,
}

impl ScanKey {
    pub fn new(steam_id: SteamId, app_id: u32) -> Self {
        Self { steam_id, app_id }
    }
}

/// A cache hit
#[derive(Debug, Clone)]
pub struct CachedScan {
    pub items: Vec<PricedItem>,
    /// Wall-clock time the scan was stored
    pub created_at: DateTime<Local>,
}

struct Entry {
    scan: CachedScan,
    expires_at: Instant,
}

pub struct ResultCache {
    entries: RwLock<HashMap<ScanKey, Entry>>,
    ttl: Duration,
}

impl ResultCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Returns the stored scan only while it has not expired.
    pub async fn get(&self, key: &ScanKey) -> Option<CachedScan> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;

        if Instant::now() >= entry.expires_at {
            log::debug!("Cache entry for {}/{} has expired", key.steam_id, key.app_id);
            return None;
        }

        Some(entry.scan.clone())
    }

    /// Stores a scan, replacing any previous entry for the key.
    pub async fn set(&self, key: ScanKey, items: Vec<PricedItem>) {
        let entry = Entry {
            scan: CachedScan {
                items,
                created_at: Local::now(),
            },
            expires_at: Instant::now() + self.ttl,
        };

        log::debug!(
            "Caching {} items for {}/{}",
            entry.scan.items.len(),
            key.steam_id,
            key.app_id
        );
        self.entries.write().await.insert(key, entry);
    }

    /// Drops every expired entry and returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| now < entry.expires_at);
        before - entries.len()
    }

    /// Number of stored entries, expired or not
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Starts the periodic sweep. The task ends once the cache is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let cache: Weak<Self> = Arc::downgrade(self);
        let every = every.max(Duration::from_millis(1));

        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + every, every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let Some(cache) = cache.upgrade() else {
                    break;
                };
                let removed = cache.purge_expired().await;
                if removed > 0 {
                    log::info!("Removed {} expired scan(s) from cache", removed);
                }
            }
        })
    }
}
