//! Single-permit rate limiter for market price requests
//!
//! A background task drops one permit into a capacity-1 channel every
//! interval. Ticks that find the channel full are discarded, so an idle
//! period leaves at most one permit waiting.

use std::time::Duration;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

pub struct RateLimiter {
    permits: Mutex<mpsc::Receiver<()>>,
    refill: JoinHandle<()>,
    interval: Duration,
}

impl RateLimiter {
    /// Starts the refill task. Must be called inside a tokio runtime.
    ///
    /// The first permit becomes available one interval after creation.
    pub fn new(interval: Duration) -> Self {
        let interval = interval.max(Duration::from_millis(1));
        let (tx, rx) = mpsc::channel(1);

        let refill = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                match tx.try_send(()) {
                    Ok(()) | Err(TrySendError::Full(())) => {}
                    Err(TrySendError::Closed(())) => break,
                }
            }
        });

        log::debug!("Rate limiter started with {:?} interval", interval);

        Self {
            permits: Mutex::new(rx),
            refill,
            interval,
        }
    }

    /// Waits until a permit is available and claims it.
    pub async fn acquire(&self) {
        let mut permits = self.permits.lock().await;
        if permits.recv().await.is_none() {
            // Refill task is gone; fall back to plain spacing
            tokio::time::sleep(self.interval).await;
        }
    }
}

impl Drop for RateLimiter {
    fn drop(&mut self) {
        self.refill.abort();
    }
}
