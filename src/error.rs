//! Error types for steam_inventory

use std::time::Duration;

use thiserror::Error;

/// Unified error type for inventory scanning operations
#[derive(Debug, Error)]
pub enum InventoryError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP error status code
    #[error("HTTP error: {0}")]
    HttpStatus(reqwest::StatusCode),
    /// Failed to parse JSON response
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// Steam answered but flagged the request as failed
    #[error("Steam reported failure: {0}")]
    Upstream(String),
    /// No Steam ID could be derived from the input
    #[error("Could not resolve Steam ID from: {0}")]
    Unresolved(String),
    /// Pagination stopped at the page cap while Steam still reported more items
    #[error("Stopped after {0} pages with more items still available")]
    PageLimitExceeded(usize),
    /// Scan was cancelled before it finished
    #[error("Scan cancelled")]
    Cancelled,
    /// Scan did not finish within its time budget
    #[error("Scan did not finish within {0:?}")]
    Timeout(Duration),
    /// Background scan task panicked or was aborted
    #[error("Scan task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// CSV export error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl InventoryError {
    /// Short label for the error class, shown in debug output.
    pub fn kind(&self) -> &'static str {
        match self {
            InventoryError::Network(_) | InventoryError::Timeout(_) => "transport",
            InventoryError::HttpStatus(_) => "status",
            InventoryError::Parse(_) => "decode",
            InventoryError::Upstream(_)
            | InventoryError::PageLimitExceeded(_)
            | InventoryError::Cancelled => "domain",
            InventoryError::Unresolved(_) => "resolution",
            InventoryError::Worker(_) | InventoryError::Io(_) | InventoryError::Csv(_) => "local",
        }
    }
}

/// Result alias for steam_inventory operations
pub type Result<T> = std::result::Result<T, InventoryError>;
