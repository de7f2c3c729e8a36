//! External inventory sheet feeding the Dean's "total systems" figure
//!
//! The sheet is a published CSV export with one asset per line after the
//! header. It is fetched lazily and cached for `cache_seconds`.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::{
    config::InventoryConfig,
    error::{AppError, AppResult},
};

/// Row count read from the remote sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventoryCount {
    pub total: i64,
    pub fetched_at: DateTime<Utc>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InventorySource: Send + Sync {
    /// Current count, or `None` when the source is unavailable
    async fn total_systems(&self) -> AppResult<Option<InventoryCount>>;
}

/// Source used when no sheet is configured
pub struct NoInventorySource;

#[async_trait]
impl InventorySource for NoInventorySource {
    async fn total_systems(&self) -> AppResult<Option<InventoryCount>> {
        Ok(None)
    }
}

/// How long a failed fetch is remembered before the sheet is tried again
const FAILURE_TTL: Duration = Duration::from_secs(30);

/// Last fetch outcome; `count` is `None` when the sheet could not be read
#[derive(Debug, Clone, Copy)]
struct CachedCount {
    at: Instant,
    count: Option<InventoryCount>,
}

impl CachedCount {
    fn is_fresh(&self, ttl: Duration) -> bool {
        let ttl = if self.count.is_some() { ttl } else { ttl.min(FAILURE_TTL) };
        self.at.elapsed() < ttl
    }
}

pub struct CsvInventorySource {
    client: reqwest::Client,
    url: String,
    ttl: Duration,
    cache: RwLock<Option<CachedCount>>,
}

impl CsvInventorySource {
    pub fn new(url: String, config: &InventoryConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url,
            ttl: Duration::from_secs(config.cache_seconds),
            cache: RwLock::new(None),
        })
    }

    async fn fetch(&self) -> Result<Option<i64>, reqwest::Error> {
        let body = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(count_csv_rows(&body))
    }
}

#[async_trait]
impl InventorySource for CsvInventorySource {
    async fn total_systems(&self) -> AppResult<Option<InventoryCount>> {
        if let Some(cached) = *self.cache.read().await {
            if cached.is_fresh(self.ttl) {
                return Ok(cached.count);
            }
        }

        let mut cache = self.cache.write().await;
        // Another task may have refreshed while we waited for the lock
        if let Some(cached) = *cache {
            if cached.is_fresh(self.ttl) {
                return Ok(cached.count);
            }
        }

        let count = match self.fetch().await {
            Ok(Some(total)) => {
                tracing::debug!("Inventory sheet refreshed: {} systems", total);
                Some(InventoryCount { total, fetched_at: Utc::now() })
            }
            Ok(None) => {
                tracing::warn!("Inventory sheet returned HTML instead of CSV, is it published?");
                None
            }
            Err(e) => {
                tracing::warn!("Failed to fetch inventory sheet: {}", e);
                None
            }
        };

        *cache = Some(CachedCount { at: Instant::now(), count });
        Ok(count)
    }
}

/// Number of data rows in a CSV body (non-empty lines minus the header).
///
/// Returns `None` for HTML pages, which is what an unpublished sheet serves.
pub fn count_csv_rows(body: &str) -> Option<i64> {
    let head = body.trim_start();
    if head.starts_with('<') {
        return None;
    }
    let lines = head.lines().filter(|line| !line.trim().is_empty()).count() as i64;
    Some((lines - 1).max(0))
}
