use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use radar_core::{FundamentalsProvider, FundamentalsRecord, RadarError};

pub const DEFAULT_TTL_SECS: i64 = 300;

struct CacheEntry<T> {
    data: T,
    cached_at: DateTime<Utc>,
}

/// Per-ticker TTL cache in front of any provider. Only successful fetches
/// are cached so a transient failure is retried on the next pass.
pub struct CachedProvider<P> {
    inner: P,
    ttl: Duration,
    entries: DashMap<String, CacheEntry<FundamentalsRecord>>,
}

impl<P: FundamentalsProvider> CachedProvider<P> {
    pub fn new(inner: P) -> Self {
        Self::with_ttl(inner, Duration::seconds(DEFAULT_TTL_SECS))
    }

    pub fn with_ttl(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: DashMap::new(),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Drop every cached record, forcing fresh fetches.
    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn get_fresh(&self, key: &str) -> Option<FundamentalsRecord> {
        let entry = self.entries.get(key)?;
        if Utc::now() - entry.cached_at < self.ttl {
            Some(entry.data.clone())
        } else {
            None
        }
    }
}

#[async_trait]
impl<P: FundamentalsProvider> FundamentalsProvider for CachedProvider<P> {
    async fn fetch(&self, ticker: &str) -> Result<FundamentalsRecord, RadarError> {
        let key = ticker.trim().to_uppercase();
        if let Some(hit) = self.get_fresh(&key) {
            tracing::debug!("fundamentals cache hit for {}", key);
            return Ok(hit);
        }

        let record = self.inner.fetch(&key).await?;
        self.entries.insert(
            key,
            CacheEntry {
                data: record.clone(),
                cached_at: Utc::now(),
            },
        );
        Ok(record)
    }
}
