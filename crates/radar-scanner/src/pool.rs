use radar_core::{FundamentalsProvider, FundamentalsRecord, RadarError};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

pub const DEFAULT_WORKERS: usize = 12;
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches fundamentals for many tickers with at most `width` requests in
/// flight. Every ticker yields exactly one record: failures, timeouts and
/// panicked tasks come back as [`FundamentalsRecord::missing`].
#[derive(Clone)]
pub struct FetchPool {
    provider: Arc<dyn FundamentalsProvider>,
    width: usize,
    timeout: Duration,
}

impl FetchPool {
    pub fn new(
        provider: Arc<dyn FundamentalsProvider>,
        width: usize,
        timeout: Duration,
    ) -> Result<Self, RadarError> {
        if width == 0 {
            return Err(RadarError::InvalidConfig(
                "fetch pool needs at least one worker".to_string(),
            ));
        }
        if timeout.is_zero() {
            return Err(RadarError::InvalidConfig(
                "fetch timeout must be positive".to_string(),
            ));
        }

        Ok(Self {
            provider,
            width,
            timeout,
        })
    }

    pub fn with_defaults(provider: Arc<dyn FundamentalsProvider>) -> Self {
        Self {
            provider,
            width: DEFAULT_WORKERS,
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetch every ticker. Records arrive in completion order; callers must
    /// not rely on it matching the input order.
    pub async fn fetch_all(&self, tickers: &[String]) -> Vec<FundamentalsRecord> {
        let semaphore = Arc::new(Semaphore::new(self.width));
        let mut tasks = JoinSet::new();

        for (idx, ticker) in tickers.iter().enumerate() {
            let provider = Arc::clone(&self.provider);
            let semaphore = Arc::clone(&semaphore);
            let ticker = ticker.clone();
            let timeout = self.timeout;

            tasks.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return (idx, FundamentalsRecord::missing(&ticker));
                };

                let record = match tokio::time::timeout(timeout, provider.fetch(&ticker)).await {
                    Ok(Ok(record)) => record,
                    Ok(Err(e)) => {
                        tracing::warn!("{}: fetch failed, scoring as missing: {}", ticker, e);
                        FundamentalsRecord::missing(&ticker)
                    }
                    Err(_) => {
                        tracing::warn!("{}: fetch timed out after {:?}", ticker, timeout);
                        FundamentalsRecord::missing(&ticker)
                    }
                };
                (idx, record)
            });
        }

        let mut records = Vec::with_capacity(tickers.len());
        let mut pending: HashSet<usize> = (0..tickers.len()).collect();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, record)) => {
                    pending.remove(&idx);
                    records.push(record);
                }
                Err(e) => {
                    tracing::error!("Fetch task error: {}", e);
                }
            }
        }

        // Whatever never reported back panicked inside its task
        let mut lost: Vec<usize> = pending.into_iter().collect();
        lost.sort_unstable();
        for idx in lost {
            records.push(FundamentalsRecord::missing(&tickers[idx]));
        }

        records
    }
}
