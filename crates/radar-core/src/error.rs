use thiserror::Error;

#[derive(Error, Debug)]
pub enum RadarError {
    /// The provider returned nothing usable for a ticker. Inside the scoring
    /// pipeline a missing ratio is `None`, never this error.
    #[error("Missing data: {0}")]
    MissingData(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Fetch failed for {ticker}: {reason}")]
    FetchFailure { ticker: String, reason: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RadarError {
    pub fn fetch(ticker: &str, reason: impl ToString) -> Self {
        RadarError::FetchFailure {
            ticker: ticker.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Config errors abort the whole pass; everything else is contained per ticker.
    pub fn is_fatal(&self) -> bool {
        matches!(self, RadarError::InvalidConfig(_) | RadarError::Storage(_))
    }
}
