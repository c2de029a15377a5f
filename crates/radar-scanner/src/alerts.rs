use chrono::{DateTime, Utc};
use ivr_scoring::{classify_record, IvrEngine};
use radar_core::{
    AlertRecord, AlertStore, FundamentalsRecord, Label, RadarError, ScoreResult, ScoringConfig,
};

/// Minimum IVR for an alert, inclusive.
pub const ALERT_IVR_MIN: f64 = 85.0;
pub const ALERT_REQUIRE_LABEL: Label = Label::CheapAndSound;

/// Scan-path scoring plus the fixed alert policy.
///
/// The policy constants do not follow the label thresholds in
/// [`ScoringConfig`]; only the IVR and label themselves depend on it.
/// Unlike the dashboard, a missing quality score counts as 0 for the label
/// as well as for the IVR.
#[derive(Debug, Clone)]
pub struct AlertDecisionEngine {
    engine: IvrEngine,
}

impl AlertDecisionEngine {
    pub fn new(config: &ScoringConfig) -> Result<Self, RadarError> {
        Ok(Self {
            engine: IvrEngine::new(config)?,
        })
    }

    pub fn score(&self, record: &FundamentalsRecord) -> Result<ScoreResult, RadarError> {
        let kind = classify_record(record);
        let valuation = self.engine.valuation(record, kind)?;
        let (quality, quality_metric) = self.engine.quality(record, kind);
        let quality = match valuation {
            Some(_) => Some(quality.unwrap_or(0.0)),
            None => quality,
        };
        let label = self.engine.label(valuation, quality);

        Ok(ScoreResult {
            sector_kind: kind,
            valuation_score: valuation,
            quality_score: quality,
            quality_metric,
            ivr: self.engine.composite(valuation, quality),
            label,
            signal: label.signal(),
        })
    }

    pub fn qualifies(score: &ScoreResult) -> bool {
        score.label == ALERT_REQUIRE_LABEL && score.ivr.is_some_and(|ivr| ivr >= ALERT_IVR_MIN)
    }

    /// The alert to persist for `record`, if it meets the policy.
    pub fn decide(
        record: &FundamentalsRecord,
        score: &ScoreResult,
        timestamp: DateTime<Utc>,
    ) -> Option<AlertRecord> {
        if !Self::qualifies(score) {
            return None;
        }
        Some(AlertRecord {
            ticker: record.ticker.clone(),
            company_name: record.company_name.clone(),
            ivr: score.ivr?,
            label: score.label,
            timestamp,
        })
    }

    pub fn evaluate(
        &self,
        record: &FundamentalsRecord,
        timestamp: DateTime<Utc>,
    ) -> Result<(ScoreResult, Option<AlertRecord>), RadarError> {
        let score = self.score(record)?;
        let alert = Self::decide(record, &score, timestamp);
        Ok((score, alert))
    }

    /// Persist a qualifying alert: upsert the latest state and append to the log.
    pub async fn apply(store: &dyn AlertStore, alert: &AlertRecord) -> Result<(), RadarError> {
        store.record_alert(alert).await?;
        tracing::info!(
            "ALERT {} ({}) IVR {:.2} {}",
            alert.ticker,
            alert.company_name,
            alert.ivr,
            alert.label
        );
        Ok(())
    }
}
