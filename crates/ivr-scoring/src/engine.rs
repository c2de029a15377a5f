use crate::composite::{classify, ivr, quality_score, Weights};
use crate::sector::classify_record;
use crate::valuation::{valuation_score, ValuationCaps};
use radar_core::{
    FundamentalsRecord, Label, QualityMetric, RadarError, ScoreResult, ScoredTicker,
    ScoringConfig, SectorKind,
};

/// Scores records against one validated [`ScoringConfig`].
///
/// Validation happens once in [`IvrEngine::new`]; a config that fails it is
/// fatal for the whole pass since every ticker would be scored the same way.
#[derive(Debug, Clone)]
pub struct IvrEngine {
    caps: ValuationCaps,
    weights: Weights,
    valuation_threshold: i64,
    quality_threshold: i64,
}

impl IvrEngine {
    pub fn new(config: &ScoringConfig) -> Result<Self, RadarError> {
        let caps = ValuationCaps::from_config(config)?;
        let weights = Weights::normalize(config.weight_valuation, config.weight_quality)?;
        for (name, th) in [
            ("valuation_threshold", config.valuation_threshold),
            ("quality_threshold", config.quality_threshold),
        ] {
            if !(0..=100).contains(&th) {
                return Err(RadarError::InvalidConfig(format!(
                    "{name} must be within 0..=100, got {th}"
                )));
            }
        }

        Ok(Self {
            caps,
            weights,
            valuation_threshold: config.valuation_threshold,
            quality_threshold: config.quality_threshold,
        })
    }

    pub fn weights(&self) -> Weights {
        self.weights
    }

    pub fn valuation(
        &self,
        record: &FundamentalsRecord,
        kind: SectorKind,
    ) -> Result<Option<f64>, RadarError> {
        valuation_score(record, kind, &self.caps)
    }

    pub fn quality(&self, record: &FundamentalsRecord, kind: SectorKind) -> (Option<f64>, QualityMetric) {
        quality_score(record, kind)
    }

    pub fn composite(&self, valuation: Option<f64>, quality: Option<f64>) -> Option<f64> {
        ivr(valuation, quality, self.weights)
    }

    pub fn label(&self, valuation: Option<f64>, quality: Option<f64>) -> Label {
        classify(
            valuation,
            quality,
            self.valuation_threshold,
            self.quality_threshold,
        )
    }

    /// Full pipeline for one record: classify, score, compose, label.
    pub fn score(&self, record: &FundamentalsRecord) -> Result<ScoreResult, RadarError> {
        let kind = classify_record(record);
        let valuation = self.valuation(record, kind)?;
        let (quality, quality_metric) = self.quality(record, kind);
        let label = self.label(valuation, quality);

        Ok(ScoreResult {
            sector_kind: kind,
            valuation_score: valuation,
            quality_score: quality,
            quality_metric,
            ivr: self.composite(valuation, quality),
            label,
            signal: label.signal(),
        })
    }

    pub fn score_ticker(&self, record: FundamentalsRecord) -> Result<ScoredTicker, RadarError> {
        let score = self.score(&record)?;
        tracing::debug!(
            "{}: valuation={:?} quality={:?} ({}) ivr={:?} label={}",
            record.ticker,
            score.valuation_score,
            score.quality_score,
            score.quality_metric,
            score.ivr,
            score.label
        );
        Ok(ScoredTicker { record, score })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use radar_core::Signal;

    fn config(pe_cap: f64, pb_cap: f64, eve_cap: f64) -> ScoringConfig {
        ScoringConfig {
            pe_cap,
            pb_cap,
            eve_cap,
            ..ScoringConfig::default()
        }
    }

    #[test]
    fn test_invalid_caps_fail_construction() {
        assert!(matches!(
            IvrEngine::new(&config(0.0, 5.0, 15.0)),
            Err(RadarError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_invalid_thresholds_fail_construction() {
        let cfg = ScoringConfig {
            valuation_threshold: 120,
            ..ScoringConfig::default()
        };
        assert!(IvrEngine::new(&cfg).is_err());
    }

    #[test]
    fn test_zero_weights_use_default_split() {
        let cfg = ScoringConfig {
            weight_valuation: 0.0,
            weight_quality: 0.0,
            ..ScoringConfig::default()
        };
        let engine = IvrEngine::new(&cfg).unwrap();
        assert_eq!(engine.weights(), Weights { valuation: 0.7, quality: 0.3 });
    }

    #[test]
    fn test_non_financial_scenario() {
        let engine = IvrEngine::new(&config(25.0, 5.0, 15.0)).unwrap();
        let record = FundamentalsRecord {
            sector: "Technology".to_string(),
            pe: Some(10.0),
            pb: Some(2.0),
            ev_ebitda: Some(8.0),
            debt_to_equity: Some(2.0),
            ..FundamentalsRecord::missing("ACME")
        };
        let result = engine.score(&record).unwrap();
        assert_eq!(result.sector_kind, SectorKind::Standard);
        assert_relative_eq!(result.valuation_score.unwrap(), 55.6, epsilon = 0.1);
        assert_eq!(result.quality_score, Some(50.0));
        assert_eq!(result.quality_metric, QualityMetric::DebtToEquity);
        // 0.7 * 55.5556 + 0.3 * 50 = 53.89
        assert_eq!(result.ivr, Some(53.89));
        assert_eq!(result.label, Label::Neutral);
        assert_eq!(result.signal, Signal::Hold);
    }

    #[test]
    fn test_bank_scenario() {
        let engine = IvrEngine::new(&config(13.0, 5.0, 14.0)).unwrap();
        let record = FundamentalsRecord {
            sector: "Banks".to_string(),
            pe: Some(8.0),
            pb: Some(1.0),
            ev_ebitda: Some(50.0),
            roe: Some(0.15),
            ..FundamentalsRecord::missing("BANK")
        };
        let result = engine.score(&record).unwrap();
        assert_eq!(result.sector_kind, SectorKind::Financial);
        assert_relative_eq!(result.valuation_score.unwrap(), 66.2, epsilon = 0.1);
        assert_eq!(result.quality_metric, QualityMetric::Roe);
        assert_relative_eq!(result.quality_score.unwrap(), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_no_valuation_inputs_is_no_data() {
        let engine = IvrEngine::new(&ScoringConfig::default()).unwrap();
        let record = FundamentalsRecord {
            debt_to_equity: Some(0.1),
            ..FundamentalsRecord::missing("EMPTY")
        };
        let result = engine.score(&record).unwrap();
        assert_eq!(result.label, Label::NoData);
        assert_eq!(result.signal, Signal::Hold);
        assert_eq!(result.ivr, None);
        assert_eq!(result.quality_score, Some(100.0));
    }

    #[test]
    fn test_scoring_is_idempotent() {
        let engine = IvrEngine::new(&ScoringConfig::scan_fallback()).unwrap();
        let record = FundamentalsRecord {
            sector: "Financial Services".to_string(),
            industry: "Insurance - Diversified".to_string(),
            pe: Some(9.3),
            pb: Some(1.4),
            roe: Some(13.0),
            ..FundamentalsRecord::missing("INS")
        };
        assert_eq!(engine.score(&record).unwrap(), engine.score(&record).unwrap());
    }
}
