use crate::subscore::inverse_subscore;
use radar_core::{FundamentalsRecord, RadarError, ScoringConfig, SectorKind};
use serde::{Deserialize, Serialize};

/// Caps for inverse multiple scoring. Construct through [`ValuationCaps::new`]
/// so every cap is known to be positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuationCaps {
    pe_cap: f64,
    pb_cap: f64,
    eve_cap: f64,
}

impl ValuationCaps {
    pub fn new(pe_cap: f64, pb_cap: f64, eve_cap: f64) -> Result<Self, RadarError> {
        for (name, cap) in [("pe_cap", pe_cap), ("pb_cap", pb_cap), ("eve_cap", eve_cap)] {
            if !cap.is_finite() || cap <= 0.0 {
                return Err(RadarError::InvalidConfig(format!(
                    "{name} must be a positive number, got {cap}"
                )));
            }
        }
        Ok(Self { pe_cap, pb_cap, eve_cap })
    }

    pub fn from_config(config: &ScoringConfig) -> Result<Self, RadarError> {
        Self::new(config.pe_cap, config.pb_cap, config.eve_cap)
    }

    pub fn pe_cap(&self) -> f64 {
        self.pe_cap
    }

    pub fn pb_cap(&self) -> f64 {
        self.pb_cap
    }

    pub fn eve_cap(&self) -> f64 {
        self.eve_cap
    }
}

fn mean_present(terms: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = terms.iter().filter_map(|t| *t).collect();
    if present.is_empty() {
        None
    } else {
        Some(present.iter().sum::<f64>() / present.len() as f64)
    }
}

/// Valuation score on 0..100.
///
/// Standard records average the P/E, P/B and EV/EBITDA sub-scores. Financials
/// skip EV/EBITDA and count P/B twice against P/E once. Missing sub-scores are
/// dropped from the average; the result is missing only when every term is.
pub fn valuation_score(
    record: &FundamentalsRecord,
    kind: SectorKind,
    caps: &ValuationCaps,
) -> Result<Option<f64>, RadarError> {
    let pe_sub = inverse_subscore(record.pe, caps.pe_cap)?;
    let pb_sub = inverse_subscore(record.pb, caps.pb_cap)?;

    let avg = match kind {
        SectorKind::Standard => {
            let eve_sub = inverse_subscore(record.ev_ebitda, caps.eve_cap)?;
            mean_present(&[pe_sub, pb_sub, eve_sub])
        }
        SectorKind::Financial => mean_present(&[pb_sub, pb_sub, pe_sub]),
    };

    Ok(avg.map(|a| a * 100.0))
}
