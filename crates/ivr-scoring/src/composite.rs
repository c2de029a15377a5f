use crate::subscore::{quality_from_debt_to_equity, quality_from_roe};
use radar_core::{FundamentalsRecord, Label, QualityMetric, RadarError, SectorKind};
use serde::{Deserialize, Serialize};

/// Split used when both configured weights are zero.
pub const DEFAULT_WEIGHT_VALUATION: f64 = 0.7;
pub const DEFAULT_WEIGHT_QUALITY: f64 = 0.3;

const WEIGHT_TOLERANCE: f64 = 1e-9;

/// IVR weights, always summing to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub valuation: f64,
    pub quality: f64,
}

impl Weights {
    /// Normalize configured weights proportionally. Both zero falls back to
    /// 0.7/0.3; negative or non-finite weights cannot be normalized.
    pub fn normalize(weight_valuation: f64, weight_quality: f64) -> Result<Self, RadarError> {
        if !weight_valuation.is_finite() || !weight_quality.is_finite() {
            return Err(RadarError::InvalidConfig(format!(
                "weights must be finite, got {weight_valuation}/{weight_quality}"
            )));
        }
        if weight_valuation < 0.0 || weight_quality < 0.0 {
            return Err(RadarError::InvalidConfig(format!(
                "weights must be non-negative, got {weight_valuation}/{weight_quality}"
            )));
        }

        let sum = weight_valuation + weight_quality;
        if sum == 0.0 {
            tracing::warn!(
                "IVR weights are both zero, falling back to {}/{}",
                DEFAULT_WEIGHT_VALUATION,
                DEFAULT_WEIGHT_QUALITY
            );
            return Ok(Self {
                valuation: DEFAULT_WEIGHT_VALUATION,
                quality: DEFAULT_WEIGHT_QUALITY,
            });
        }
        if sum.is_finite() && (sum - 1.0).abs() <= WEIGHT_TOLERANCE {
            return Ok(Self {
                valuation: weight_valuation,
                quality: weight_quality,
            });
        }

        // Scale by the larger weight first so huge inputs cannot overflow the sum
        let scale = weight_valuation.max(weight_quality);
        let (wv, wq) = (weight_valuation / scale, weight_quality / scale);
        let normalized = Self {
            valuation: wv / (wv + wq),
            quality: wq / (wv + wq),
        };
        tracing::info!(
            "IVR weights normalized to valuation={:.2} / quality={:.2}",
            normalized.valuation,
            normalized.quality
        );
        Ok(normalized)
    }
}

/// ROE for financials, Debt/Equity for everyone else.
pub fn quality_score(record: &FundamentalsRecord, kind: SectorKind) -> (Option<f64>, QualityMetric) {
    match kind {
        SectorKind::Financial => (quality_from_roe(record.roe), QualityMetric::Roe),
        SectorKind::Standard => (
            quality_from_debt_to_equity(record.debt_to_equity),
            QualityMetric::DebtToEquity,
        ),
    }
}

/// Round to 2 decimals on the exact decimal value of `x`, ties to even.
/// `84.125` gives `84.12` and `2.675` (really 2.67499…) gives `2.67`.
pub fn round2(x: f64) -> f64 {
    if !x.is_finite() {
        return x;
    }
    format!("{x:.2}").parse().unwrap_or(x)
}

/// Weighted composite. Valuation is mandatory; unknown quality counts as 0.
pub fn ivr(valuation: Option<f64>, quality: Option<f64>, weights: Weights) -> Option<f64> {
    let v = valuation?;
    let q = quality.unwrap_or(0.0);
    Some(round2(weights.valuation * v + weights.quality * q))
}

/// Upper bound of the "expensive" band, mirrored from the valuation threshold.
pub fn cheap_threshold(valuation_threshold: i64) -> f64 {
    (100 - valuation_threshold).clamp(10, 90) as f64
}

/// First matching rule wins.
pub fn classify(
    valuation: Option<f64>,
    quality: Option<f64>,
    valuation_threshold: i64,
    quality_threshold: i64,
) -> Label {
    let Some(v) = valuation else {
        return Label::NoData;
    };
    let val_th = valuation_threshold as f64;
    let expensive_th = cheap_threshold(valuation_threshold);
    let sound = quality.is_some_and(|q| q >= quality_threshold as f64);

    if v >= val_th && sound {
        Label::CheapAndSound
    } else if v >= val_th {
        Label::CheapButFragile
    } else if v <= expensive_th && sound {
        Label::ExpensiveButSound
    } else if v <= expensive_th {
        Label::ExpensiveAndFragile
    } else {
        Label::Neutral
    }
}
