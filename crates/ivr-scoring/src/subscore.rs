//! Ratio normalizers.
//!
//! Valuation multiples use inverse scoring against a cap (lower multiple is
//! better, 0..1). Quality metrics use linear bands (0..100).

use radar_core::RadarError;

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// `clamp((cap - value) / cap, 0, 1)`. A non-positive cap is a config error.
/// NaN and infinite inputs count as missing.
pub fn inverse_subscore(value: Option<f64>, cap: f64) -> Result<Option<f64>, RadarError> {
    if !cap.is_finite() || cap <= 0.0 {
        return Err(RadarError::InvalidConfig(format!(
            "multiple cap must be positive, got {cap}"
        )));
    }
    Ok(finite(value).map(|v| ((cap - v) / cap).clamp(0.0, 1.0)))
}

/// D/E <= 0 -> 100, 2 -> 50, >= 3 -> 0.
pub fn quality_from_debt_to_equity(de: Option<f64>) -> Option<f64> {
    finite(de).map(|x| {
        if x <= 0.0 {
            100.0
        } else {
            ((3.0 - x) * 50.0).clamp(0.0, 100.0)
        }
    })
}

/// ROE 5% -> 0, 10% -> 50, 15% -> 100. Values above 1.0 are percentages.
pub fn quality_from_roe(roe: Option<f64>) -> Option<f64> {
    finite(roe).map(|r| {
        let r = if r > 1.0 { r / 100.0 } else { r };
        ((r - 0.05) / 0.10 * 100.0).clamp(0.0, 100.0)
    })
}
