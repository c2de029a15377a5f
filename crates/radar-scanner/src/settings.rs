//! Which scoring settings each surface uses, and editing them.

use ivr_scoring::{IvrEngine, Weights};
use radar_core::{ConfigStore, RadarError, ScoringConfig};
use radar_store::RadarDb;

/// The dashboard and the universe scan fall back to different settings
/// while nothing has been saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsProfile {
    Dashboard,
    Scan,
}

impl SettingsProfile {
    pub fn fallback(&self) -> ScoringConfig {
        match self {
            SettingsProfile::Dashboard => ScoringConfig::default(),
            SettingsProfile::Scan => ScoringConfig::scan_fallback(),
        }
    }
}

/// Saved settings, or the profile's fallback when no row exists.
pub async fn load_settings(db: &RadarDb, profile: SettingsProfile) -> Result<ScoringConfig, RadarError> {
    db.clone().with_fallback(profile.fallback()).load().await
}

fn parse_value<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, RadarError> {
    raw.trim()
        .parse()
        .map_err(|_| RadarError::InvalidConfig(format!("{key}: cannot parse {raw:?}")))
}

fn check_range(key: &str, value: f64, min: f64, max: f64) -> Result<(), RadarError> {
    if !(min..=max).contains(&value) {
        return Err(RadarError::InvalidConfig(format!(
            "{key} must be within {min}..={max}, got {value}"
        )));
    }
    Ok(())
}

/// Apply `key=value` edits on top of `base`.
///
/// Keys: `pe_cap` (5-80), `pb_cap` (0.5-20), `eve_cap` (2-40), `val_th`
/// (40-90), `qual_th` (30-80), `w_val` and `w_qual` (0-1). Weights are
/// normalized before returning and the result must build an [`IvrEngine`].
pub fn apply_settings(base: &ScoringConfig, edits: &[String]) -> Result<ScoringConfig, RadarError> {
    let mut config = base.clone();

    for edit in edits {
        let (key, raw) = edit
            .split_once('=')
            .ok_or_else(|| RadarError::InvalidConfig(format!("expected key=value, got {edit:?}")))?;
        let key = key.trim();

        match key {
            "pe_cap" => {
                let v: f64 = parse_value(key, raw)?;
                check_range(key, v, 5.0, 80.0)?;
                config.pe_cap = v;
            }
            "pb_cap" => {
                let v: f64 = parse_value(key, raw)?;
                check_range(key, v, 0.5, 20.0)?;
                config.pb_cap = v;
            }
            "eve_cap" => {
                let v: f64 = parse_value(key, raw)?;
                check_range(key, v, 2.0, 40.0)?;
                config.eve_cap = v;
            }
            "val_th" => {
                let v: i64 = parse_value(key, raw)?;
                check_range(key, v as f64, 40.0, 90.0)?;
                config.valuation_threshold = v;
            }
            "qual_th" => {
                let v: i64 = parse_value(key, raw)?;
                check_range(key, v as f64, 30.0, 80.0)?;
                config.quality_threshold = v;
            }
            "w_val" => {
                let v: f64 = parse_value(key, raw)?;
                check_range(key, v, 0.0, 1.0)?;
                config.weight_valuation = v;
            }
            "w_qual" => {
                let v: f64 = parse_value(key, raw)?;
                check_range(key, v, 0.0, 1.0)?;
                config.weight_quality = v;
            }
            other => {
                return Err(RadarError::InvalidConfig(format!("unknown setting {other:?}")));
            }
        }
    }

    let weights = Weights::normalize(config.weight_valuation, config.weight_quality)?;
    config.weight_valuation = weights.valuation;
    config.weight_quality = weights.quality;

    IvrEngine::new(&config)?;
    Ok(config)
}

/// Edit the current settings (dashboard view) and persist the result.
pub async fn update_settings(db: &RadarDb, edits: &[String]) -> Result<ScoringConfig, RadarError> {
    let current = load_settings(db, SettingsProfile::Dashboard).await?;
    let updated = apply_settings(&current, edits)?;
    db.save(&updated).await?;
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn edits(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_profiles_pick_their_own_fallback() {
        let db = RadarDb::new("sqlite::memory:").await.unwrap();
        assert_eq!(
            load_settings(&db, SettingsProfile::Dashboard).await.unwrap(),
            ScoringConfig::default()
        );
        assert_eq!(
            load_settings(&db, SettingsProfile::Scan).await.unwrap(),
            ScoringConfig::scan_fallback()
        );
    }

    #[tokio::test]
    async fn test_saved_row_wins_for_both_profiles() {
        let db = RadarDb::new("sqlite::memory:").await.unwrap();
        let saved = update_settings(&db, &edits(&["pe_cap=18"])).await.unwrap();
        assert_eq!(saved.pe_cap, 18.0);
        assert_eq!(saved.pb_cap, ScoringConfig::default().pb_cap);

        assert_eq!(load_settings(&db, SettingsProfile::Dashboard).await.unwrap(), saved);
        assert_eq!(load_settings(&db, SettingsProfile::Scan).await.unwrap(), saved);
    }

    #[test]
    fn test_apply_settings_normalizes_weights() {
        let config = apply_settings(
            &ScoringConfig::default(),
            &edits(&["w_val=0.6", "w_qual=0.6", "val_th=65", "qual_th=45", "eve_cap=12.5"]),
        )
        .unwrap();
        assert_relative_eq!(config.weight_valuation, 0.5, epsilon = 1e-12);
        assert_relative_eq!(config.weight_quality, 0.5, epsilon = 1e-12);
        assert_eq!(config.valuation_threshold, 65);
        assert_eq!(config.quality_threshold, 45);
        assert_eq!(config.eve_cap, 12.5);
    }

    #[test]
    fn test_zero_weights_saved_as_default_split() {
        let config = apply_settings(&ScoringConfig::default(), &edits(&["w_val=0", "w_qual=0"])).unwrap();
        assert_eq!(config.weight_valuation, 0.7);
        assert_eq!(config.weight_quality, 0.3);
    }

    #[test]
    fn test_out_of_range_and_unknown_keys_rejected() {
        let base = ScoringConfig::default();
        for bad in ["pe_cap=4", "pb_cap=25", "eve_cap=1", "val_th=95", "qual_th=20", "w_val=1.5", "w_qual=-0.1"] {
            assert!(
                matches!(apply_settings(&base, &edits(&[bad])), Err(RadarError::InvalidConfig(_))),
                "{bad}"
            );
        }
        assert!(apply_settings(&base, &edits(&["pe_cap"])).is_err());
        assert!(apply_settings(&base, &edits(&["pe_cap=abc"])).is_err());
        assert!(apply_settings(&base, &edits(&["val_th=55.5"])).is_err());
        assert!(apply_settings(&base, &edits(&["roe_min=3"])).is_err());
    }

    #[tokio::test]
    async fn test_rejected_edit_is_not_saved() {
        let db = RadarDb::new("sqlite::memory:").await.unwrap();
        assert!(update_settings(&db, &edits(&["pe_cap=18", "val_th=99"])).await.is_err());
        assert_eq!(
            load_settings(&db, SettingsProfile::Scan).await.unwrap(),
            ScoringConfig::scan_fallback()
        );
    }
}
