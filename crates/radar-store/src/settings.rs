use crate::db::{db_err, RadarDb};
use async_trait::async_trait;
use radar_core::{ConfigStore, RadarError, ScoringConfig};

#[derive(sqlx::FromRow)]
struct SettingsRow {
    pe_cap: f64,
    pb_cap: f64,
    eve_cap: f64,
    val_th: i64,
    qual_th: i64,
    w_val: f64,
    w_qual: f64,
}

impl From<SettingsRow> for ScoringConfig {
    fn from(row: SettingsRow) -> Self {
        Self {
            pe_cap: row.pe_cap,
            pb_cap: row.pb_cap,
            eve_cap: row.eve_cap,
            valuation_threshold: row.val_th,
            quality_threshold: row.qual_th,
            weight_valuation: row.w_val,
            weight_quality: row.w_qual,
        }
    }
}

#[async_trait]
impl ConfigStore for RadarDb {
    /// Stored row, or the fallback when nothing has been saved yet.
    /// Values are returned as stored; validation belongs to the scoring engine.
    async fn load(&self) -> Result<ScoringConfig, RadarError> {
        let row = sqlx::query_as::<_, SettingsRow>(
            "SELECT pe_cap, pb_cap, eve_cap, val_th, qual_th, w_val, w_qual FROM settings WHERE id = 1",
        )
        .fetch_optional(self.pool())
        .await
        .map_err(db_err)?;

        Ok(row.map(ScoringConfig::from).unwrap_or_else(|| self.fallback().clone()))
    }

    async fn save(&self, config: &ScoringConfig) -> Result<(), RadarError> {
        sqlx::query(
            r#"
            INSERT INTO settings (id, pe_cap, pb_cap, eve_cap, val_th, qual_th, w_val, w_qual)
            VALUES (1, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                pe_cap = excluded.pe_cap,
                pb_cap = excluded.pb_cap,
                eve_cap = excluded.eve_cap,
                val_th = excluded.val_th,
                qual_th = excluded.qual_th,
                w_val = excluded.w_val,
                w_qual = excluded.w_qual
            "#,
        )
        .bind(config.pe_cap)
        .bind(config.pb_cap)
        .bind(config.eve_cap)
        .bind(config.valuation_threshold)
        .bind(config.quality_threshold)
        .bind(config.weight_valuation)
        .bind(config.weight_quality)
        .execute(self.pool())
        .await
        .map_err(db_err)?;

        tracing::info!("scoring settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_without_row_returns_fallback() {
        let db = RadarDb::new("sqlite::memory:").await.unwrap();
        assert_eq!(db.load().await.unwrap(), ScoringConfig::default());

        let db = db.with_fallback(ScoringConfig::scan_fallback());
        assert_eq!(db.load().await.unwrap(), ScoringConfig::scan_fallback());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let db = RadarDb::new("sqlite::memory:").await.unwrap();
        let cfg = ScoringConfig {
            pe_cap: 18.5,
            valuation_threshold: 65,
            weight_valuation: 0.6,
            weight_quality: 0.4,
            ..ScoringConfig::default()
        };
        db.save(&cfg).await.unwrap();
        assert_eq!(db.load().await.unwrap(), cfg);

        // second save overwrites the single row
        db.save(&ScoringConfig::default()).await.unwrap();
        assert_eq!(db.load().await.unwrap(), ScoringConfig::default());
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM settings")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(n, 1);
    }

    #[tokio::test]
    async fn test_store_does_not_normalize_weights() {
        let db = RadarDb::new("sqlite::memory:").await.unwrap();
        let cfg = ScoringConfig {
            weight_valuation: 0.0,
            weight_quality: 0.0,
            ..ScoringConfig::default()
        };
        db.save(&cfg).await.unwrap();
        let loaded = db.load().await.unwrap();
        assert_eq!(loaded.weight_valuation, 0.0);
        assert_eq!(loaded.weight_quality, 0.0);
    }
}
