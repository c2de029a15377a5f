use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Trim and uppercase a ticker symbol. Returns `None` for blank input or
/// anything containing inner whitespace.
pub fn normalize_ticker(raw: &str) -> Option<String> {
    let t = raw.trim();
    if t.is_empty() || t.chars().any(char::is_whitespace) {
        return None;
    }
    Some(t.to_uppercase())
}

/// Debt/Equity is sometimes reported as a percentage (e.g. 150.0 for 1.5x).
/// Anything above 10 is taken to be a percentage and converted to times.
pub fn normalize_debt_to_equity(raw: f64) -> f64 {
    if raw > 10.0 {
        raw / 100.0
    } else {
        raw
    }
}

/// Per-ticker fundamentals snapshot. `None` marks a missing ratio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundamentalsRecord {
    pub ticker: String,
    pub company_name: String,
    pub sector: String,
    pub industry: String,
    pub price: Option<f64>,
    pub pe: Option<f64>,
    pub pb: Option<f64>,
    pub ev_ebitda: Option<f64>,
    /// Always a ratio ("times"), see [`normalize_debt_to_equity`].
    pub debt_to_equity: Option<f64>,
    pub roe: Option<f64>,
}

impl FundamentalsRecord {
    /// A record with every field missing. Used when a fetch fails.
    pub fn missing(ticker: &str) -> Self {
        Self {
            ticker: ticker.trim().to_uppercase(),
            company_name: String::new(),
            sector: String::new(),
            industry: String::new(),
            price: None,
            pe: None,
            pb: None,
            ev_ebitda: None,
            debt_to_equity: None,
            roe: None,
        }
    }

    pub fn has_valuation_inputs(&self) -> bool {
        self.pe.is_some() || self.pb.is_some() || self.ev_ebitda.is_some()
    }
}

/// Which scoring branch a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectorKind {
    Standard,
    Financial,
}

impl SectorKind {
    pub fn is_financial(&self) -> bool {
        matches!(self, SectorKind::Financial)
    }
}

/// Metric that drove the quality score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityMetric {
    #[serde(rename = "ROE")]
    Roe,
    #[serde(rename = "D/E")]
    DebtToEquity,
}

impl QualityMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityMetric::Roe => "ROE",
            QualityMetric::DebtToEquity => "D/E",
        }
    }
}

impl fmt::Display for QualityMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Qualitative bucket derived from valuation/quality scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    #[serde(rename = "Cheap and sound")]
    CheapAndSound,
    #[serde(rename = "Cheap but fragile")]
    CheapButFragile,
    #[serde(rename = "Expensive but sound")]
    ExpensiveButSound,
    #[serde(rename = "Expensive and fragile")]
    ExpensiveAndFragile,
    #[serde(rename = "Neutral")]
    Neutral,
    #[serde(rename = "No data")]
    NoData,
}

impl Label {
    pub const ALL: [Label; 6] = [
        Label::CheapAndSound,
        Label::CheapButFragile,
        Label::ExpensiveButSound,
        Label::ExpensiveAndFragile,
        Label::Neutral,
        Label::NoData,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::CheapAndSound => "Cheap and sound",
            Label::CheapButFragile => "Cheap but fragile",
            Label::ExpensiveButSound => "Expensive but sound",
            Label::ExpensiveAndFragile => "Expensive and fragile",
            Label::Neutral => "Neutral",
            Label::NoData => "No data",
        }
    }

    /// Operational signal: "Cheap…" buys, "Expensive…" sells, the rest holds.
    pub fn signal(&self) -> Signal {
        match self {
            Label::CheapAndSound | Label::CheapButFragile => Signal::Buy,
            Label::ExpensiveButSound | Label::ExpensiveAndFragile => Signal::Sell,
            Label::Neutral | Label::NoData => Signal::Hold,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Label::ALL
            .iter()
            .copied()
            .find(|l| l.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown label: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Buy => "Buy",
            Signal::Sell => "Sell",
            Signal::Hold => "Hold",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of the composite & label engine for one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub sector_kind: SectorKind,
    /// 0-100
    pub valuation_score: Option<f64>,
    /// 0-100
    pub quality_score: Option<f64>,
    pub quality_metric: QualityMetric,
    /// Rounded to 2 decimals
    pub ivr: Option<f64>,
    pub label: Label,
    pub signal: Signal,
}

/// A record together with its score, one row of the dashboard table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredTicker {
    pub record: FundamentalsRecord,
    pub score: ScoreResult,
}

/// Caps, label thresholds and IVR weights. Persisted externally and loaded
/// once per pass; the scoring engine validates it rather than trusting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub pe_cap: f64,
    pub pb_cap: f64,
    pub eve_cap: f64,
    pub valuation_threshold: i64,
    pub quality_threshold: i64,
    pub weight_valuation: f64,
    pub weight_quality: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            pe_cap: 25.0,
            pb_cap: 5.0,
            eve_cap: 15.0,
            valuation_threshold: 70,
            quality_threshold: 50,
            weight_valuation: 0.7,
            weight_quality: 0.3,
        }
    }
}

impl ScoringConfig {
    /// Settings the universe scanner falls back to when nothing has been saved.
    pub fn scan_fallback() -> Self {
        Self {
            pe_cap: 13.0,
            pb_cap: 5.0,
            eve_cap: 14.0,
            valuation_threshold: 57,
            quality_threshold: 44,
            weight_valuation: 0.64,
            weight_quality: 0.36,
        }
    }
}

/// Latest qualifying state for a ticker in the `alerts` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub ticker: String,
    pub company_name: String,
    pub ivr: f64,
    pub label: Label,
    pub timestamp: DateTime<Utc>,
}

/// One immutable row of `alerts_log`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertLogEntry {
    pub ticker: String,
    pub company_name: String,
    pub ivr: f64,
    pub label: Label,
    pub timestamp: DateTime<Utc>,
}

impl From<&AlertRecord> for AlertLogEntry {
    fn from(alert: &AlertRecord) -> Self {
        Self {
            ticker: alert.ticker.clone(),
            company_name: alert.company_name.clone(),
            ivr: alert.ivr,
            label: alert.label,
            timestamp: alert.timestamp,
        }
    }
}
