//! Batch side of the radar: bounded concurrent fetching, the fixed alert
//! policy, universe parsing and the watchlist dashboard.

pub mod alerts;
pub mod dashboard;
pub mod pool;
pub mod scanner;
pub mod settings;
pub mod universe;

pub use alerts::{AlertDecisionEngine, ALERT_IVR_MIN, ALERT_REQUIRE_LABEL};
pub use dashboard::{
    alerts_view, filter_alerts_to_watchlist, last_scan, rank_watchlist, sort_by_ivr, AlertsView,
};
pub use pool::{FetchPool, DEFAULT_WORKERS};
pub use scanner::{ScanSummary, UniverseScanner};
pub use settings::{apply_settings, load_settings, update_settings, SettingsProfile};
pub use universe::{load_universe, parse_universe};
