//! SQLite persistence for settings, the watchlist and alerts.

pub mod alerts;
pub mod db;
pub mod settings;
pub mod watchlist;

pub use db::RadarDb;
