//! Investment Value Rank scoring.
//!
//! Turns a [`radar_core::FundamentalsRecord`] into a [`radar_core::ScoreResult`]:
//! sector classification, valuation and quality sub-scores, the weighted IVR
//! composite and the qualitative label.

pub mod composite;
pub mod engine;
pub mod sector;
pub mod subscore;
pub mod valuation;

pub use composite::{cheap_threshold, classify, ivr, quality_score, round2, Weights};
pub use engine::IvrEngine;
pub use sector::{classify as classify_sector, classify_record, is_financial};
pub use subscore::{inverse_subscore, quality_from_debt_to_equity, quality_from_roe};
pub use valuation::{valuation_score, ValuationCaps};
