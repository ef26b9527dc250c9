//! Core domain logic for the carbon tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Emission scoring: converting a day's raw activity quantities into
//!   per-category and total kg CO2
//! - Streak tracking: maintaining consecutive-day logging counters
//! - History aggregation: category breakdowns, trend series, and
//!   baseline comparison over a stored range of entries
//!
//! Everything here is pure and synchronous. Persistence lives in
//! `ct-db`; this crate receives plain data and returns plain data.

pub mod emission;
pub mod history;
pub mod streak;
pub mod types;

pub use emission::{EmissionBreakdown, SourceEmissions, compute, compute_sources, trees_to_offset};
pub use history::{CategoryFractions, ScoredEntry, Summary, Trend, TrendPoint, summarize};
pub use streak::{StreakState, advance};
pub use types::{ActivityEntry, UserId, ValidationError};
