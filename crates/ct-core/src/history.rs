//! History aggregation.
//!
//! Summarizes a user's stored entries over a date range: category
//! breakdown, chronological trend series, comparison against the global
//! average baseline, and the recent-versus-prior trend direction.
//!
//! The aggregator is pure: it consumes the slice the repository returned
//! (ascending by date, both range endpoints inclusive) and holds no
//! state of its own. An empty range is a defined degenerate output, not
//! an error.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::emission::{
    EmissionBreakdown, GLOBAL_DAILY_AVERAGE_KG, SourceEmissions, compute_sources,
};
use crate::types::ActivityEntry;

/// Window used for the trend direction comparison, in days.
const TREND_WINDOW_DAYS: u64 = 30;

/// An entry paired with its computed breakdown, as the repository
/// persists them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredEntry {
    pub entry: ActivityEntry,
    pub breakdown: EmissionBreakdown,
}

/// One point of the emissions-over-time series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub total_kg: f64,
}

/// Direction of the footprint over the two most recent 30-day windows.
///
/// Lower emissions are better, so falling averages read as improving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Worsening,
    Stable,
}

impl Trend {
    /// String representation for display.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Improving => "improving",
            Self::Worsening => "worsening",
            Self::Stable => "stable",
        }
    }
}

/// Per-category share of the range total.
///
/// Fractions sum to 1.0 when the range total is positive; a zero total
/// yields all-zero fractions rather than dividing by zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryFractions {
    pub home_energy: f64,
    pub transportation: f64,
    pub food: f64,
}

/// Aggregated view of a range of scored entries.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// Days with an entry in the range.
    pub entry_count: usize,

    /// Category totals summed across the range. `total_kg` is the sum of
    /// the three summed categories, so the total-equals-sum invariant
    /// holds for the aggregate too.
    pub category_totals: EmissionBreakdown,

    /// Per-source totals summed across the range.
    pub source_totals: SourceEmissions,

    /// Mean daily total, zero for an empty range.
    pub average_daily_kg: f64,

    /// Smallest daily total in the range, zero for an empty range.
    pub min_daily_kg: f64,

    /// Largest daily total in the range, zero for an empty range.
    pub max_daily_kg: f64,

    /// Signed percent difference of the daily average against
    /// [`GLOBAL_DAILY_AVERAGE_KG`]; `None` for an empty range.
    pub comparison_to_baseline: Option<f64>,

    /// Direction over the two most recent 30-day windows.
    pub trend: Trend,

    trend_points: Vec<TrendPoint>,
}

impl Summary {
    /// The emissions-over-time series, chronological, one point per
    /// entry. Restartable: each call yields a fresh pass over the range.
    #[must_use]
    pub fn trend_series(&self) -> &[TrendPoint] {
        &self.trend_points
    }

    /// Each category's share of the range total.
    #[must_use]
    pub fn category_fractions(&self) -> CategoryFractions {
        let total = self.category_totals.total_kg;
        if total <= 0.0 {
            return CategoryFractions::default();
        }
        CategoryFractions {
            home_energy: self.category_totals.home_energy_kg / total,
            transportation: self.category_totals.transportation_kg / total,
            food: self.category_totals.food_kg / total,
        }
    }
}

/// Summarizes scored entries over a range.
///
/// Entries must be in ascending date order, as returned by the
/// repository. An empty slice produces zero totals, an empty trend
/// series, a `None` baseline comparison, and a stable trend.
#[must_use]
#[expect(clippy::cast_precision_loss, reason = "entry counts are far below 2^52")]
pub fn summarize(entries: &[ScoredEntry]) -> Summary {
    let mut home_energy_kg = 0.0;
    let mut transportation_kg = 0.0;
    let mut food_kg = 0.0;
    let mut source_totals = SourceEmissions::default();
    let mut min_daily_kg = f64::INFINITY;
    let mut max_daily_kg = f64::NEG_INFINITY;
    let mut trend_points = Vec::with_capacity(entries.len());

    for scored in entries {
        home_energy_kg += scored.breakdown.home_energy_kg;
        transportation_kg += scored.breakdown.transportation_kg;
        food_kg += scored.breakdown.food_kg;
        source_totals.accumulate(&compute_sources(&scored.entry));
        min_daily_kg = min_daily_kg.min(scored.breakdown.total_kg);
        max_daily_kg = max_daily_kg.max(scored.breakdown.total_kg);
        trend_points.push(TrendPoint {
            date: scored.entry.date,
            total_kg: scored.breakdown.total_kg,
        });
    }

    let total_kg = home_energy_kg + transportation_kg + food_kg;
    let entry_count = entries.len();

    let (average_daily_kg, comparison_to_baseline) = if entry_count == 0 {
        (0.0, None)
    } else {
        let avg = total_kg / entry_count as f64;
        let delta = (avg - GLOBAL_DAILY_AVERAGE_KG) / GLOBAL_DAILY_AVERAGE_KG * 100.0;
        (avg, Some(delta))
    };

    Summary {
        entry_count,
        category_totals: EmissionBreakdown {
            home_energy_kg,
            transportation_kg,
            food_kg,
            total_kg,
        },
        source_totals,
        average_daily_kg,
        min_daily_kg: if entry_count == 0 { 0.0 } else { min_daily_kg },
        max_daily_kg: if entry_count == 0 { 0.0 } else { max_daily_kg },
        comparison_to_baseline,
        trend: trend_direction(&trend_points),
        trend_points,
    }
}

/// Compares the newest 30 days of logged totals against the 30 days
/// before them, relative to the newest entry in the range.
///
/// The comparison is anchored on the data, not on the wall clock, so
/// summarizing is idempotent for a fixed range. If either window has no
/// entries the direction is reported as stable.
fn trend_direction(points: &[TrendPoint]) -> Trend {
    let Some(newest) = points.last().map(|p| p.date) else {
        return Trend::Stable;
    };
    let Some(recent_start) = newest.checked_sub_days(Days::new(TREND_WINDOW_DAYS)) else {
        return Trend::Stable;
    };
    let Some(previous_start) = newest.checked_sub_days(Days::new(2 * TREND_WINDOW_DAYS)) else {
        return Trend::Stable;
    };

    let mut recent = (0.0, 0u32);
    let mut previous = (0.0, 0u32);
    for point in points {
        if point.date > recent_start {
            recent.0 += point.total_kg;
            recent.1 += 1;
        } else if point.date > previous_start {
            previous.0 += point.total_kg;
            previous.1 += 1;
        }
    }

    if recent.1 == 0 || previous.1 == 0 {
        return Trend::Stable;
    }

    let recent_avg = recent.0 / f64::from(recent.1);
    let previous_avg = previous.0 / f64::from(previous.1);
    if (recent_avg - previous_avg).abs() < f64::EPSILON {
        Trend::Stable
    } else if recent_avg < previous_avg {
        Trend::Improving
    } else {
        Trend::Worsening
    }
}
