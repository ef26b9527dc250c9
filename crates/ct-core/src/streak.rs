//! Consecutive-day logging streaks.
//!
//! The streak state machine is a pure transition function: given the
//! prior state and the date of a newly committed entry, it produces the
//! next state. The storage layer calls it exactly once per commit and is
//! the only writer of the persisted state.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Per-user streak counters.
///
/// Invariants: `best_streak >= current_streak`, and `current_streak` is
/// zero only when the user has never logged (`last_logged_date` unset).
/// After any gap the current streak restarts at 1, not 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    /// Consecutive days ending at the most recent logged day.
    pub current_streak: u32,

    /// Longest current streak ever observed.
    pub best_streak: u32,

    /// Most recent logged date, `None` before the first entry.
    pub last_logged_date: Option<NaiveDate>,

    /// Distinct days logged, across all time.
    pub total_entries: u64,
}

/// Advances the streak for a newly committed entry.
///
/// Accepts any date: a same-day resubmission leaves the state unchanged,
/// a next-day entry extends the streak, and anything else — a missed day
/// or a backdated date — resets the current streak to 1. The last logged
/// date never moves backwards.
#[must_use]
pub fn advance(prior: &StreakState, new_date: NaiveDate) -> StreakState {
    let Some(last) = prior.last_logged_date else {
        // First-ever entry
        return StreakState {
            current_streak: 1,
            best_streak: prior.best_streak.max(1),
            last_logged_date: Some(new_date),
            total_entries: 1,
        };
    };

    if new_date == last {
        // Same-day resubmission replaces the entry; the streak and the
        // distinct-day count are untouched.
        return prior.clone();
    }

    let current_streak = if Some(new_date) == last.checked_add_days(Days::new(1)) {
        prior.current_streak + 1
    } else {
        1
    };

    StreakState {
        current_streak,
        best_streak: prior.best_streak.max(current_streak),
        last_logged_date: Some(last.max(new_date)),
        total_entries: prior.total_entries + 1,
    }
}
