//! Log command: validate, score, and commit one day's entry.
//!
//! This is the single data-changing event in the system. Everything
//! downstream (streaks, reports) recomputes from what gets committed
//! here; nothing recomputes on its own.

use std::io::Write;

use anyhow::{Context, Result};

use ct_core::emission::{self, GLOBAL_DAILY_AVERAGE_KG};
use ct_core::types::{ActivityEntry, UserId};
use ct_db::Database;

pub fn run<W: Write>(
    writer: &mut W,
    db: &mut Database,
    user: &UserId,
    entry: &ActivityEntry,
) -> Result<()> {
    entry.validate().context("invalid activity quantities")?;

    let breakdown = emission::compute(entry);
    let streak = db.commit_entry(user, entry, &breakdown)?;

    writeln!(writer, "Logged {} for {user}", entry.date)?;
    writeln!(writer)?;
    writeln!(writer, "Home energy:    {:.2} kg CO2", breakdown.home_energy_kg)?;
    writeln!(
        writer,
        "Transportation: {:.2} kg CO2",
        breakdown.transportation_kg
    )?;
    writeln!(writer, "Food:           {:.2} kg CO2", breakdown.food_kg)?;
    writeln!(writer, "Total:          {:.2} kg CO2", breakdown.total_kg)?;
    writeln!(writer)?;

    let delta = (breakdown.total_kg - GLOBAL_DAILY_AVERAGE_KG) / GLOBAL_DAILY_AVERAGE_KG * 100.0;
    writeln!(writer, "vs global daily average: {delta:+.1}%")?;
    writeln!(
        writer,
        "Trees to offset over a year: {:.1}",
        emission::trees_to_offset(breakdown.total_kg)
    )?;
    writeln!(
        writer,
        "Current streak: {} days (best: {})",
        streak.current_streak, streak.best_streak
    )?;

    Ok(())
}
