//! Report command for summarizing logged history.
//!
//! This module implements `ct report` with range options (--days,
//! --from/--to) and output formats (human-readable, JSON). The heavy
//! lifting is `ct_core::history::summarize`; this module only resolves
//! the range, fetches entries, and renders.

use std::fmt::Write;

use anyhow::Result;
use chrono::{Days, Local, NaiveDate};
use serde::Serialize;

use ct_core::emission::{
    EmissionBreakdown, GLOBAL_DAILY_AVERAGE_KG, SourceEmissions, trees_to_offset,
};
use ct_core::history::{CategoryFractions, Summary, Trend, TrendPoint, summarize};
use ct_core::types::UserId;
use ct_db::Database;

/// Requested report range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Range {
    /// Everything the user has logged.
    All,
    /// The last N calendar days, ending today.
    LastDays(u32),
    /// An explicit inclusive range.
    Between(NaiveDate, NaiveDate),
}

/// Computed report data.
#[derive(Debug)]
pub struct ReportData {
    pub user: UserId,
    pub range_label: String,
    pub summary: Summary,
}

/// Generates report data from the database.
///
/// `today` anchors the `--days` range so callers (and tests) control the
/// clock; the aggregation itself is anchored on the data.
pub fn generate_report_data(
    db: &Database,
    user: &UserId,
    range: Range,
    today: NaiveDate,
) -> Result<ReportData> {
    let (entries, range_label) = match range {
        Range::All => (db.get_all_entries(user)?, "all history".to_string()),
        Range::LastDays(days) => {
            let from = today
                .checked_sub_days(Days::new(u64::from(days.saturating_sub(1))))
                .unwrap_or(today);
            (
                db.get_entries(user, from, today)?,
                format!("{from} to {today}"),
            )
        }
        Range::Between(from, to) => {
            (db.get_entries(user, from, to)?, format!("{from} to {to}"))
        }
    };

    Ok(ReportData {
        user: user.clone(),
        range_label,
        summary: summarize(&entries),
    })
}

// ========== Progress Bar ==========

/// Generates a 10-character progress bar from a fraction in [0, 1].
/// Nonzero shares under 5% get a single block for visibility.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn progress_bar(fraction: f64) -> String {
    let filled = if fraction <= 0.0 {
        0
    } else if fraction < 0.05 {
        1
    } else {
        ((fraction * 10.0).round() as usize).min(10)
    };
    let empty = 10 - filled;
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

// ========== Human-Readable Output ==========

/// Formats the human-readable report output.
#[allow(clippy::cast_possible_truncation)]
pub fn format_report(data: &ReportData) -> String {
    let mut output = String::new();

    writeln!(output, "CARBON REPORT: {} ({})", data.user, data.range_label).unwrap();

    let summary = &data.summary;
    if summary.entry_count == 0 {
        writeln!(output).unwrap();
        writeln!(output, "No entries in this range.").unwrap();
        writeln!(output).unwrap();
        writeln!(output, "Hint: Run 'ct log' to record a day.").unwrap();
        return output;
    }

    let totals = &summary.category_totals;
    let fractions = summary.category_fractions();

    writeln!(output).unwrap();
    writeln!(output, "BY CATEGORY").unwrap();
    writeln!(output, "───────────").unwrap();
    for (label, kg, fraction) in [
        ("Home energy", totals.home_energy_kg, fractions.home_energy),
        (
            "Transportation",
            totals.transportation_kg,
            fractions.transportation,
        ),
        ("Food", totals.food_kg, fractions.food),
    ] {
        let pct = (fraction * 100.0).round() as i64;
        let kg = format!("{kg:.2}");
        writeln!(
            output,
            "{label:<15}{kg:>10} kg  {pct:>3}%  {}",
            progress_bar(fraction)
        )
        .unwrap();
    }

    writeln!(output).unwrap();
    writeln!(output, "BY SOURCE").unwrap();
    writeln!(output, "─────────").unwrap();
    for (label, kg) in summary.source_totals.labeled() {
        if kg > 0.0 {
            let kg = format!("{kg:.2}");
            writeln!(output, "{label:<15}{kg:>10} kg").unwrap();
        }
    }

    writeln!(output).unwrap();
    writeln!(output, "SUMMARY").unwrap();
    writeln!(output, "───────").unwrap();
    writeln!(output, "Days logged:    {}", summary.entry_count).unwrap();
    writeln!(output, "Total:          {:.2} kg CO2", totals.total_kg).unwrap();
    writeln!(
        output,
        "Daily average:  {:.2} kg CO2",
        summary.average_daily_kg
    )
    .unwrap();
    writeln!(output, "Lightest day:   {:.2} kg CO2", summary.min_daily_kg).unwrap();
    writeln!(output, "Heaviest day:   {:.2} kg CO2", summary.max_daily_kg).unwrap();
    if let Some(delta) = summary.comparison_to_baseline {
        writeln!(
            output,
            "vs global avg:  {delta:+.1}% of {GLOBAL_DAILY_AVERAGE_KG} kg/day"
        )
        .unwrap();
    }
    writeln!(output, "Trend:          {}", summary.trend.as_str()).unwrap();
    writeln!(
        output,
        "Trees to offset over a year: {:.1}",
        trees_to_offset(totals.total_kg)
    )
    .unwrap();

    output
}

// ========== JSON Output ==========

/// JSON report structure.
#[derive(Debug, Serialize)]
pub struct JsonReport {
    pub user: String,
    pub range: String,
    pub days_logged: usize,
    pub category_totals: EmissionBreakdown,
    pub category_fractions: CategoryFractions,
    pub source_totals: SourceEmissions,
    pub average_daily_kg: f64,
    pub min_daily_kg: f64,
    pub max_daily_kg: f64,
    pub baseline_delta_pct: Option<f64>,
    pub trend: Trend,
    pub trees_to_offset: f64,
    pub trend_series: Vec<TrendPoint>,
}

/// Formats report data as JSON.
pub fn format_report_json(data: &ReportData) -> Result<String> {
    let summary = &data.summary;
    let report = JsonReport {
        user: data.user.to_string(),
        range: data.range_label.clone(),
        days_logged: summary.entry_count,
        category_totals: summary.category_totals,
        category_fractions: summary.category_fractions(),
        source_totals: summary.source_totals,
        average_daily_kg: summary.average_daily_kg,
        min_daily_kg: summary.min_daily_kg,
        max_daily_kg: summary.max_daily_kg,
        baseline_delta_pct: summary.comparison_to_baseline,
        trend: summary.trend,
        trees_to_offset: trees_to_offset(summary.category_totals.total_kg),
        trend_series: summary.trend_series().to_vec(),
    };

    Ok(serde_json::to_string_pretty(&report)?)
}

// ========== Public Interface ==========

/// Runs the report command.
pub fn run(db: &Database, user: &UserId, range: Range, json: bool) -> Result<()> {
    let today = Local::now().date_naive();
    let data = generate_report_data(db, user, range, today)?;

    if json {
        let output = format_report_json(&data)?;
        println!("{output}");
    } else {
        let output = format_report(&data);
        print!("{output}");
    }

    Ok(())
}
