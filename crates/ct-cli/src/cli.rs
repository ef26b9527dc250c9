//! Command-line argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Personal carbon footprint tracker.
///
/// Logs daily activity quantities, scores them with fixed emission
/// factors, and reports trends, category breakdowns, and logging streaks.
#[derive(Debug, Parser)]
#[command(name = "ct", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// User to act as (defaults to the configured user).
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Log one day's activities and update the streak.
    ///
    /// Logging the same date again replaces that day's entry.
    Log {
        /// Day to log (YYYY-MM-DD, defaults to today).
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Electricity used, in kWh.
        #[arg(long, default_value_t = 0.0)]
        electricity: f64,

        /// Natural gas burned, in therms.
        #[arg(long, default_value_t = 0.0)]
        gas: f64,

        /// Water consumed, in gallons.
        #[arg(long, default_value_t = 0.0)]
        water: f64,

        /// Car travel, in miles.
        #[arg(long, default_value_t = 0.0)]
        car_miles: f64,

        /// Public transit travel, in miles.
        #[arg(long, default_value_t = 0.0)]
        transit_miles: f64,

        /// Short-haul flights taken (under ~3 hours).
        #[arg(long, default_value_t = 0.0)]
        short_flights: f64,

        /// Long-haul flights taken (over ~3 hours).
        #[arg(long, default_value_t = 0.0)]
        long_flights: f64,

        /// Meat servings eaten.
        #[arg(long, default_value_t = 0.0)]
        meat: f64,

        /// Dairy servings eaten.
        #[arg(long, default_value_t = 0.0)]
        dairy: f64,

        /// Plant-based servings eaten.
        #[arg(long, default_value_t = 0.0)]
        plant: f64,
    },

    /// Summarize logged history: categories, sources, trend, baseline.
    Report {
        /// Limit the report to the last N days.
        #[arg(long, conflicts_with_all = ["from", "to"])]
        days: Option<u32>,

        /// Range start (YYYY-MM-DD, inclusive).
        #[arg(long, requires = "to")]
        from: Option<NaiveDate>,

        /// Range end (YYYY-MM-DD, inclusive).
        #[arg(long, requires = "from")]
        to: Option<NaiveDate>,

        /// Emit JSON instead of the human-readable report.
        #[arg(long)]
        json: bool,
    },

    /// Show streak counters and latest activity.
    Status,
}
