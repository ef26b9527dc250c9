use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ct_cli::commands::{log, report, status};
use ct_cli::{Cli, Commands, Config};
use ct_core::types::{ActivityEntry, UserId};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(ct_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = ct_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

fn resolve_user(cli_user: Option<&str>, config: &Config) -> Result<UserId> {
    let name = cli_user.unwrap_or(&config.default_user);
    UserId::new(name).context("invalid user")
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    match &cli.command {
        Some(Commands::Log {
            date,
            electricity,
            gas,
            water,
            car_miles,
            transit_miles,
            short_flights,
            long_flights,
            meat,
            dairy,
            plant,
        }) => {
            let (mut db, config) = open_database(cli.config.as_deref())?;
            let user = resolve_user(cli.user.as_deref(), &config)?;
            let entry = ActivityEntry {
                date: date.unwrap_or_else(|| chrono::Local::now().date_naive()),
                electricity_kwh: *electricity,
                natural_gas_therms: *gas,
                water_gallons: *water,
                car_miles: *car_miles,
                transit_miles: *transit_miles,
                short_haul_flights: *short_flights,
                long_haul_flights: *long_flights,
                meat_servings: *meat,
                dairy_servings: *dairy,
                plant_servings: *plant,
            };
            let mut stdout = std::io::stdout();
            log::run(&mut stdout, &mut db, &user, &entry)?;
        }
        Some(Commands::Report {
            days,
            from,
            to,
            json,
        }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let user = resolve_user(cli.user.as_deref(), &config)?;
            let range = match (from, to, days) {
                (Some(from), Some(to), _) => report::Range::Between(*from, *to),
                (_, _, Some(days)) => report::Range::LastDays(*days),
                _ => report::Range::All,
            };
            report::run(&db, &user, range, *json)?;
        }
        Some(Commands::Status) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let user = resolve_user(cli.user.as_deref(), &config)?;
            let mut stdout = std::io::stdout();
            status::run(&mut stdout, &db, &user, &config.database_path)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
