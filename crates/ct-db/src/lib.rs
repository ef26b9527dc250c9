//! Storage layer for the carbon tracker.
//!
//! Provides persistence for activity entries and streak state using
//! `rusqlite`. This crate is the entry repository the core computes
//! around: it owns the stored data, while scoring, streak transitions,
//! and aggregation stay pure functions in `ct-core`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send`
//! but not `Sync`. A `Database` instance can be moved between threads
//! but cannot be shared without external synchronization.
//!
//! # Schema
//!
//! Dates are stored as TEXT in ISO 8601 `YYYY-MM-DD` form, so
//! lexicographic ordering matches chronological ordering. One entry row
//! per (user, date); resubmitting a date is an upsert that replaces the
//! quantities and recomputed totals (last write wins). Streak state is
//! one row per user, written only through [`Database::commit_entry`].

use std::path::Path;

use chrono::{NaiveDate, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;
use uuid::Uuid;

use ct_core::emission::EmissionBreakdown;
use ct_core::history::ScoredEntry;
use ct_core::streak::{self, StreakState};
use ct_core::types::{ActivityEntry, UserId};

/// Date format used for entry keys.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to parse a stored date.
    #[error("invalid stored date for user {user_id}: {date}")]
    DateParse {
        user_id: String,
        date: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection
    /// closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized
    /// database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            -- Entries table: one row per user per calendar day
            -- date: ISO 8601 day (e.g., '2025-06-01')
            -- computed *_kg columns are derived from the quantities and
            -- rewritten on every upsert
            CREATE TABLE IF NOT EXISTS entries (
                id TEXT NOT NULL,
                user_id TEXT NOT NULL,
                date TEXT NOT NULL,
                electricity_kwh REAL NOT NULL DEFAULT 0,
                natural_gas_therms REAL NOT NULL DEFAULT 0,
                water_gallons REAL NOT NULL DEFAULT 0,
                car_miles REAL NOT NULL DEFAULT 0,
                transit_miles REAL NOT NULL DEFAULT 0,
                short_haul_flights REAL NOT NULL DEFAULT 0,
                long_haul_flights REAL NOT NULL DEFAULT 0,
                meat_servings REAL NOT NULL DEFAULT 0,
                dairy_servings REAL NOT NULL DEFAULT 0,
                plant_servings REAL NOT NULL DEFAULT 0,
                home_energy_kg REAL NOT NULL DEFAULT 0,
                transportation_kg REAL NOT NULL DEFAULT 0,
                food_kg REAL NOT NULL DEFAULT 0,
                total_kg REAL NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                PRIMARY KEY (user_id, date)
            );

            CREATE INDEX IF NOT EXISTS idx_entries_date ON entries(date);

            CREATE TABLE IF NOT EXISTS streaks (
                user_id TEXT PRIMARY KEY,
                current_streak INTEGER NOT NULL DEFAULT 0,
                best_streak INTEGER NOT NULL DEFAULT 0,
                last_logged_date TEXT,
                total_entries INTEGER NOT NULL DEFAULT 0,
                updated_at TEXT NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    /// Upserts one day's entry with its computed breakdown.
    ///
    /// Resubmitting the same (user, date) replaces the stored quantities
    /// and totals; the row identity and creation time are kept.
    pub fn upsert_entry(
        &mut self,
        user: &UserId,
        entry: &ActivityEntry,
        breakdown: &EmissionBreakdown,
    ) -> Result<(), DbError> {
        upsert_entry_inner(&self.conn, user, entry, breakdown)
    }

    /// Lists a user's entries with both range endpoints inclusive,
    /// ascending by date.
    pub fn get_entries(
        &self,
        user: &UserId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<ScoredEntry>, DbError> {
        if to < from {
            return Ok(Vec::new());
        }
        let mut stmt = self.conn.prepare(
            "
            SELECT date, electricity_kwh, natural_gas_therms, water_gallons,
                   car_miles, transit_miles, short_haul_flights, long_haul_flights,
                   meat_servings, dairy_servings, plant_servings,
                   home_energy_kg, transportation_kg, food_kg, total_kg
            FROM entries
            WHERE user_id = ? AND date >= ? AND date <= ?
            ORDER BY date ASC
            ",
        )?;
        let rows = stmt.query_map(
            params![
                user.as_str(),
                from.format(DATE_FORMAT).to_string(),
                to.format(DATE_FORMAT).to_string(),
            ],
            row_to_raw_entry,
        )?;
        collect_scored(rows, user)
    }

    /// Lists a user's full history, ascending by date.
    pub fn get_all_entries(&self, user: &UserId) -> Result<Vec<ScoredEntry>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT date, electricity_kwh, natural_gas_therms, water_gallons,
                   car_miles, transit_miles, short_haul_flights, long_haul_flights,
                   meat_servings, dairy_servings, plant_servings,
                   home_energy_kg, transportation_kg, food_kg, total_kg
            FROM entries
            WHERE user_id = ?
            ORDER BY date ASC
            ",
        )?;
        let rows = stmt.query_map(params![user.as_str()], row_to_raw_entry)?;
        collect_scored(rows, user)
    }

    /// Reads a user's streak state, or the zero-value initial state if
    /// the user has never logged.
    pub fn get_streak_state(&self, user: &UserId) -> Result<StreakState, DbError> {
        read_streak(&self.conn, user)
    }

    /// Writes a user's streak state.
    pub fn put_streak_state(&mut self, user: &UserId, state: &StreakState) -> Result<(), DbError> {
        write_streak(&self.conn, user, state)
    }

    /// Commits one day's entry: upserts it and advances the streak, in a
    /// single transaction. Returns the updated streak state.
    ///
    /// This is the only write path that touches streak state, and the
    /// explicit data-changing event that triggers recomputation.
    pub fn commit_entry(
        &mut self,
        user: &UserId,
        entry: &ActivityEntry,
        breakdown: &EmissionBreakdown,
    ) -> Result<StreakState, DbError> {
        let tx = self.conn.transaction()?;
        upsert_entry_inner(&tx, user, entry, breakdown)?;
        let prior = read_streak(&tx, user)?;
        let next = streak::advance(&prior, entry.date);
        write_streak(&tx, user, &next)?;
        tx.commit()?;
        tracing::debug!(
            user = user.as_str(),
            date = %entry.date,
            total_kg = breakdown.total_kg,
            current_streak = next.current_streak,
            "entry committed"
        );
        Ok(next)
    }

    /// Number of logged days for a user.
    pub fn entry_count(&self, user: &UserId) -> Result<u64, DbError> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM entries WHERE user_id = ?",
            params![user.as_str()],
            |row| row.get::<_, u64>(0),
        )?;
        Ok(count)
    }

    /// Most recent logged date for a user, if any.
    pub fn latest_entry_date(&self, user: &UserId) -> Result<Option<NaiveDate>, DbError> {
        let date: Option<String> = self
            .conn
            .query_row(
                "SELECT MAX(date) FROM entries WHERE user_id = ?",
                params![user.as_str()],
                |row| row.get(0),
            )
            .optional()?
            .flatten();
        date.map(|d| parse_date(user, &d)).transpose()
    }
}

/// Entry row with the date still unparsed.
type RawEntry = (String, ActivityEntry, EmissionBreakdown);

fn row_to_raw_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEntry> {
    let date: String = row.get(0)?;
    let entry = ActivityEntry {
        date: NaiveDate::default(), // filled in after parsing
        electricity_kwh: row.get(1)?,
        natural_gas_therms: row.get(2)?,
        water_gallons: row.get(3)?,
        car_miles: row.get(4)?,
        transit_miles: row.get(5)?,
        short_haul_flights: row.get(6)?,
        long_haul_flights: row.get(7)?,
        meat_servings: row.get(8)?,
        dairy_servings: row.get(9)?,
        plant_servings: row.get(10)?,
    };
    let breakdown = EmissionBreakdown {
        home_energy_kg: row.get(11)?,
        transportation_kg: row.get(12)?,
        food_kg: row.get(13)?,
        total_kg: row.get(14)?,
    };
    Ok((date, entry, breakdown))
}

fn collect_scored(
    rows: impl Iterator<Item = rusqlite::Result<RawEntry>>,
    user: &UserId,
) -> Result<Vec<ScoredEntry>, DbError> {
    let mut entries = Vec::new();
    for row in rows {
        let (date, mut entry, breakdown) = row?;
        entry.date = parse_date(user, &date)?;
        entries.push(ScoredEntry { entry, breakdown });
    }
    Ok(entries)
}

fn parse_date(user: &UserId, date: &str) -> Result<NaiveDate, DbError> {
    NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|source| DbError::DateParse {
        user_id: user.as_str().to_string(),
        date: date.to_string(),
        source,
    })
}

fn format_timestamp(ts: chrono::DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn upsert_entry_inner(
    conn: &Connection,
    user: &UserId,
    entry: &ActivityEntry,
    breakdown: &EmissionBreakdown,
) -> Result<(), DbError> {
    conn.execute(
        "
        INSERT INTO entries
        (id, user_id, date, electricity_kwh, natural_gas_therms, water_gallons,
         car_miles, transit_miles, short_haul_flights, long_haul_flights,
         meat_servings, dairy_servings, plant_servings,
         home_energy_kg, transportation_kg, food_kg, total_kg, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT (user_id, date) DO UPDATE SET
            electricity_kwh = excluded.electricity_kwh,
            natural_gas_therms = excluded.natural_gas_therms,
            water_gallons = excluded.water_gallons,
            car_miles = excluded.car_miles,
            transit_miles = excluded.transit_miles,
            short_haul_flights = excluded.short_haul_flights,
            long_haul_flights = excluded.long_haul_flights,
            meat_servings = excluded.meat_servings,
            dairy_servings = excluded.dairy_servings,
            plant_servings = excluded.plant_servings,
            home_energy_kg = excluded.home_energy_kg,
            transportation_kg = excluded.transportation_kg,
            food_kg = excluded.food_kg,
            total_kg = excluded.total_kg
        ",
        params![
            Uuid::new_v4().to_string(),
            user.as_str(),
            entry.date.format(DATE_FORMAT).to_string(),
            entry.electricity_kwh,
            entry.natural_gas_therms,
            entry.water_gallons,
            entry.car_miles,
            entry.transit_miles,
            entry.short_haul_flights,
            entry.long_haul_flights,
            entry.meat_servings,
            entry.dairy_servings,
            entry.plant_servings,
            breakdown.home_energy_kg,
            breakdown.transportation_kg,
            breakdown.food_kg,
            breakdown.total_kg,
            format_timestamp(Utc::now()),
        ],
    )?;
    Ok(())
}

fn read_streak(conn: &Connection, user: &UserId) -> Result<StreakState, DbError> {
    let row: Option<(u32, u32, Option<String>, u64)> = conn
        .query_row(
            "
            SELECT current_streak, best_streak, last_logged_date, total_entries
            FROM streaks
            WHERE user_id = ?
            ",
            params![user.as_str()],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )
        .optional()?;

    let Some((current_streak, best_streak, last_logged_date, total_entries)) = row else {
        return Ok(StreakState::default());
    };
    let last_logged_date = last_logged_date.map(|d| parse_date(user, &d)).transpose()?;
    Ok(StreakState {
        current_streak,
        best_streak,
        last_logged_date,
        total_entries,
    })
}

fn write_streak(conn: &Connection, user: &UserId, state: &StreakState) -> Result<(), DbError> {
    conn.execute(
        "
        INSERT INTO streaks (user_id, current_streak, best_streak, last_logged_date, total_entries, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT (user_id) DO UPDATE SET
            current_streak = excluded.current_streak,
            best_streak = excluded.best_streak,
            last_logged_date = excluded.last_logged_date,
            total_entries = excluded.total_entries,
            updated_at = excluded.updated_at
        ",
        params![
            user.as_str(),
            state.current_streak,
            state.best_streak,
            state
                .last_logged_date
                .map(|d| d.format(DATE_FORMAT).to_string()),
            state.total_entries,
            format_timestamp(Utc::now()),
        ],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use ct_core::emission::compute;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn user() -> UserId {
        UserId::new("sami").unwrap()
    }

    fn entry_for(d: NaiveDate, kwh: f64) -> (ActivityEntry, EmissionBreakdown) {
        let entry = ActivityEntry {
            electricity_kwh: kwh,
            ..ActivityEntry::for_date(d)
        };
        let breakdown = compute(&entry);
        (entry, breakdown)
    }

    #[test]
    fn open_creates_schema_on_disk() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("ct.db");
        let db = Database::open(&path).unwrap();
        assert_eq!(db.entry_count(&user()).unwrap(), 0);
        // Reopen is idempotent
        drop(db);
        let db = Database::open(&path).unwrap();
        assert_eq!(db.entry_count(&user()).unwrap(), 0);
    }

    #[test]
    fn get_entries_is_inclusive_of_both_endpoints() {
        let mut db = Database::open_in_memory().unwrap();
        let user = user();
        for day in 1..=5 {
            let (entry, breakdown) = entry_for(date(2025, 6, day), 10.0);
            db.upsert_entry(&user, &entry, &breakdown).unwrap();
        }

        let entries = db
            .get_entries(&user, date(2025, 6, 2), date(2025, 6, 4))
            .unwrap();
        let dates: Vec<_> = entries.iter().map(|e| e.entry.date).collect();
        assert_eq!(
            dates,
            vec![date(2025, 6, 2), date(2025, 6, 3), date(2025, 6, 4)]
        );
    }

    #[test]
    fn get_entries_empty_when_range_inverted() {
        let mut db = Database::open_in_memory().unwrap();
        let user = user();
        let (entry, breakdown) = entry_for(date(2025, 6, 1), 10.0);
        db.upsert_entry(&user, &entry, &breakdown).unwrap();

        let entries = db
            .get_entries(&user, date(2025, 6, 5), date(2025, 6, 1))
            .unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn upsert_replaces_rather_than_accumulates() {
        let mut db = Database::open_in_memory().unwrap();
        let user = user();
        let (entry, breakdown) = entry_for(date(2025, 6, 1), 10.0);
        db.upsert_entry(&user, &entry, &breakdown).unwrap();
        let (entry, breakdown) = entry_for(date(2025, 6, 1), 30.0);
        db.upsert_entry(&user, &entry, &breakdown).unwrap();

        let entries = db.get_all_entries(&user).unwrap();
        assert_eq!(entries.len(), 1);
        assert!((entries[0].entry.electricity_kwh - 30.0).abs() < f64::EPSILON);
        assert!((entries[0].breakdown.total_kg - 12.0).abs() < 1e-9);
    }

    #[test]
    fn entries_are_isolated_per_user() {
        let mut db = Database::open_in_memory().unwrap();
        let sami = user();
        let lena = UserId::new("lena").unwrap();
        let (entry, breakdown) = entry_for(date(2025, 6, 1), 10.0);
        db.upsert_entry(&sami, &entry, &breakdown).unwrap();

        assert_eq!(db.get_all_entries(&lena).unwrap().len(), 0);
        assert_eq!(db.entry_count(&sami).unwrap(), 1);
        assert_eq!(db.entry_count(&lena).unwrap(), 0);
    }

    #[test]
    fn streak_state_defaults_to_zero_value() {
        let db = Database::open_in_memory().unwrap();
        let state = db.get_streak_state(&user()).unwrap();
        assert_eq!(state, StreakState::default());
    }

    #[test]
    fn streak_state_roundtrips() {
        let mut db = Database::open_in_memory().unwrap();
        let user = user();
        let state = StreakState {
            current_streak: 3,
            best_streak: 7,
            last_logged_date: Some(date(2025, 6, 3)),
            total_entries: 15,
        };
        db.put_streak_state(&user, &state).unwrap();
        assert_eq!(db.get_streak_state(&user).unwrap(), state);
    }

    #[test]
    fn commit_entry_advances_streak_transactionally() {
        let mut db = Database::open_in_memory().unwrap();
        let user = user();

        for (day, expected) in [(1, 1), (2, 2), (3, 3)] {
            let (entry, breakdown) = entry_for(date(2025, 6, day), 10.0);
            let state = db.commit_entry(&user, &entry, &breakdown).unwrap();
            assert_eq!(state.current_streak, expected);
        }

        // Gap day, then a new entry resets the current streak
        let (entry, breakdown) = entry_for(date(2025, 6, 5), 10.0);
        let state = db.commit_entry(&user, &entry, &breakdown).unwrap();
        assert_eq!(state.current_streak, 1);
        assert_eq!(state.best_streak, 3);
        assert_eq!(db.get_streak_state(&user).unwrap(), state);
        assert_eq!(db.entry_count(&user).unwrap(), 4);
    }

    #[test]
    fn commit_entry_same_day_is_idempotent_for_streak() {
        let mut db = Database::open_in_memory().unwrap();
        let user = user();
        let (entry, breakdown) = entry_for(date(2025, 6, 1), 10.0);
        let first = db.commit_entry(&user, &entry, &breakdown).unwrap();
        let (entry, breakdown) = entry_for(date(2025, 6, 1), 99.0);
        let second = db.commit_entry(&user, &entry, &breakdown).unwrap();

        assert_eq!(first, second);
        assert_eq!(db.entry_count(&user).unwrap(), 1);
        // But the entry itself was replaced
        let entries = db.get_all_entries(&user).unwrap();
        assert!((entries[0].entry.electricity_kwh - 99.0).abs() < f64::EPSILON);
    }

    #[test]
    fn latest_entry_date_tracks_maximum() {
        let mut db = Database::open_in_memory().unwrap();
        let user = user();
        assert_eq!(db.latest_entry_date(&user).unwrap(), None);

        for day in [3, 1, 2] {
            let (entry, breakdown) = entry_for(date(2025, 6, day), 10.0);
            db.upsert_entry(&user, &entry, &breakdown).unwrap();
        }
        assert_eq!(db.latest_entry_date(&user).unwrap(), Some(date(2025, 6, 3)));
    }

    #[test]
    fn malformed_stored_date_surfaces_as_date_parse() {
        let db = Database::open_in_memory().unwrap();
        db.conn
            .execute(
                "INSERT INTO entries (id, user_id, date, created_at) VALUES (?, ?, ?, ?)",
                params!["bad-row", "sami", "not-a-date", "2025-06-01T00:00:00Z"],
            )
            .unwrap();

        let err = db.get_all_entries(&user()).unwrap_err();
        assert!(matches!(err, DbError::DateParse { .. }));
    }
}
