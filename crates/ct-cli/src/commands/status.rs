//! Status command for showing streak counters and latest activity.

use std::io::Write;
use std::path::Path;

use anyhow::Result;

use ct_core::types::UserId;
use ct_db::Database;

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    user: &UserId,
    database_path: &Path,
) -> Result<()> {
    let streak = db.get_streak_state(user)?;
    let count = db.entry_count(user)?;

    writeln!(writer, "Carbon tracker status")?;
    writeln!(writer, "Database: {}", database_path.display())?;
    writeln!(writer, "User: {user}")?;

    let Some(last_logged) = streak.last_logged_date else {
        writeln!(writer, "No entries logged.")?;
        return Ok(());
    };

    writeln!(writer, "Current streak: {} days", streak.current_streak)?;
    writeln!(writer, "Best streak:    {} days", streak.best_streak)?;
    writeln!(writer, "Days logged:    {count}")?;
    writeln!(writer, "Last logged:    {last_logged}")?;

    Ok(())
}
