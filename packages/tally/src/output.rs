//! Date-stamped CSV output.
//!
//! Every derived table lands next to the others under the working output
//! directory with the `{description}_{year}_{YYYYMMDD}.csv` convention,
//! the date being the run date.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;

use crate::TallyError;

/// Builds the conventional output filename for a table.
#[must_use]
pub fn stamped_filename(description: &str, year: i32, run_date: NaiveDate) -> String {
    format!("{description}_{year}_{}.csv", run_date.format("%Y%m%d"))
}

/// Serializes rows to a CSV file, headers first.
///
/// # Errors
///
/// Returns [`TallyError`] if the file cannot be created or a row fails to
/// serialize.
pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), TallyError> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    log::info!("wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

/// Writes rows under `dir` with the stamped filename convention and
/// returns the full path written.
///
/// # Errors
///
/// Returns [`TallyError`] on serialization or I/O failure.
pub fn write_stamped<T: Serialize>(
    dir: &Path,
    description: &str,
    year: i32,
    run_date: NaiveDate,
    rows: &[T],
) -> Result<PathBuf, TallyError> {
    let path = dir.join(stamped_filename(description, year, run_date));
    write_csv(&path, rows)?;
    Ok(path)
}
