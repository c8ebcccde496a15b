//! Legacy daily-tally reconciliation.
//!
//! The long-run historical file is a CSV export with a different schema
//! from the current pipeline: a 2-row metadata preamble, an unnamed index
//! column plus a legacy `ID` column, the season year under `FireSeason`,
//! and total acres under `TotalAcres`. Rather than renaming columns ad hoc
//! wherever the two sources meet, both are mapped by a pure transform into
//! the shared [`DailyUnitTally`] schema; that pair of functions is the one
//! place to touch if either source drifts.
//!
//! The merge itself is a plain concatenation sorted by date. The two
//! sources cover disjoint date ranges, so there is no de-duplication or
//! conflict resolution.

use std::path::Path;

use ak_fire_models::{DailyUnitTally, HistoricalDailyRecord, SeasonDailyTotal, ZoneDailyTally};
use chrono::{Datelike, NaiveDate};

use crate::TallyError;

const COL_SEASON: &str = "FireSeason";
const COL_MONTH: &str = "Month";
const COL_DAY: &str = "Day";
const COL_UNIT: &str = "ProtectionUnit";
const COL_FIRES: &str = "TotalFires";
const COL_ACRES: &str = "TotalAcres";

/// Number of metadata lines before the legacy file's header row.
const PREAMBLE_LINES: usize = 2;

/// Loads the legacy daily tally CSV.
///
/// Skips the 2-row metadata preamble, ignores the unnamed index and `ID`
/// artifact columns, and synthesizes each row's report date from its
/// (`FireSeason`, `Month`, `Day`) fields. The fire count parses as an
/// optional integer; early seasons leave it blank.
///
/// # Errors
///
/// Returns [`TallyError`] if the file cannot be read, a required column is
/// missing, or a row carries an unparseable field or impossible date.
pub fn load_historical(path: &Path) -> Result<Vec<HistoricalDailyRecord>, TallyError> {
    let raw = std::fs::read_to_string(path)?;
    let body = skip_preamble(&raw);

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(body.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_owned()).collect();
    let season_col = find_column(&headers, COL_SEASON, path)?;
    let month_col = find_column(&headers, COL_MONTH, path)?;
    let day_col = find_column(&headers, COL_DAY, path)?;
    let unit_col = find_column(&headers, COL_UNIT, path)?;
    let fires_col = find_column(&headers, COL_FIRES, path)?;
    let acres_col = find_column(&headers, COL_ACRES, path)?;

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let row = result?;
        let rownum = idx + 1;

        let year: i32 = parse_field(&row, season_col, rownum, COL_SEASON, path)?;
        let month: u32 = parse_field(&row, month_col, rownum, COL_MONTH, path)?;
        let day: u32 = parse_field(&row, day_col, rownum, COL_DAY, path)?;
        let acres: f64 = parse_field(&row, acres_col, rownum, COL_ACRES, path)?;

        let fires = match row.get(fires_col).map(str::trim) {
            None | Some("") => None,
            Some(value) => Some(value.parse::<i64>().map_err(|_| TallyError::BadField {
                row: rownum,
                column: COL_FIRES,
                value: value.to_owned(),
                file: path.to_path_buf(),
            })?),
        };

        let report_date =
            NaiveDate::from_ymd_opt(year, month, day).ok_or(TallyError::BadDate {
                row: rownum,
                year,
                month,
                day,
                file: path.to_path_buf(),
            })?;

        records.push(HistoricalDailyRecord {
            year,
            month,
            day,
            protection_unit: row.get(unit_col).unwrap_or_default().trim().to_owned(),
            fires,
            acres,
            report_date,
        });
    }

    log::info!("loaded {} historical rows from {}", records.len(), path.display());
    Ok(records)
}

/// Maps legacy rows into the canonical per-unit daily schema.
#[must_use]
pub fn legacy_daily_units(records: &[HistoricalDailyRecord]) -> Vec<DailyUnitTally> {
    records
        .iter()
        .map(|r| DailyUnitTally {
            year: r.year,
            month: r.month,
            day: r.day,
            protection_unit: r.protection_unit.clone(),
            acres: r.acres,
            report_date: r.report_date,
        })
        .collect()
}

/// Maps the current season's Zone aggregation into the canonical per-unit
/// daily schema: Year/Month/Day derived from the report date, the zone
/// name carried as the protection unit, the zone code label dropped.
#[must_use]
pub fn current_daily_units(tallies: &[ZoneDailyTally]) -> Vec<DailyUnitTally> {
    tallies
        .iter()
        .map(|t| DailyUnitTally {
            year: t.report_date.year(),
            month: t.report_date.month(),
            day: t.report_date.day(),
            protection_unit: t.protecting_office.clone(),
            acres: t.acres,
            report_date: t.report_date,
        })
        .collect()
}

/// Concatenates the two canonical tables into one series sorted by date.
///
/// No de-duplication and no conflict resolution: the legacy file ends
/// where the current season begins.
#[must_use]
pub fn merge_daily_units(
    legacy: Vec<DailyUnitTally>,
    current: Vec<DailyUnitTally>,
) -> Vec<DailyUnitTally> {
    let mut merged = legacy;
    merged.extend(current);
    merged.sort_by_key(|unit| unit.report_date);
    merged
}

/// Collapses per-unit rows to one statewide row per (date, season year),
/// summing acres and dropping the per-unit detail.
#[must_use]
pub fn season_daily_totals(units: &[DailyUnitTally]) -> Vec<SeasonDailyTotal> {
    let mut sums: std::collections::BTreeMap<(NaiveDate, i32), f64> =
        std::collections::BTreeMap::new();
    for unit in units {
        *sums.entry((unit.report_date, unit.year)).or_insert(0.0) += unit.acres;
    }
    sums.into_iter()
        .map(|((report_date, year), acres)| SeasonDailyTotal {
            report_date,
            year,
            acres,
        })
        .collect()
}

fn skip_preamble(raw: &str) -> &str {
    let mut rest = raw;
    for _ in 0..PREAMBLE_LINES {
        match rest.split_once('\n') {
            Some((_, tail)) => rest = tail,
            None => return "",
        }
    }
    rest
}

fn find_column(headers: &[String], name: &str, path: &Path) -> Result<usize, TallyError> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| TallyError::MissingColumn {
            column: name.to_owned(),
            file: path.to_path_buf(),
        })
}

fn parse_field<T: std::str::FromStr>(
    row: &csv::StringRecord,
    col: usize,
    rownum: usize,
    column: &'static str,
    path: &Path,
) -> Result<T, TallyError> {
    let value = row.get(col).unwrap_or_default().trim();
    value.parse().map_err(|_| TallyError::BadField {
        row: rownum,
        column,
        value: value.to_owned(),
        file: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEGACY_SAMPLE: &str = "\
AICC daily fire tally export\n\
generated 2025-01-02\n\
,ID,FireSeason,Month,Day,ProtectionUnit,TotalFires,TotalAcres\n\
0,101,2024,6,30,Tanana Zone,4,1200.5\n\
1,102,2024,12,31,Galena Zone,,40.0\n";

    fn write_sample(name: &str, content: &str) -> std::path::PathBuf {
        let tmp = std::env::temp_dir().join(name);
        std::fs::write(&tmp, content).unwrap();
        tmp
    }

    fn unit(date: &str, unit_name: &str, acres: f64) -> DailyUnitTally {
        let report_date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        DailyUnitTally {
            year: report_date.year(),
            month: report_date.month(),
            day: report_date.day(),
            protection_unit: unit_name.to_owned(),
            acres,
            report_date,
        }
    }

    #[test]
    fn loads_legacy_file_past_the_preamble() {
        let path = write_sample("ak_fire_tally_test_legacy.csv", LEGACY_SAMPLE);
        let records = load_historical(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].year, 2024);
        assert_eq!(records[0].fires, Some(4));
        assert_eq!(records[1].fires, None);
        assert_eq!(records[1].report_date.to_string(), "2024-12-31");
        assert!((records[1].acres - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_column_is_reported_by_name() {
        let path = write_sample(
            "ak_fire_tally_test_legacy_missing.csv",
            "preamble\npreamble\n,ID,FireSeason,Month,Day,TotalFires,TotalAcres\n",
        );
        let err = load_historical(&path).unwrap_err();
        let _ = std::fs::remove_file(&path);

        assert!(matches!(
            err,
            TallyError::MissingColumn { column, .. } if column == COL_UNIT
        ));
    }

    #[test]
    fn impossible_date_is_a_data_error() {
        let path = write_sample(
            "ak_fire_tally_test_legacy_baddate.csv",
            "p\np\n,ID,FireSeason,Month,Day,ProtectionUnit,TotalFires,TotalAcres\n0,1,2024,2,30,Tok Area,1,5.0\n",
        );
        let err = load_historical(&path).unwrap_err();
        let _ = std::fs::remove_file(&path);

        assert!(matches!(err, TallyError::BadDate { day: 30, .. }));
    }

    #[test]
    fn current_units_derive_calendar_fields_and_drop_the_code() {
        let tallies = vec![ZoneDailyTally {
            report_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            protecting_office: "Tanana Zone".to_owned(),
            protecting_office_label: "TAD".to_owned(),
            acres: 17.0,
        }];

        let units = current_daily_units(&tallies);
        assert_eq!(units[0].year, 2025);
        assert_eq!(units[0].month, 6);
        assert_eq!(units[0].day, 1);
        assert_eq!(units[0].protection_unit, "Tanana Zone");
    }

    #[test]
    fn merge_spans_both_ranges_sorted_with_no_rows_lost() {
        let legacy = vec![
            unit("2024-12-30", "Tanana Zone", 10.0),
            unit("2024-12-31", "Tanana Zone", 11.0),
        ];
        let current = vec![
            unit("2025-01-01", "Tanana Zone", 12.0),
            unit("2025-01-02", "Galena Zone", 13.0),
        ];

        let merged = merge_daily_units(legacy, current);
        assert_eq!(merged.len(), 4);
        assert_eq!(merged.first().unwrap().report_date.to_string(), "2024-12-30");
        assert_eq!(merged.last().unwrap().report_date.to_string(), "2025-01-02");
        assert!(merged.windows(2).all(|w| w[0].report_date <= w[1].report_date));
    }

    #[test]
    fn merge_applies_no_deduplication() {
        let row = unit("2024-06-01", "Tok Area", 5.0);
        let merged = merge_daily_units(vec![row.clone()], vec![row]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn season_totals_collapse_unit_detail() {
        let units = vec![
            unit("2024-06-01", "Tanana Zone", 10.0),
            unit("2024-06-01", "Galena Zone", 5.0),
            unit("2025-06-01", "Tanana Zone", 7.0),
        ];

        let totals = season_daily_totals(&units);
        assert_eq!(totals.len(), 2);
        assert!((totals[0].acres - 15.0).abs() < f64::EPSILON);
        assert_eq!(totals[1].year, 2025);
    }
}
