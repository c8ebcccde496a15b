//! Per-day report workbook loading and concatenation.
//!
//! Every file in the reports directory whose name starts with the filename
//! prefix is one day's situation report export; the 8-digit suffix of the
//! file stem is its report date. Files are loaded oldest first so the
//! concatenated table comes out sorted by date, with each file's row order
//! preserved. Gaps in the date sequence (failed downloads) are fine; an
//! empty directory is not.
//!
//! The `OBJECTID` column the export carries is an internal row identifier
//! and is not read.

use std::path::{Path, PathBuf};

use ak_fire_models::SituationRecord;
use calamine::{Data, Range, Reader as _, Xlsx, open_workbook};
use chrono::NaiveDate;

use crate::{ReportError, zones};

const COL_INCIDENT_NUMBER: &str = "Incident Number";
const COL_INCIDENT_NAME: &str = "Incident Name";
const COL_INCIDENT_TYPE: &str = "Incident Type";
const COL_PROTECTING_OFFICE: &str = "Protecting Office";
const COL_LATITUDE: &str = "Latitude";
const COL_LONGITUDE: &str = "Longitude";
const COL_ACRES: &str = "Acres";

/// Loads every report workbook matching `prefix` under `dir`, tags rows
/// with their file's report date, and concatenates them sorted ascending
/// by date.
///
/// # Errors
///
/// Returns [`ReportError::NoReports`] if no file matches the prefix, and a
/// workbook/schema error if any matched file cannot be read.
pub fn assemble_reports(dir: &Path, prefix: &str) -> Result<Vec<SituationRecord>, ReportError> {
    let mut files: Vec<(NaiveDate, PathBuf)> = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !path.is_file() || !name.starts_with(prefix) {
            continue;
        }
        let date = report_date_from_stem(&path)
            .ok_or_else(|| ReportError::BadDateSuffix { file: path.clone() })?;
        files.push((date, path));
    }

    if files.is_empty() {
        return Err(ReportError::NoReports {
            dir: dir.to_path_buf(),
            prefix: prefix.to_owned(),
        });
    }
    files.sort();

    let file_count = files.len();
    let mut records = Vec::new();
    for (date, path) in files {
        let range = workbook_range(&path)?;
        let mut day = sheet_records(&range, date, &path)?;
        log::info!("{}: {} rows for {date}", path.display(), day.len());
        records.append(&mut day);
    }
    log::info!(
        "assembled {} records from {file_count} report files",
        records.len()
    );
    Ok(records)
}

/// Extracts the 8-digit `YYYYMMDD` report date from the end of a filename
/// stem, e.g. `AK_SituationReportExport_20250415.xlsx` → 2025-04-15.
#[must_use]
pub fn report_date_from_stem(path: &Path) -> Option<NaiveDate> {
    let stem = path.file_stem()?.to_str()?;
    if !stem.is_char_boundary(stem.len().checked_sub(8)?) {
        return None;
    }
    NaiveDate::parse_from_str(&stem[stem.len() - 8..], "%Y%m%d").ok()
}

/// Opens a workbook and returns its first worksheet.
fn workbook_range(path: &Path) -> Result<Range<Data>, ReportError> {
    let mut workbook: Xlsx<_> = open_workbook(path).map_err(|source| ReportError::Workbook {
        file: path.to_path_buf(),
        source,
    })?;
    workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ReportError::EmptyWorkbook {
            file: path.to_path_buf(),
        })?
        .map_err(|source| ReportError::Workbook {
            file: path.to_path_buf(),
            source,
        })
}

/// Parses one worksheet into [`SituationRecord`]s tagged with `report_date`.
///
/// The first row must hold the column headers. Fully empty rows (trailing
/// filler the export sometimes leaves behind) are skipped; everything else
/// becomes a record, with the protecting office run through the
/// normalization chain in [`zones`].
///
/// # Errors
///
/// Returns [`ReportError::MissingColumn`] when a required header is absent.
pub fn sheet_records(
    range: &Range<Data>,
    report_date: NaiveDate,
    file: &Path,
) -> Result<Vec<SituationRecord>, ReportError> {
    let mut rows = range.rows();
    let headers = rows.next().unwrap_or_default();

    let number_col = find_column(headers, COL_INCIDENT_NUMBER, file)?;
    let name_col = find_column(headers, COL_INCIDENT_NAME, file)?;
    let type_col = find_column(headers, COL_INCIDENT_TYPE, file)?;
    let office_col = find_column(headers, COL_PROTECTING_OFFICE, file)?;
    let lat_col = find_column(headers, COL_LATITUDE, file)?;
    let lon_col = find_column(headers, COL_LONGITUDE, file)?;
    let acres_col = find_column(headers, COL_ACRES, file)?;

    let mut records = Vec::new();
    for row in rows {
        if row.iter().all(|cell| matches!(cell, Data::Empty)) {
            continue;
        }
        let office_raw = cell_text(row.get(office_col));
        let (protecting_office, protecting_office_label) =
            zones::normalize(office_raw.as_deref());
        records.push(SituationRecord {
            incident_number: cell_text(row.get(number_col)).unwrap_or_default(),
            incident_name: cell_text(row.get(name_col)).unwrap_or_default(),
            incident_type: cell_text(row.get(type_col)).unwrap_or_default(),
            protecting_office,
            protecting_office_label,
            latitude: cell_f64(row.get(lat_col)),
            longitude: cell_f64(row.get(lon_col)),
            acres: cell_f64(row.get(acres_col)).unwrap_or(0.0),
            report_date,
        });
    }
    Ok(records)
}

fn find_column(headers: &[Data], name: &str, file: &Path) -> Result<usize, ReportError> {
    headers
        .iter()
        .position(|cell| matches!(cell, Data::String(s) if s.trim() == name))
        .ok_or_else(|| ReportError::MissingColumn {
            column: name.to_owned(),
            file: file.to_path_buf(),
        })
}

/// Reads a cell as trimmed text. Numeric incident numbers come back as
/// their integer rendering.
fn cell_text(cell: Option<&Data>) -> Option<String> {
    match cell? {
        Data::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_owned())
        }
        Data::Int(i) => Some(i.to_string()),
        #[allow(clippy::cast_possible_truncation)]
        Data::Float(f) if f.fract() == 0.0 => Some((*f as i64).to_string()),
        Data::Float(f) => Some(f.to_string()),
        _ => None,
    }
}

fn cell_f64(cell: Option<&Data>) -> Option<f64> {
    match cell? {
        Data::Float(f) => Some(*f),
        #[allow(clippy::cast_precision_loss)]
        Data::Int(i) => Some(*i as f64),
        Data::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    const HEADERS: [&str; 8] = [
        "OBJECTID",
        COL_INCIDENT_NUMBER,
        COL_INCIDENT_NAME,
        COL_INCIDENT_TYPE,
        COL_PROTECTING_OFFICE,
        COL_LATITUDE,
        COL_LONGITUDE,
        COL_ACRES,
    ];

    fn sample_range(rows: &[[Data; 8]]) -> Range<Data> {
        #[allow(clippy::cast_possible_truncation)]
        let mut range = Range::new((0, 0), (rows.len() as u32, 7));
        for (col, header) in HEADERS.iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            range.set_value((0, col as u32), Data::String((*header).to_owned()));
        }
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                #[allow(clippy::cast_possible_truncation)]
                range.set_value(((r + 1) as u32, c as u32), cell.clone());
            }
        }
        range
    }

    fn incident_row(number: &str, office: &str, acres: f64) -> [Data; 8] {
        [
            Data::Int(1),
            Data::String(number.to_owned()),
            Data::String(format!("{number} Fire")),
            Data::String("WF-Wildfire".to_owned()),
            Data::String(office.to_owned()),
            Data::Float(64.8),
            Data::Float(-147.7),
            Data::Float(acres),
        ]
    }

    #[test]
    fn parses_rows_and_normalizes_offices() {
        let range = sample_range(&[
            incident_row("231015", "Upper Yukon Zone Office (UYD)", 120.5),
            incident_row("231020", "Galena Zone", 3.0),
        ]);
        let records = sheet_records(&range, date("2025-06-01"), Path::new("t.xlsx")).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].protecting_office, "Upper Yukon Zone");
        assert_eq!(records[0].protecting_office_label, "UYD");
        assert_eq!(records[1].protecting_office_label, "GAD");
        assert!(records.iter().all(|r| r.report_date == date("2025-06-01")));
    }

    #[test]
    fn blank_office_becomes_sentinel() {
        let mut row = incident_row("231015", "", 1.0);
        row[4] = Data::Empty;
        let records = sheet_records(&sample_range(&[row]), date("2025-06-01"), Path::new("t"))
            .unwrap();
        assert_eq!(records[0].protecting_office, "n/a");
        assert_eq!(records[0].protecting_office_label, "n/a");
    }

    #[test]
    fn fully_empty_rows_are_skipped_without_losing_others() {
        let blank: [Data; 8] = std::array::from_fn(|_| Data::Empty);
        let range = sample_range(&[
            incident_row("1", "Tok Area", 5.0),
            blank,
            incident_row("2", "Tok Area", 6.0),
        ]);
        let records = sheet_records(&range, date("2025-06-02"), Path::new("t")).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn missing_required_column_is_a_schema_error() {
        let mut range = Range::new((0, 0), (0, 2));
        range.set_value((0, 0), Data::String("OBJECTID".to_owned()));
        range.set_value((0, 1), Data::String("Acres".to_owned()));
        let err = sheet_records(&range, date("2025-06-01"), Path::new("t.xlsx")).unwrap_err();
        assert!(matches!(
            err,
            ReportError::MissingColumn { column, .. } if column == COL_INCIDENT_NUMBER
        ));
    }

    #[test]
    fn missing_coordinates_and_acres_default_sanely() {
        let mut row = incident_row("3", "Delta Area", 0.0);
        row[5] = Data::Empty;
        row[6] = Data::Empty;
        row[7] = Data::Empty;
        let records =
            sheet_records(&sample_range(&[row]), date("2025-06-01"), Path::new("t")).unwrap();
        assert_eq!(records[0].latitude, None);
        assert_eq!(records[0].longitude, None);
        assert!((records[0].acres - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn extracts_report_date_from_stem() {
        assert_eq!(
            report_date_from_stem(Path::new("AK_SituationReportExport_20250415.xlsx")),
            Some(date("2025-04-15"))
        );
        assert_eq!(
            report_date_from_stem(Path::new("AK_SituationReportExport_2025.xlsx")),
            None
        );
    }

    #[test]
    fn empty_directory_is_a_hard_failure() {
        let tmp = std::env::temp_dir().join("ak_fire_report_test_empty");
        let _ = std::fs::remove_dir_all(&tmp);
        std::fs::create_dir_all(&tmp).unwrap();

        let err = assemble_reports(&tmp, "AK_SituationReportExport_").unwrap_err();
        assert!(matches!(err, ReportError::NoReports { .. }));

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
