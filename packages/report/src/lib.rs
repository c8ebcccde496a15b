#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Situation report assembly and protecting-office normalization.
//!
//! Reads the per-day AICC situation report workbooks out of a directory,
//! tags every row with its report date, normalizes the free-text protecting
//! office field against the canonical zone table, and concatenates the lot
//! into one table sorted by date.

pub mod assemble;
pub mod zones;

use std::path::PathBuf;

/// Errors that can occur while assembling situation reports.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// I/O error (directory scan or file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The workbook could not be opened or read.
    #[error("failed to read workbook {file}: {source}")]
    Workbook {
        /// Path of the offending workbook.
        file: PathBuf,
        /// Underlying xlsx error.
        source: calamine::XlsxError,
    },

    /// The workbook contains no worksheets.
    #[error("workbook {file} contains no worksheets")]
    EmptyWorkbook {
        /// Path of the offending workbook.
        file: PathBuf,
    },

    /// A required column header is missing from a worksheet.
    #[error("column {column:?} missing from {file}")]
    MissingColumn {
        /// Header of the missing column.
        column: String,
        /// Path of the offending workbook.
        file: PathBuf,
    },

    /// A matched filename does not end in a parseable YYYYMMDD date.
    #[error("filename {file} does not end in a YYYYMMDD report date")]
    BadDateSuffix {
        /// Path of the offending file.
        file: PathBuf,
    },

    /// The reports directory contains no files matching the prefix.
    #[error("no report files matching {prefix:?}* found in {dir}")]
    NoReports {
        /// Directory that was scanned.
        dir: PathBuf,
        /// Filename prefix that was matched against.
        prefix: String,
    },
}
