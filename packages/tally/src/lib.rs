#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Daily regional burned-area aggregation and historical reconciliation.
//!
//! [`aggregate`] turns the joined record table into per-(date, region)
//! acre tallies; [`historical`] reconciles the legacy multi-year daily
//! tally file with the current season's output into one continuous series;
//! [`output`] writes every table with the date-stamped filename
//! convention.

pub mod aggregate;
pub mod historical;
pub mod output;

use std::path::PathBuf;

/// Errors that can occur during aggregation, reconciliation or output.
#[derive(Debug, thiserror::Error)]
pub enum TallyError {
    /// A region grouping mode that is neither PSA nor Zone.
    #[error("grouping by {given:?} is unknown: try one of {valid}")]
    UnknownRegion {
        /// The mode string that was passed in.
        given: String,
        /// Comma-separated valid mode names.
        valid: &'static str,
    },

    /// I/O error reading or writing a table.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parse or write error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column header is missing from the legacy file.
    #[error("column {column:?} missing from {file}")]
    MissingColumn {
        /// Header of the missing column.
        column: String,
        /// Path of the offending file.
        file: PathBuf,
    },

    /// A legacy row field failed to parse.
    #[error("row {row} of {file}: invalid {column} value {value:?}")]
    BadField {
        /// 1-based data row number.
        row: usize,
        /// Column the bad value came from.
        column: &'static str,
        /// The raw value.
        value: String,
        /// Path of the offending file.
        file: PathBuf,
    },

    /// A legacy row names an impossible calendar date.
    #[error("row {row} of {file}: no such date {year}-{month}-{day}")]
    BadDate {
        /// 1-based data row number.
        row: usize,
        /// Season year field.
        year: i32,
        /// Month field.
        month: u32,
        /// Day field.
        day: u32,
        /// Path of the offending file.
        file: PathBuf,
    },
}
