#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared row types for the Alaska fire tally pipeline.
//!
//! Every pipeline stage consumes one table of these value rows and produces
//! a new one; nothing is mutated in place after a stage hands its output on.
//! The canonical zone/office table lives here so that normalization,
//! aggregation and the historical reconciliation all agree on it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Incident type string for prescribed burns, excluded from wildfire tallies.
pub const INCIDENT_TYPE_PRESCRIBED: &str = "RX-Prescribed Fire";

/// Incident type string for false alarms, excluded from wildfire tallies.
pub const INCIDENT_TYPE_FALSE_ALARM: &str = "FA-False Alarm";

/// The thirteen Alaska protecting offices (Fire Management Zones).
///
/// Fixed injective mapping between the 3-letter dispatch code and the
/// human-readable office name as it appears in AICC situation reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProtectingOffice {
    /// MSS
    MatSuArea,
    /// TNF
    TongassNf,
    /// UYD
    UpperYukonZone,
    /// KKS
    KenaiKodiakArea,
    /// CRS
    CopperRiverArea,
    /// TAD
    TananaZone,
    /// DAS
    DeltaArea,
    /// FAS
    FairbanksArea,
    /// MID
    MilitaryZone,
    /// CGF
    ChugachNf,
    /// TAS
    TokArea,
    /// GAD
    GalenaZone,
    /// SWS
    SouthwestArea,
}

impl ProtectingOffice {
    /// Returns all offices in the canonical table.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::MatSuArea,
            Self::TongassNf,
            Self::UpperYukonZone,
            Self::KenaiKodiakArea,
            Self::CopperRiverArea,
            Self::TananaZone,
            Self::DeltaArea,
            Self::FairbanksArea,
            Self::MilitaryZone,
            Self::ChugachNf,
            Self::TokArea,
            Self::GalenaZone,
            Self::SouthwestArea,
        ]
    }

    /// Returns the 3-letter dispatch code for this office.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::MatSuArea => "MSS",
            Self::TongassNf => "TNF",
            Self::UpperYukonZone => "UYD",
            Self::KenaiKodiakArea => "KKS",
            Self::CopperRiverArea => "CRS",
            Self::TananaZone => "TAD",
            Self::DeltaArea => "DAS",
            Self::FairbanksArea => "FAS",
            Self::MilitaryZone => "MID",
            Self::ChugachNf => "CGF",
            Self::TokArea => "TAS",
            Self::GalenaZone => "GAD",
            Self::SouthwestArea => "SWS",
        }
    }

    /// Returns the office name as it appears in situation reports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MatSuArea => "Mat-Su Area",
            Self::TongassNf => "Tongass N.F.",
            Self::UpperYukonZone => "Upper Yukon Zone",
            Self::KenaiKodiakArea => "Kenai-Kodiak Area",
            Self::CopperRiverArea => "Copper River Area",
            Self::TananaZone => "Tanana Zone",
            Self::DeltaArea => "Delta Area",
            Self::FairbanksArea => "Fairbanks Area",
            Self::MilitaryZone => "Military Zone",
            Self::ChugachNf => "Chugach N.F.",
            Self::TokArea => "Tok Area",
            Self::GalenaZone => "Galena Zone",
            Self::SouthwestArea => "Southwest Area",
        }
    }

    /// Looks up an office by its 3-letter dispatch code.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::all().iter().copied().find(|o| o.code() == code)
    }

    /// Looks up an office by its full name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|o| o.name() == name)
    }
}

/// One fire incident as of one situation-report date.
///
/// `acres` is the cumulative burned area reported for the incident as of
/// `report_date`, not a daily delta. Daily burned-area tallies are derived
/// by re-aggregating per date, never by differencing consecutive reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SituationRecord {
    /// Incident number as assigned by the reporting agency.
    #[serde(rename = "Incident Number")]
    pub incident_number: String,
    /// Incident name.
    #[serde(rename = "Incident Name")]
    pub incident_name: String,
    /// Incident category string (e.g. `"WF-Wildfire"`, `"RX-Prescribed Fire"`,
    /// `"FA-False Alarm"`).
    #[serde(rename = "Incident Type")]
    pub incident_type: String,
    /// Protecting office, normalized to the canonical zone name where the
    /// raw report text resolves to one (raw text passes through otherwise).
    #[serde(rename = "Protecting Office")]
    pub protecting_office: String,
    /// 3-letter code for the protecting office; the `"n/a"` sentinel and
    /// unresolved labels pass through unchanged.
    #[serde(rename = "Protecting Office Label")]
    pub protecting_office_label: String,
    /// Latitude (WGS84). `None` when the report row lacks coordinates.
    #[serde(rename = "Latitude")]
    pub latitude: Option<f64>,
    /// Longitude (WGS84). `None` when the report row lacks coordinates.
    #[serde(rename = "Longitude")]
    pub longitude: Option<f64>,
    /// Cumulative burned area in acres as of the report date.
    #[serde(rename = "Acres")]
    pub acres: f64,
    /// Date of the situation report this row came from.
    #[serde(rename = "reportdate")]
    pub report_date: NaiveDate,
}

/// A [`SituationRecord`] tagged with its enclosing Predictive Service Area.
///
/// Produced by the spatial join; records whose point falls outside every
/// PSA polygon never become one of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PsaRecord {
    #[serde(rename = "Incident Number")]
    pub incident_number: String,
    #[serde(rename = "Incident Name")]
    pub incident_name: String,
    #[serde(rename = "Incident Type")]
    pub incident_type: String,
    #[serde(rename = "Protecting Office")]
    pub protecting_office: String,
    #[serde(rename = "Protecting Office Label")]
    pub protecting_office_label: String,
    #[serde(rename = "Latitude")]
    pub latitude: f64,
    #[serde(rename = "Longitude")]
    pub longitude: f64,
    #[serde(rename = "Acres")]
    pub acres: f64,
    #[serde(rename = "reportdate")]
    pub report_date: NaiveDate,
    /// Name of the enclosing Predictive Service Area.
    #[serde(rename = "PSA_NAME")]
    pub psa_name: String,
    /// National PSA code of the enclosing area.
    #[serde(rename = "NAT_CODE")]
    pub nat_code: String,
}

/// Daily burned-area tally for one Predictive Service Area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PsaDailyTally {
    #[serde(rename = "reportdate")]
    pub report_date: NaiveDate,
    #[serde(rename = "PSA_NAME")]
    pub psa_name: String,
    #[serde(rename = "NAT_CODE")]
    pub nat_code: String,
    #[serde(rename = "Acres")]
    pub acres: f64,
}

/// Daily burned-area tally for one protecting office (Fire Management Zone).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneDailyTally {
    #[serde(rename = "reportdate")]
    pub report_date: NaiveDate,
    #[serde(rename = "Protecting Office")]
    pub protecting_office: String,
    #[serde(rename = "Protecting Office Label")]
    pub protecting_office_label: String,
    #[serde(rename = "Acres")]
    pub acres: f64,
}

/// One row of the legacy multi-year daily tally file, already parsed out of
/// its CSV schema (2-row preamble, index and `ID` artifact columns dropped).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalDailyRecord {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Month")]
    pub month: u32,
    #[serde(rename = "Day")]
    pub day: u32,
    #[serde(rename = "ProtectionUnit")]
    pub protection_unit: String,
    /// Total fires reported for the unit on that day. Optional because the
    /// legacy export leaves the count blank for some early seasons.
    #[serde(rename = "TotalFires")]
    pub fires: Option<i64>,
    #[serde(rename = "Acres")]
    pub acres: f64,
    #[serde(rename = "reportdate")]
    pub report_date: NaiveDate,
}

/// The canonical per-(date, protection unit) daily tally shape.
///
/// Both the legacy file and the current-year Zone aggregation are reshaped
/// into this schema before they are concatenated into one continuous series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyUnitTally {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Month")]
    pub month: u32,
    #[serde(rename = "Day")]
    pub day: u32,
    #[serde(rename = "ProtectionUnit")]
    pub protection_unit: String,
    #[serde(rename = "Acres")]
    pub acres: f64,
    #[serde(rename = "reportdate")]
    pub report_date: NaiveDate,
}

/// Statewide daily total, one row per (date, season year).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonDailyTotal {
    #[serde(rename = "reportdate")]
    pub report_date: NaiveDate,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Acres")]
    pub acres: f64,
}
