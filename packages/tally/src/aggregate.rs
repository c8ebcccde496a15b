//! Per-(date, region) burned-area aggregation.
//!
//! The acres column of a situation record is a cumulative running total as
//! of that record's report date, so the daily tally for a region is the sum
//! across that date's records, never a difference between dates. Regions
//! with nothing burning on a date produce no row at all rather than a zero
//! row.

use std::collections::BTreeMap;

use ak_fire_models::{PsaDailyTally, PsaRecord, ZoneDailyTally};
use chrono::NaiveDate;

use crate::TallyError;

/// Region grouping modes understood by the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionMode {
    /// Group by (report date, `PSA_NAME`, `NAT_CODE`).
    Psa,
    /// Group by (report date, protecting office, office code label).
    Zone,
}

impl RegionMode {
    /// Valid mode names, for error messages.
    pub const VALID: &'static str = "PSA, Zone";

    /// Parses a mode string.
    ///
    /// # Errors
    ///
    /// Returns [`TallyError::UnknownRegion`] naming the valid options for
    /// anything other than `"PSA"` or `"Zone"`.
    pub fn parse(region: &str) -> Result<Self, TallyError> {
        match region {
            "PSA" => Ok(Self::Psa),
            "Zone" => Ok(Self::Zone),
            other => Err(TallyError::UnknownRegion {
                given: other.to_owned(),
                valid: Self::VALID,
            }),
        }
    }
}

/// Daily tallies in one of the two region groupings.
#[derive(Debug, Clone, PartialEq)]
pub enum DailyTallies {
    /// Tallies keyed by Predictive Service Area.
    Psa(Vec<PsaDailyTally>),
    /// Tallies keyed by protecting office.
    Zone(Vec<ZoneDailyTally>),
}

impl DailyTallies {
    /// Number of tally rows.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Psa(rows) => rows.len(),
            Self::Zone(rows) => rows.len(),
        }
    }

    /// Whether there are no tally rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Groups joined records by (date, region) and sums acres.
///
/// Keys whose summed acres come out zero or non-finite are dropped. Output
/// is sorted by the full grouping key, which also makes the operation
/// idempotent: re-aggregating an aggregated table yields the same table.
///
/// # Errors
///
/// Returns [`TallyError::UnknownRegion`] if `region` is not a known mode.
pub fn aggregate_by_day_region(
    records: &[PsaRecord],
    region: &str,
) -> Result<DailyTallies, TallyError> {
    let mode = RegionMode::parse(region)?;

    let mut sums: BTreeMap<(NaiveDate, String, String), f64> = BTreeMap::new();
    for record in records {
        let key = match mode {
            RegionMode::Psa => (
                record.report_date,
                record.psa_name.clone(),
                record.nat_code.clone(),
            ),
            RegionMode::Zone => (
                record.report_date,
                record.protecting_office.clone(),
                record.protecting_office_label.clone(),
            ),
        };
        *sums.entry(key).or_insert(0.0) += record.acres;
    }

    let kept = sums
        .into_iter()
        .filter(|(_, acres)| acres.is_finite() && *acres != 0.0);

    let tallies = match mode {
        RegionMode::Psa => DailyTallies::Psa(
            kept.map(|((report_date, psa_name, nat_code), acres)| PsaDailyTally {
                report_date,
                psa_name,
                nat_code,
                acres,
            })
            .collect(),
        ),
        RegionMode::Zone => DailyTallies::Zone(
            kept.map(
                |((report_date, protecting_office, protecting_office_label), acres)| {
                    ZoneDailyTally {
                        report_date,
                        protecting_office,
                        protecting_office_label,
                        acres,
                    }
                },
            )
            .collect(),
        ),
    };

    log::info!("aggregated {} records into {} {region} tally rows", records.len(), tallies.len());
    Ok(tallies)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        date: &str,
        office: &str,
        label: &str,
        psa: &str,
        nat: &str,
        acres: f64,
    ) -> PsaRecord {
        PsaRecord {
            incident_number: "231001".to_owned(),
            incident_name: "Test Fire".to_owned(),
            incident_type: "WF-Wildfire".to_owned(),
            protecting_office: office.to_owned(),
            protecting_office_label: label.to_owned(),
            latitude: 64.8,
            longitude: -147.7,
            acres,
            report_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            psa_name: psa.to_owned(),
            nat_code: nat.to_owned(),
        }
    }

    #[test]
    fn sums_acres_per_date_and_zone() {
        let records = vec![
            record("2025-06-01", "Tanana Zone", "TAD", "Upper Yukon Valley", "AK02", 10.0),
            record("2025-06-01", "Tanana Zone", "TAD", "Tanana Valley", "AK03", 5.0),
            record("2025-06-01", "Galena Zone", "GAD", "Koyukuk", "AK04", 2.5),
            record("2025-06-02", "Tanana Zone", "TAD", "Tanana Valley", "AK03", 20.0),
        ];

        let DailyTallies::Zone(rows) = aggregate_by_day_region(&records, "Zone").unwrap() else {
            panic!("expected Zone tallies");
        };

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].protecting_office, "Galena Zone");
        assert!((rows[1].acres - 15.0).abs() < f64::EPSILON);
        assert_eq!(rows[2].report_date.to_string(), "2025-06-02");
    }

    #[test]
    fn psa_grouping_splits_what_zone_grouping_merges() {
        let records = vec![
            record("2025-06-01", "Tanana Zone", "TAD", "Upper Yukon Valley", "AK02", 10.0),
            record("2025-06-01", "Tanana Zone", "TAD", "Tanana Valley", "AK03", 5.0),
        ];

        let psa = aggregate_by_day_region(&records, "PSA").unwrap();
        let zone = aggregate_by_day_region(&records, "Zone").unwrap();
        assert_eq!(psa.len(), 2);
        assert_eq!(zone.len(), 1);
    }

    #[test]
    fn zero_sum_regions_produce_no_row() {
        let records = vec![
            record("2025-06-01", "Tok Area", "TAS", "Copper Basin", "AK07", 0.0),
            record("2025-06-01", "Tok Area", "TAS", "Copper Basin", "AK07", 0.0),
            record("2025-06-01", "Delta Area", "DAS", "Deltana", "AK06", 1.0),
        ];

        let tallies = aggregate_by_day_region(&records, "PSA").unwrap();
        assert_eq!(tallies.len(), 1);
    }

    #[test]
    fn unknown_region_mode_reports_valid_options() {
        let err = aggregate_by_day_region(&[], "County").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("County"));
        assert!(message.contains("PSA, Zone"));
    }

    #[test]
    fn aggregation_is_idempotent() {
        let records = vec![
            record("2025-06-01", "Tanana Zone", "TAD", "Tanana Valley", "AK03", 10.0),
            record("2025-06-01", "Tanana Zone", "TAD", "Tanana Valley", "AK03", 5.0),
            record("2025-06-02", "Galena Zone", "GAD", "Koyukuk", "AK04", 2.5),
        ];

        let DailyTallies::Zone(once) = aggregate_by_day_region(&records, "Zone").unwrap() else {
            panic!("expected Zone tallies");
        };

        // Re-feed the aggregated rows as one record per key.
        let again: Vec<PsaRecord> = once
            .iter()
            .map(|t| {
                record(
                    &t.report_date.to_string(),
                    &t.protecting_office,
                    &t.protecting_office_label,
                    "unused",
                    "unused",
                    t.acres,
                )
            })
            .collect();
        let DailyTallies::Zone(twice) = aggregate_by_day_region(&again, "Zone").unwrap() else {
            panic!("expected Zone tallies");
        };

        assert_eq!(once, twice);
    }

    #[test]
    fn malformed_office_label_groups_as_its_own_region() {
        // A label the normalizer passed through untouched still tallies,
        // as a one-off region rather than being dropped.
        let records = vec![
            record("2025-06-01", "Yukon Flats Dispatch", "Yukon Flats Dispatch", "X", "X", 3.0),
            record("2025-06-01", "Tanana Zone", "TAD", "X", "X", 4.0),
        ];
        let tallies = aggregate_by_day_region(&records, "Zone").unwrap();
        assert_eq!(tallies.len(), 2);
    }
}
