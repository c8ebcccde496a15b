//! Full tally pipeline.
//!
//! Chains download -> assemble -> filter -> spatial join -> aggregate ->
//! historical merge, writing each intermediate table to the working output
//! directory so any stage's result can be inspected after the run. Each
//! stage consumes the previous stage's table and produces a new one.

use std::path::PathBuf;

use ak_fire_fetch::reports::{ReportFetchConfig, download_reports};
use ak_fire_models::{
    INCIDENT_TYPE_FALSE_ALARM, INCIDENT_TYPE_PRESCRIBED, SituationRecord, ZoneDailyTally,
};
use ak_fire_report::assemble::assemble_reports;
use ak_fire_spatial::{PsaIndex, join_psa};
use ak_fire_tally::aggregate::{DailyTallies, aggregate_by_day_region};
use ak_fire_tally::historical::{
    current_daily_units, legacy_daily_units, load_historical, merge_daily_units,
    season_daily_totals,
};
use ak_fire_tally::output::write_stamped;
use chrono::{Datelike, NaiveDate};

/// Everything the pipeline needs, resolved up front so no stage reaches
/// into the environment on its own.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// First report date to look for.
    pub start_date: NaiveDate,
    /// Last report date to look for (inclusive).
    pub end_date: NaiveDate,
    /// Date of this run; used for the season year and output filenames.
    pub run_date: NaiveDate,
    /// Base URL of the report export directory.
    pub url_template: String,
    /// Report filename prefix.
    pub filename_template: String,
    /// Directory report workbooks live in.
    pub reports_dir: PathBuf,
    /// Directory derived tables are written to.
    pub output_dir: PathBuf,
    /// PSA boundary reference layer.
    pub psa_file: PathBuf,
    /// Legacy multi-year daily tally CSV; the merge step is skipped when
    /// this file is absent.
    pub historical_file: PathBuf,
    /// Re-download report files that already exist locally.
    pub overwrite: bool,
    /// Skip the download step entirely.
    pub skip_download: bool,
}

/// Runs the full pipeline.
///
/// # Errors
///
/// Returns an error when a required stage fails (no reports to assemble,
/// unreadable PSA layer, unwritable output); per-day download failures are
/// logged and skipped inside the fetch stage.
pub async fn run(config: &PipelineConfig) -> Result<(), Box<dyn std::error::Error>> {
    let year = config.run_date.year();
    std::fs::create_dir_all(&config.output_dir)?;

    // Step 1: download any reports we do not have yet.
    if config.skip_download {
        log::info!("skipping report download, using files in {}", config.reports_dir.display());
    } else {
        let client = reqwest::Client::new();
        let fetch_config = ReportFetchConfig {
            start_date: config.start_date,
            end_date: config.end_date,
            url_template: config.url_template.clone(),
            filename_template: config.filename_template.clone(),
            output_dir: config.reports_dir.clone(),
            overwrite: config.overwrite,
        };
        match download_reports(&client, &fetch_config).await? {
            Some(last) => log::info!("last report downloaded: {last}"),
            None => log::info!("no new reports downloaded"),
        }
    }

    // Step 2: assemble every report into one table and save it raw.
    let all_updates = assemble_reports(&config.reports_dir, &config.filename_template)?;
    write_stamped(&config.output_dir, "all_updates", year, config.run_date, &all_updates)?;

    // Step 3: tallies cover wildfires only.
    let wildfires = drop_non_wildfires(all_updates);

    // Step 4: tag each record with its Predictive Service Area.
    let psa_index = PsaIndex::load(&config.psa_file)?;
    let joined = join_psa(&wildfires, &psa_index);
    write_stamped(&config.output_dir, "all_updates_PSA", year, config.run_date, &joined)?;

    // Step 5: daily tallies by PSA and by protecting office.
    let DailyTallies::Psa(psa_tallies) = aggregate_by_day_region(&joined, "PSA")? else {
        unreachable!("PSA mode yields PSA tallies");
    };
    write_stamped(&config.output_dir, "daily_acres_PSA", year, config.run_date, &psa_tallies)?;

    let DailyTallies::Zone(zone_tallies) = aggregate_by_day_region(&joined, "Zone")? else {
        unreachable!("Zone mode yields Zone tallies");
    };
    write_stamped(&config.output_dir, "daily_acres_Zone", year, config.run_date, &zone_tallies)?;

    // Step 6: splice the current season onto the legacy series.
    merge_historical(config, year, &zone_tallies)?;

    Ok(())
}

/// Removes prescribed burns and false alarms before tallying.
fn drop_non_wildfires(records: Vec<SituationRecord>) -> Vec<SituationRecord> {
    let before = records.len();
    let wildfires: Vec<SituationRecord> = records
        .into_iter()
        .filter(|r| {
            r.incident_type != INCIDENT_TYPE_PRESCRIBED
                && r.incident_type != INCIDENT_TYPE_FALSE_ALARM
        })
        .collect();
    log::info!(
        "dropped {} prescribed-fire/false-alarm records, {} remain",
        before - wildfires.len(),
        wildfires.len()
    );
    wildfires
}

/// Reconciles the legacy daily tally with the current season and writes
/// the merged series plus the statewide per-day collapse.
///
/// The merge is optional: a missing legacy file is a logged skip.
fn merge_historical(
    config: &PipelineConfig,
    year: i32,
    zone_tallies: &[ZoneDailyTally],
) -> Result<(), ak_fire_tally::TallyError> {
    if !config.historical_file.exists() {
        log::warn!(
            "legacy daily tally {} not found, skipping historical merge",
            config.historical_file.display()
        );
        return Ok(());
    }

    let legacy = load_historical(&config.historical_file)?;
    let merged = merge_daily_units(legacy_daily_units(&legacy), current_daily_units(zone_tallies));
    write_stamped(&config.output_dir, "daily_acres_merged", year, config.run_date, &merged)?;

    let totals = season_daily_totals(&merged);
    write_stamped(&config.output_dir, "daily_totals", year, config.run_date, &totals)?;
    Ok(())
}
