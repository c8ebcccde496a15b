#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the Alaska fire tally toolchain.
//!
//! `run` downloads new AICC situation reports and rebuilds the daily
//! burned-area tallies; `lightning` pulls the recorded-lightning layers
//! from the AICC feature service. Progress is narrated through `log`
//! output (`RUST_LOG=info` to see it).

mod pipeline;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::pipeline::PipelineConfig;

/// Default base URL of the situation report exports.
const URL_TEMPLATE: &str = "https://fire.ak.blm.gov/content/aicc/Previous%20Situation%20Reports/2025%20Situtation%20Report%20Exports/";

/// Default report filename prefix.
const FILENAME_TEMPLATE: &str = "AK_SituationReportExport_";

#[derive(Parser)]
#[command(name = "ak_fire_tally", about = "Alaska daily fire tally toolchain")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download new situation reports and rebuild the daily tallies
    Run {
        /// First report date to look for (YYYY-MM-DD or YYYYMMDD)
        #[arg(long, value_parser = parse_date, default_value = "2025-04-15")]
        start_date: NaiveDate,
        /// Last report date to look for (defaults to today)
        #[arg(long, value_parser = parse_date)]
        end_date: Option<NaiveDate>,
        /// Directory situation report workbooks are downloaded to
        #[arg(long, default_value = "data/AICC_reports")]
        reports_dir: PathBuf,
        /// Directory derived CSV tables are written to
        #[arg(long, default_value = "data/working")]
        output_dir: PathBuf,
        /// Path of the PSA boundary reference layer
        #[arg(long, default_value = "resources/AK_predictive_service_areas.json")]
        psa_file: PathBuf,
        /// Path of the legacy multi-year daily tally CSV; skipped if absent
        #[arg(long, default_value = "data/daily_tally_archive.csv")]
        historical_file: PathBuf,
        /// Re-download report files that already exist locally
        #[arg(long)]
        overwrite: bool,
        /// Rebuild tallies from already-downloaded reports only
        #[arg(long)]
        skip_download: bool,
        /// Run as a CI automation job
        #[arg(short = 'g', long)]
        github_action: bool,
    },
    /// Download recorded lightning data from the AICC feature service
    Lightning {
        /// Comma-separated layer indices (0-4); all layers if not specified
        #[arg(long)]
        datasets: Option<String>,
        /// Directory lightning JSON files are written to
        #[arg(long, default_value = "data/AICC_lightning")]
        output_dir: PathBuf,
    },
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y%m%d"))
        .map_err(|e| format!("invalid date {raw:?}: {e}"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            start_date,
            end_date,
            reports_dir,
            output_dir,
            psa_file,
            historical_file,
            overwrite,
            skip_download,
            github_action,
        } => {
            if github_action {
                return Err("GitHub Action mode is not implemented yet".into());
            }
            let run_date = chrono::Local::now().date_naive();
            let config = PipelineConfig {
                start_date,
                end_date: end_date.unwrap_or(run_date),
                run_date,
                url_template: URL_TEMPLATE.to_owned(),
                filename_template: FILENAME_TEMPLATE.to_owned(),
                reports_dir,
                output_dir,
                psa_file,
                historical_file,
                overwrite,
                skip_download,
            };
            pipeline::run(&config).await?;
        }
        Commands::Lightning {
            datasets,
            output_dir,
        } => {
            let selected = parse_datasets(datasets.as_deref())?;
            let config = ak_fire_fetch::lightning::LightningConfig {
                service_url: ak_fire_fetch::lightning::SERVICE_URL.to_owned(),
                output_dir,
                retrieved: chrono::Local::now().date_naive(),
            };
            let client = reqwest::Client::new();
            for dataset in selected {
                ak_fire_fetch::lightning::download_lightning(&client, &config, dataset).await?;
            }
        }
    }

    Ok(())
}

/// Resolves a comma-separated list of layer indices against the known
/// lightning datasets; no list means every layer.
fn parse_datasets(
    raw: Option<&str>,
) -> Result<Vec<&'static ak_fire_fetch::lightning::LightningDataset>, String> {
    let datasets = &ak_fire_fetch::lightning::DATASETS;
    let Some(raw) = raw else {
        return Ok(datasets.iter().collect());
    };

    let mut selected = Vec::new();
    for part in raw.split(',') {
        let index: usize = part
            .trim()
            .parse()
            .map_err(|_| format!("invalid dataset index {part:?}"))?;
        let dataset = datasets
            .get(index)
            .ok_or_else(|| format!("no lightning dataset {index}: valid indices are 0-4"))?;
        selected.push(dataset);
    }
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_both_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 4, 15).unwrap();
        assert_eq!(parse_date("2025-04-15").unwrap(), expected);
        assert_eq!(parse_date("20250415").unwrap(), expected);
        assert!(parse_date("April 15").is_err());
    }

    #[test]
    fn dataset_selection_defaults_to_all_layers() {
        assert_eq!(parse_datasets(None).unwrap().len(), 5);
        let picked = parse_datasets(Some("0, 4")).unwrap();
        assert_eq!(picked[0].label, "today");
        assert_eq!(picked[1].label, "last_two_weeks");
        assert!(parse_datasets(Some("7")).is_err());
    }
}
