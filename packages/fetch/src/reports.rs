//! Per-day situation report downloader.
//!
//! AICC publishes one workbook per day. Most land in a month subdirectory
//! (`{template}{MM_YYYY}/{filename}{YYYYMMDD}.xlsx`), but some are dropped
//! at the top level, so every day gets two attempts: the month form first,
//! then the flat form. A day missing from both is logged and skipped; the
//! season has gaps and the assembler tolerates them.

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::FetchError;

/// Configuration for a report download run.
#[derive(Debug, Clone)]
pub struct ReportFetchConfig {
    /// First report date to look for.
    pub start_date: NaiveDate,
    /// Last report date to look for (inclusive; usually today).
    pub end_date: NaiveDate,
    /// Base URL of the report export directory, with trailing slash.
    pub url_template: String,
    /// Report filename prefix (e.g. `"AK_SituationReportExport_"`).
    pub filename_template: String,
    /// Directory downloaded workbooks are written to.
    pub output_dir: PathBuf,
    /// Re-download files that already exist locally.
    pub overwrite: bool,
}

/// Downloads every situation report in the configured date range.
///
/// Existing files are skipped unless `overwrite` is set. Returns the
/// `YYYYMMDD` string of the last successfully downloaded report, or `None`
/// if nothing was downloaded.
///
/// # Errors
///
/// Returns [`FetchError`] only for local failures (creating the output
/// directory, writing a file). Transport failures and missing days are
/// logged and skipped.
pub async fn download_reports(
    client: &reqwest::Client,
    config: &ReportFetchConfig,
) -> Result<Option<String>, FetchError> {
    std::fs::create_dir_all(&config.output_dir)?;

    let mut last_date: Option<String> = None;
    for day in config
        .start_date
        .iter_days()
        .take_while(|day| *day <= config.end_date)
    {
        let datestamp = day.format("%Y%m%d").to_string();
        let filename = format!("{}{datestamp}.xlsx", config.filename_template);
        let outpath = config.output_dir.join(&filename);

        if outpath.exists() && !config.overwrite {
            log::info!("file {} already exists, skipping download", outpath.display());
            continue;
        }

        // Month subdirectory form first, flat form as fallback.
        let monthly_url = format!(
            "{}{}/{filename}",
            config.url_template,
            day.format("%m_%Y")
        );
        if fetch_to_file(client, &monthly_url, &outpath).await? {
            last_date = Some(datestamp);
            continue;
        }

        let flat_url = format!("{}{filename}", config.url_template);
        if fetch_to_file(client, &flat_url, &outpath).await? {
            last_date = Some(datestamp);
        } else {
            log::warn!("file not present on server: {flat_url}");
        }
    }

    Ok(last_date)
}

/// GETs `url` and writes the body to `outpath` on a 200 response.
///
/// Returns whether the download happened. Transport errors and non-200
/// statuses are logged and reported as `false`; only writing the file can
/// fail the run.
async fn fetch_to_file(
    client: &reqwest::Client,
    url: &str,
    outpath: &std::path::Path,
) -> Result<bool, FetchError> {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            log::warn!("request failed for {url}: {e}");
            return Ok(false);
        }
    };
    if response.status() != reqwest::StatusCode::OK {
        return Ok(false);
    }
    let bytes = match response.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("failed to read body from {url}: {e}");
            return Ok(false);
        }
    };
    std::fs::write(outpath, &bytes)?;
    log::info!("downloaded {url}");
    Ok(true)
}
