//! Recorded-lightning downloader.
//!
//! The AICC `ArcGIS` feature service exposes recorded lightning as five
//! layers: strikes from today, yesterday, two and three days ago, and a
//! rolling two-week window. Each layer is fetched with offset pagination
//! and written as one JSON file wrapping the raw features in a small
//! metadata header.

use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use serde::Serialize;

use crate::FetchError;

/// Default query URL for the AICC recorded-lightning feature service; the
/// layer index is appended per dataset.
pub const SERVICE_URL: &str = "https://fire.ak.blm.gov/arcgis/rest/services/MapAndFeatureServices/AK_Recorded_Lightning/FeatureServer";

/// Max records per paginated request.
const PAGE_SIZE: u64 = 2000;

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Courtesy delay between successive pages.
const PAGE_DELAY: Duration = Duration::from_millis(500);

/// One layer of the recorded-lightning service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightningDataset {
    /// Feature service layer index.
    pub layer: usize,
    /// Label used in output filenames and logs.
    pub label: &'static str,
    /// How many days before the retrieval date this layer's data is for.
    pub day_offset: i64,
}

/// The five layers the service publishes, in layer order.
pub const DATASETS: [LightningDataset; 5] = [
    LightningDataset {
        layer: 0,
        label: "today",
        day_offset: 0,
    },
    LightningDataset {
        layer: 1,
        label: "yesterday",
        day_offset: 1,
    },
    LightningDataset {
        layer: 2,
        label: "two_days_ago",
        day_offset: 2,
    },
    LightningDataset {
        layer: 3,
        label: "three_days_ago",
        day_offset: 3,
    },
    LightningDataset {
        layer: 4,
        label: "last_two_weeks",
        day_offset: 4,
    },
];

impl LightningDataset {
    /// Date of the lightning data in this layer, relative to the retrieval
    /// date.
    #[must_use]
    pub fn data_date(&self, retrieved: NaiveDate) -> NaiveDate {
        retrieved - chrono::Duration::days(self.day_offset)
    }

    /// Output filename for this layer's data retrieved on `retrieved`.
    #[must_use]
    pub fn output_filename(&self, retrieved: NaiveDate) -> String {
        format!(
            "alaska_lightning_{}_{}.json",
            retrieved.format("%Y%m%d"),
            self.label
        )
    }
}

/// Configuration for a lightning download run.
#[derive(Debug, Clone)]
pub struct LightningConfig {
    /// Base URL of the feature service (no trailing slash).
    pub service_url: String,
    /// Directory output JSON files are written to.
    pub output_dir: PathBuf,
    /// Date of the run; data dates are derived from it per layer.
    pub retrieved: NaiveDate,
}

/// Metadata header written alongside the raw features.
#[derive(Debug, Serialize)]
struct LightningMetadata {
    total_records: usize,
    retrieved_date: String,
    data_date: String,
    data_label: &'static str,
    service_index: usize,
}

#[derive(Debug, Serialize)]
struct LightningFile {
    metadata: LightningMetadata,
    features: Vec<serde_json::Value>,
}

/// Fetches one layer of recorded lightning with pagination and writes it as
/// a metadata-wrapped JSON file. Returns the output path.
///
/// A service-reported error, transport failure or malformed page ends the
/// pagination with a warning; whatever was fetched up to that point is
/// still written.
///
/// # Errors
///
/// Returns [`FetchError`] if the output directory or file cannot be
/// written, or the output cannot be serialized.
pub async fn download_lightning(
    client: &reqwest::Client,
    config: &LightningConfig,
    dataset: &LightningDataset,
) -> Result<PathBuf, FetchError> {
    let data_date = dataset.data_date(config.retrieved);
    log::info!(
        "retrieving lightning data for {data_date} ({})",
        dataset.label
    );

    let features = fetch_features(client, config, dataset).await;
    log_summary(dataset, &features);

    std::fs::create_dir_all(&config.output_dir)?;
    let output_path = config.output_dir.join(dataset.output_filename(config.retrieved));
    let file = LightningFile {
        metadata: LightningMetadata {
            total_records: features.len(),
            retrieved_date: config.retrieved.to_string(),
            data_date: data_date.to_string(),
            data_label: dataset.label,
            service_index: dataset.layer,
        },
        features,
    };
    std::fs::write(&output_path, serde_json::to_string_pretty(&file)?)?;
    log::info!("lightning data saved to {}", output_path.display());

    Ok(output_path)
}

/// Paginated feature fetch for one layer.
async fn fetch_features(
    client: &reqwest::Client,
    config: &LightningConfig,
    dataset: &LightningDataset,
) -> Vec<serde_json::Value> {
    let url = format!("{}/{}/query", config.service_url, dataset.layer);
    let mut all_features: Vec<serde_json::Value> = Vec::new();
    let mut offset: u64 = 0;

    loop {
        log::info!("[{}] fetching records starting at offset {offset}", dataset.label);
        let request = client
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .query(&[
                ("where", "1=1"),
                ("outFields", "*"),
                ("returnGeometry", "true"),
                ("f", "json"),
            ])
            .query(&[("resultRecordCount", PAGE_SIZE), ("resultOffset", offset)]);

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                log::warn!("[{}] request error: {e}", dataset.label);
                break;
            }
        };
        let body: serde_json::Value = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                log::warn!("[{}] JSON decode error: {e}", dataset.label);
                break;
            }
        };
        if let Some(error) = body.get("error") {
            log::warn!("[{}] error from ArcGIS service: {error}", dataset.label);
            break;
        }

        let features = body
            .get("features")
            .and_then(serde_json::Value::as_array)
            .cloned()
            .unwrap_or_default();
        if features.is_empty() {
            break;
        }

        offset += features.len() as u64;
        log::info!(
            "[{}] retrieved {} records (total: {offset})",
            dataset.label,
            features.len()
        );
        all_features.extend(features);

        // `exceededTransferLimit` is the canonical more-pages signal; a
        // short page is unreliable because the server caps results at its
        // own maxRecordCount.
        let exceeded = body
            .get("exceededTransferLimit")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false);
        if !exceeded {
            break;
        }

        tokio::time::sleep(PAGE_DELAY).await;
    }

    all_features
}

/// Logs record count and, for the first feature, the attribute names.
fn log_summary(dataset: &LightningDataset, features: &[serde_json::Value]) {
    if features.is_empty() {
        log::info!("no lightning data found for {}", dataset.label);
        return;
    }
    log::info!("[{}] total records: {}", dataset.label, features.len());
    if let Some(attrs) = features[0].get("attributes").and_then(serde_json::Value::as_object) {
        let keys: Vec<&str> = attrs.keys().map(String::as_str).collect();
        log::info!("[{}] available attributes: {}", dataset.label, keys.join(", "));
    }
}
