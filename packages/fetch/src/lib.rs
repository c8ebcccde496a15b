#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! HTTP retrieval of AICC data.
//!
//! Two fetchers share the same shape: request sequentially, log every
//! failure with its cause, and never let one bad day or page abort the
//! whole run. [`reports`] pulls the per-day situation report workbooks;
//! [`lightning`] pulls recorded-lightning features from the AICC `ArcGIS`
//! feature service.

pub mod lightning;
pub mod reports;

/// Errors that can occur during fetch operations.
///
/// Transport failures for an individual day or page are logged and skipped
/// rather than surfaced here; these variants cover the failures that make
/// continuing pointless (local I/O, serialization of our own output).
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// HTTP client construction or other non-recoverable request error.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error writing a downloaded file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
