#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! In-memory spatial index over the Predictive Service Area boundaries.
//!
//! Loads the static PSA reference layer (a `GeoJSON` feature collection)
//! once, builds an R-tree over the polygon envelopes, and provides fast
//! point-in-polygon lookups for the report join. The PSA layer is read-only
//! for this pipeline.

use std::path::Path;

use ak_fire_models::{PsaRecord, SituationRecord};
use geo::{Contains, MultiPolygon};
use geojson::GeoJson;
use rstar::{AABB, RTree, RTreeObject};

/// Errors that can occur while loading the PSA reference layer.
#[derive(Debug, thiserror::Error)]
pub enum SpatialError {
    /// I/O error reading the layer file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid `GeoJSON`.
    #[error("GeoJSON parse error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// The file parses but is not a usable PSA layer.
    #[error("invalid PSA layer: {message}")]
    InvalidLayer {
        /// Description of what is wrong with the layer.
        message: String,
    },
}

/// A PSA polygon stored in the R-tree with the two attributes the pipeline
/// keeps (`PSA_NAME` and `NAT_CODE`; the layer's `GACC` and `ID` attributes
/// are not carried).
#[derive(Debug)]
struct PsaEntry {
    psa_name: String,
    nat_code: String,
    envelope: AABB<[f64; 2]>,
    polygon: MultiPolygon<f64>,
}

impl RTreeObject for PsaEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Pre-built spatial index over the PSA polygons.
///
/// Constructed once per run and shared by reference; lookups never mutate.
#[derive(Debug)]
pub struct PsaIndex {
    regions: RTree<PsaEntry>,
}

impl PsaIndex {
    /// Loads the PSA boundary layer from a `GeoJSON` file and builds the
    /// R-tree index.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a `GeoJSON`
    /// feature collection with PSA attributes.
    pub fn load(path: &Path) -> Result<Self, SpatialError> {
        let raw = std::fs::read_to_string(path)?;
        let index = Self::from_geojson_str(&raw)?;
        log::info!(
            "loaded {} PSA polygons from {}",
            index.len(),
            path.display()
        );
        Ok(index)
    }

    /// Builds the index from `GeoJSON` feature collection text.
    ///
    /// Features without a polygonal geometry or without the `PSA_NAME` /
    /// `NAT_CODE` attributes are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a `GeoJSON` feature collection.
    pub fn from_geojson_str(raw: &str) -> Result<Self, SpatialError> {
        let geojson: GeoJson = raw.parse()?;
        let GeoJson::FeatureCollection(collection) = geojson else {
            return Err(SpatialError::InvalidLayer {
                message: "expected a FeatureCollection".to_owned(),
            });
        };

        let mut entries = Vec::new();
        for feature in collection.features {
            let Some(psa_name) = string_property(feature.properties.as_ref(), "PSA_NAME") else {
                log::warn!("skipping PSA feature without PSA_NAME");
                continue;
            };
            let Some(nat_code) = string_property(feature.properties.as_ref(), "NAT_CODE") else {
                log::warn!("skipping PSA feature {psa_name}: no NAT_CODE");
                continue;
            };
            let Some(polygon) = feature.geometry.and_then(to_multipolygon) else {
                log::warn!("skipping PSA feature {psa_name}: no polygonal geometry");
                continue;
            };
            let envelope = compute_envelope(&polygon);
            entries.push(PsaEntry {
                psa_name,
                nat_code,
                envelope,
                polygon,
            });
        }

        if entries.is_empty() {
            return Err(SpatialError::InvalidLayer {
                message: "no usable PSA polygons in layer".to_owned(),
            });
        }

        Ok(Self {
            regions: RTree::bulk_load(entries),
        })
    }

    /// Looks up the PSA containing a point.
    ///
    /// PSAs tile the state without overlap, so the first strict containment
    /// match wins. Points on a shared boundary or outside every polygon
    /// return `None`.
    #[must_use]
    pub fn lookup(&self, lng: f64, lat: f64) -> Option<(&str, &str)> {
        let point = geo::Point::new(lng, lat);
        let query_env = AABB::from_point([lng, lat]);

        for entry in self.regions.locate_in_envelope_intersecting(&query_env) {
            if entry.polygon.contains(&point) {
                return Some((&entry.psa_name, &entry.nat_code));
            }
        }
        None
    }

    /// Number of polygons in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.size()
    }

    /// Whether the index holds no polygons.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.size() == 0
    }
}

/// Inner spatial join of situation records against the PSA layer.
///
/// Each record with coordinates whose point falls strictly within a PSA
/// polygon comes back tagged with that PSA's name and national code.
/// Records without coordinates, or with a point outside every PSA (slightly
/// offshore incidents, mostly), are dropped from PSA-based aggregation;
/// the drop counts are logged.
#[must_use]
pub fn join_psa(records: &[SituationRecord], index: &PsaIndex) -> Vec<PsaRecord> {
    let mut joined = Vec::new();
    let mut no_coords: usize = 0;
    let mut outside: usize = 0;

    for record in records {
        let (Some(latitude), Some(longitude)) = (record.latitude, record.longitude) else {
            no_coords += 1;
            continue;
        };
        let Some((psa_name, nat_code)) = index.lookup(longitude, latitude) else {
            outside += 1;
            continue;
        };
        joined.push(PsaRecord {
            incident_number: record.incident_number.clone(),
            incident_name: record.incident_name.clone(),
            incident_type: record.incident_type.clone(),
            protecting_office: record.protecting_office.clone(),
            protecting_office_label: record.protecting_office_label.clone(),
            latitude,
            longitude,
            acres: record.acres,
            report_date: record.report_date,
            psa_name: psa_name.to_owned(),
            nat_code: nat_code.to_owned(),
        });
    }

    log::info!(
        "PSA join: {} of {} records matched ({no_coords} without coordinates, {outside} outside all PSAs)",
        joined.len(),
        records.len()
    );
    joined
}

/// Reads a string-valued feature property, accepting numeric codes as well.
fn string_property(
    properties: Option<&serde_json::Map<String, serde_json::Value>>,
    key: &str,
) -> Option<String> {
    match properties?.get(key)? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Converts a `GeoJSON` geometry into a [`MultiPolygon`]. Handles both
/// `Polygon` and `MultiPolygon` geometry types.
fn to_multipolygon(geometry: geojson::Geometry) -> Option<MultiPolygon<f64>> {
    let geo_geom: geo::Geometry<f64> = geometry.try_into().ok()?;
    match geo_geom {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}

/// Compute the bounding box envelope for a [`MultiPolygon`].
fn compute_envelope(mp: &MultiPolygon<f64>) -> AABB<[f64; 2]> {
    use geo::BoundingRect;

    mp.bounding_rect().map_or_else(
        || AABB::from_point([0.0, 0.0]),
        |rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
    )
}
