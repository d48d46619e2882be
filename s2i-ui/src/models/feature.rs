//! Feature records and boundary normalization
//!
//! The converter returns GeoJSON-style feature rows. Rows are accepted
//! into the working set only if they satisfy the record contract below;
//! anything else is dropped at the boundary so the cache never holds a
//! partial or garbage record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Geometry payload attached to a spatial feature
///
/// Coordinates are carried opaquely; this service never interprets
/// them (geometry handling lives in the converter).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// GeoJSON geometry type ("Polygon", "LineString", ...)
    #[serde(rename = "type")]
    pub kind: String,
    /// Raw coordinate payload, passed through untouched
    #[serde(default)]
    pub coordinates: Value,
}

/// One geographic or attribute entity in the review working set
///
/// Identity is `id`; uniqueness is enforced by the converter and
/// consumed as given. `geometry` is `None` for non-spatial records
/// (address, building).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub id: String,
    pub feature_type: String,
    pub geometry: Option<Geometry>,
    pub properties: Map<String, Value>,
}

impl FeatureRecord {
    /// Validate a raw feature row into a record
    ///
    /// Contract: a string `id`, a string `feature_type`, an object
    /// `properties`, and (when present and non-null) a geometry object
    /// carrying a string `type`. Returns `None` for anything else.
    pub fn from_value(value: &Value) -> Option<FeatureRecord> {
        let obj = value.as_object()?;

        let id = obj.get("id")?.as_str()?.to_string();
        let feature_type = obj.get("feature_type")?.as_str()?.to_string();
        let properties = obj.get("properties")?.as_object()?.clone();

        let geometry = match obj.get("geometry") {
            None | Some(Value::Null) => None,
            Some(geom) => {
                let geom_obj = geom.as_object()?;
                let kind = geom_obj.get("type")?.as_str()?.to_string();
                Some(Geometry {
                    kind,
                    coordinates: geom_obj.get("coordinates").cloned().unwrap_or(Value::Null),
                })
            }
        };

        Some(FeatureRecord {
            id,
            feature_type,
            geometry,
            properties,
        })
    }

    /// Display name, if the property bag carries one
    ///
    /// `name` is either a label map (`{"en": "Lobby"}`) or a plain
    /// string depending on how far through the pipeline the record is.
    pub fn display_name(&self) -> Option<String> {
        match self.properties.get("name") {
            Some(Value::String(text)) => Some(text.clone()),
            Some(Value::Object(labels)) => labels
                .values()
                .find_map(|v| v.as_str())
                .map(|s| s.to_string()),
            _ => None,
        }
    }

    /// Computed review status ("mapped", "error", "warning"), if annotated
    pub fn status(&self) -> Option<&str> {
        self.properties.get("status").and_then(Value::as_str)
    }

    /// Category property, if present
    pub fn category(&self) -> Option<&str> {
        self.properties.get("category").and_then(Value::as_str)
    }

    /// Level the feature is linked to, if any
    pub fn level_id(&self) -> Option<&str> {
        self.properties.get("level_id").and_then(Value::as_str)
    }
}

/// Normalize a batch of raw rows, silently dropping invalid payloads
///
/// The drop is logged (count only) but never surfaced to the caller.
pub fn normalize_rows(rows: &[Value]) -> Vec<FeatureRecord> {
    let mut records = Vec::with_capacity(rows.len());
    let mut dropped = 0usize;
    for row in rows {
        match FeatureRecord::from_value(row) {
            Some(record) => records.push(record),
            None => dropped += 1,
        }
    }
    if dropped > 0 {
        tracing::debug!(dropped, accepted = records.len(), "Dropped malformed feature rows");
    }
    records
}
