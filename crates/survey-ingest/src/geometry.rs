//! GeoJSON polygons for the map layer.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{IngestError, Result};

/// A GeoJSON feature collection. Features are kept as raw JSON and handed to
/// the map renderer untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub features: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FeatureCollection {
    pub fn empty() -> Self {
        Self {
            kind: "FeatureCollection".to_string(),
            features: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl Default for FeatureCollection {
    fn default() -> Self {
        Self::empty()
    }
}

/// Reads polygons. A missing file yields an empty collection.
pub fn read_geojson(path: &Path) -> Result<FeatureCollection> {
    if !path.exists() {
        debug!(path = %path.display(), "geometry file not found, no polygons");
        return Ok(FeatureCollection::empty());
    }
    let bytes = std::fs::read(path).map_err(|e| IngestError::from_io(path, e))?;
    let collection: FeatureCollection =
        serde_json::from_slice(&bytes).map_err(|e| IngestError::Geometry {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    if collection.kind != "FeatureCollection" {
        return Err(IngestError::Geometry {
            path: path.to_path_buf(),
            message: format!("expected FeatureCollection, found {}", collection.kind),
        });
    }
    debug!(path = %path.display(), features = collection.features.len(), "loaded polygons");
    Ok(collection)
}
