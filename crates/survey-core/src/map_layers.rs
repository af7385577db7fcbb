//! Map view state and layers, serialized for an external deck renderer.

use polars::prelude::DataFrame;
use serde::Serialize;
use survey_common::{any_to_f64, any_to_string_non_empty};
use survey_ingest::FeatureCollection;

use crate::frame::cells;

pub type Rgb = [u8; 3];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapView {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: f64,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            latitude: 13.7,
            longitude: -89.2,
            zoom: 8.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    /// `[longitude, latitude]`.
    pub position: [f64; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterLayer {
    pub data: Vec<ScatterPoint>,
    pub radius: f64,
    pub radius_min_pixels: f64,
    pub radius_max_pixels: f64,
    pub fill_color: Rgb,
    pub pickable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoJsonLayer {
    pub data: FeatureCollection,
    pub pickable: bool,
    pub stroked: bool,
    pub filled: bool,
    pub line_color: Rgb,
    pub line_width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum MapLayer {
    #[serde(rename = "GeoJsonLayer")]
    Polygons(GeoJsonLayer),
    #[serde(rename = "ScatterplotLayer")]
    Scatter(ScatterLayer),
}

/// Everything the renderer needs: initial view, layers in draw order and
/// the tooltip template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapReport {
    pub view: MapView,
    pub layers: Vec<MapLayer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
}

impl MapReport {
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

/// Points for every row with numeric coordinates.
///
/// `None` when either coordinate column is absent or no row has both.
pub fn scatter_points(
    df: &DataFrame,
    lat: &str,
    lon: &str,
    tooltip_column: Option<&str>,
) -> Option<ScatterLayer> {
    let lat_column = df.column(lat).ok()?;
    let lon_column = df.column(lon).ok()?;
    let tooltips: Vec<Option<String>> = match tooltip_column.and_then(|name| df.column(name).ok())
    {
        Some(column) => cells(column).map(any_to_string_non_empty).collect(),
        None => vec![None; df.height()],
    };

    let data: Vec<ScatterPoint> = cells(lat_column)
        .zip(cells(lon_column))
        .zip(tooltips)
        .filter_map(|((lat, lon), tooltip)| {
            Some(ScatterPoint {
                position: [any_to_f64(lon)?, any_to_f64(lat)?],
                tooltip,
            })
        })
        .collect();
    if data.is_empty() {
        return None;
    }
    Some(ScatterLayer {
        data,
        radius: 50.0,
        radius_min_pixels: 3.0,
        radius_max_pixels: 10.0,
        fill_color: [0, 128, 255],
        pickable: true,
    })
}

/// Outline layer for the polygons; `None` when there are no features.
pub fn polygons_layer(polygons: &FeatureCollection) -> Option<GeoJsonLayer> {
    if polygons.is_empty() {
        return None;
    }
    Some(GeoJsonLayer {
        data: polygons.clone(),
        pickable: true,
        stroked: true,
        filled: false,
        line_color: [0, 0, 0],
        line_width: 2.0,
    })
}

/// Polygons first so points draw on top. The tooltip names the key column.
pub fn build_map(
    view: &DataFrame,
    polygons: &FeatureCollection,
    lat: Option<&str>,
    lon: Option<&str>,
    key_column: Option<&str>,
) -> MapReport {
    let mut layers = Vec::new();
    if let Some(layer) = polygons_layer(polygons) {
        layers.push(MapLayer::Polygons(layer));
    }
    if let (Some(lat), Some(lon)) = (lat, lon)
        && let Some(layer) = scatter_points(view, lat, lon, key_column)
    {
        layers.push(MapLayer::Scatter(layer));
    }
    MapReport {
        view: MapView::default(),
        tooltip: key_column
            .filter(|_| !layers.is_empty())
            .map(|key| format!("{key}: {{{key}}}")),
        layers,
    }
}
