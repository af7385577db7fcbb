//! Loading a survey and memoizing the result per configuration.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use polars::prelude::DataFrame;
use survey_config::Settings;
use survey_ingest::{FeatureCollection, read_codebook, read_data, read_geojson};
use survey_labels::{apply_value_labels, label_maps_from_codebook, normalize_codebook};
use survey_model::{Codebook, LabelMaps};
use tracing::{debug, info, info_span};

use crate::features::apply_derived_fields;
use crate::frame::column_names;

/// A survey ready for filtering and tabulation. Read-only once built.
#[derive(Debug, Clone)]
pub struct LoadedSurvey {
    /// Data as read from disk.
    pub raw: DataFrame,
    /// Data with value labels applied and derived fields added.
    pub labeled: DataFrame,
    pub codebook: Codebook,
    pub labels: LabelMaps,
    pub polygons: FeatureCollection,
}

/// Read and label the survey named by `settings`.
///
/// A missing data or codebook file is an error; a missing polygons file
/// yields an empty feature collection.
pub fn load_survey(settings: &Settings) -> Result<LoadedSurvey> {
    let fingerprint = settings.fingerprint().context("fingerprint settings")?;
    let span = info_span!("load", fingerprint = %short(&fingerprint));
    let _guard = span.enter();
    let start = Instant::now();

    let raw = read_data(&settings.data_path)
        .with_context(|| format!("read data {}", settings.data_path.display()))?;
    let raw_codebook = read_codebook(&settings.codebook_path)
        .with_context(|| format!("read codebook {}", settings.codebook_path.display()))?;

    let columns = column_names(&raw);
    let codebook = normalize_codebook(&raw_codebook, Some(&columns));
    let labels = label_maps_from_codebook(&codebook);
    let labeled = apply_value_labels(&raw, &labels.value_labels).context("apply value labels")?;
    let labeled = apply_derived_fields(&labeled).context("add derived fields")?;

    let polygons = match &settings.polygons_path {
        Some(path) => {
            read_geojson(path).with_context(|| format!("read polygons {}", path.display()))?
        }
        None => FeatureCollection::empty(),
    };

    info!(
        rows = raw.height(),
        columns = raw.width(),
        codebook_entries = codebook.len(),
        labeled_variables = labels.value_labels.len(),
        features = polygons.features.len(),
        duration_ms = start.elapsed().as_millis(),
        "survey loaded"
    );
    Ok(LoadedSurvey {
        raw,
        labeled,
        codebook,
        labels,
        polygons,
    })
}

fn short(fingerprint: &str) -> &str {
    fingerprint.get(..12).unwrap_or(fingerprint)
}

/// Loaded surveys keyed by the settings fingerprint.
///
/// Changing a load source path changes the key, so a stale entry is never served.
#[derive(Debug, Default)]
pub struct LoadCache {
    entries: HashMap<String, Arc<LoadedSurvey>>,
}

impl LoadCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(&mut self, settings: &Settings) -> Result<Arc<LoadedSurvey>> {
        self.get_or_load_with(settings, load_survey)
    }

    /// Like [`LoadCache::get_or_load`] with a custom loader for misses.
    pub fn get_or_load_with<F>(&mut self, settings: &Settings, loader: F) -> Result<Arc<LoadedSurvey>>
    where
        F: FnOnce(&Settings) -> Result<LoadedSurvey>,
    {
        let key = settings.fingerprint().context("fingerprint settings")?;
        if let Some(hit) = self.entries.get(&key) {
            debug!(fingerprint = %short(&key), "load cache hit");
            return Ok(Arc::clone(hit));
        }
        debug!(fingerprint = %short(&key), "load cache miss");
        let loaded = Arc::new(loader(settings)?);
        self.entries.insert(key, Arc::clone(&loaded));
        Ok(loaded)
    }

    /// Drop the entry for `settings`. Returns whether one was cached.
    pub fn invalidate(&mut self, settings: &Settings) -> bool {
        settings
            .fingerprint()
            .is_ok_and(|key| self.entries.remove(&key).is_some())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
