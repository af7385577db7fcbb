#![deny(unsafe_code)]

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::hash::sha256_hex;

pub const DEFAULT_SETTINGS_PATH: &str = "config/settings.toml";

/// Data sources and key columns for one survey.
///
/// Relative paths are resolved against the process working directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub data_path: PathBuf,
    pub codebook_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polygons_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_filter_col: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_col: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat_col: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon_col: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules_path: Option<PathBuf>,
}

impl Settings {
    pub fn new(data_path: impl Into<PathBuf>, codebook_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            codebook_path: codebook_path.into(),
            polygons_path: None,
            key_filter_col: None,
            weight_col: None,
            lat_col: None,
            lon_col: None,
            plan_path: None,
            rules_path: None,
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let settings = Self::parse(&contents, path)?;
        debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Parses settings text; `origin` is only used in error messages.
    pub fn parse(contents: &str, origin: &Path) -> Result<Self, ConfigError> {
        let settings: Self =
            toml::from_str(contents).map_err(|e| ConfigError::toml(origin, e))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_path.as_os_str().is_empty() {
            return Err(ConfigError::invalid("data_path must not be empty"));
        }
        if self.codebook_path.as_os_str().is_empty() {
            return Err(ConfigError::invalid("codebook_path must not be empty"));
        }
        for (key, value) in [
            ("key_filter_col", &self.key_filter_col),
            ("weight_col", &self.weight_col),
            ("lat_col", &self.lat_col),
            ("lon_col", &self.lon_col),
        ] {
            if value.as_deref().is_some_and(|name| name.trim().is_empty()) {
                return Err(ConfigError::invalid(format!("{key} must not be blank")));
            }
        }
        Ok(())
    }

    /// SHA-256 of the canonical TOML form of the load sources (data,
    /// codebook and polygons paths). Two settings values with the same
    /// fingerprint load the same survey; column and plan settings do not
    /// take part.
    pub fn fingerprint(&self) -> Result<String, ConfigError> {
        let sources = LoadSources {
            data_path: &self.data_path,
            codebook_path: &self.codebook_path,
            polygons_path: self.polygons_path.as_deref(),
        };
        let canonical = toml::to_string(&sources)
            .map_err(|e| ConfigError::invalid(format!("settings cannot be serialized: {e}")))?;
        Ok(sha256_hex(canonical.as_bytes()))
    }
}

#[derive(Serialize)]
struct LoadSources<'a> {
    data_path: &'a Path,
    codebook_path: &'a Path,
    #[serde(skip_serializing_if = "Option::is_none")]
    polygons_path: Option<&'a Path>,
}
