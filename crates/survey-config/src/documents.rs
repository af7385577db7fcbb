#![deny(unsafe_code)]

use std::path::Path;

use survey_model::{IndicatorRules, TabulationPlan};
use tracing::debug;

use crate::error::ConfigError;

pub fn load_plan(path: &Path) -> Result<TabulationPlan, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
    let plan = parse_plan(&contents, path)?;
    debug!(path = %path.display(), groups = plan.groups.len(), "loaded tabulation plan");
    Ok(plan)
}

pub fn parse_plan(contents: &str, origin: &Path) -> Result<TabulationPlan, ConfigError> {
    toml::from_str(contents).map_err(|e| ConfigError::toml(origin, e))
}

/// Loads indicator rules. A rules file that does not exist is an empty set.
pub fn load_rules(path: &Path) -> Result<IndicatorRules, ConfigError> {
    if !path.exists() {
        debug!(path = %path.display(), "rules file not found, no indicators");
        return Ok(IndicatorRules::default());
    }
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
    let rules = parse_rules(&contents, path)?;
    debug!(path = %path.display(), rules = rules.len(), "loaded indicator rules");
    Ok(rules)
}

pub fn parse_rules(contents: &str, origin: &Path) -> Result<IndicatorRules, ConfigError> {
    toml::from_str(contents).map_err(|e| ConfigError::toml(origin, e))
}
