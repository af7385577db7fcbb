//! TOML configuration for the survey dashboard.
//!
//! Three documents are read here: the settings file naming the data sources
//! and key columns, the tabulation plan, and the indicator rules.

#![deny(unsafe_code)]

pub mod documents;
pub mod error;
pub mod hash;
pub mod settings;

pub use documents::{load_plan, load_rules, parse_plan, parse_rules};
pub use error::ConfigError;
pub use hash::sha256_hex;
pub use settings::{DEFAULT_SETTINGS_PATH, Settings};
