use std::fmt;

use serde::{Deserialize, Serialize};

/// A single scalar read from a codebook or dataset cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Missing,
}

impl CellValue {
    /// Builds a cell from raw text, treating blank input as missing.
    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            Self::Missing
        } else {
            Self::Text(trimmed.to_string())
        }
    }

    pub fn is_missing(&self) -> bool {
        match self {
            Self::Missing => true,
            Self::Float(value) => value.is_nan(),
            Self::Text(text) => text.trim().is_empty(),
            Self::Integer(_) => false,
        }
    }

    /// Text form used for display and string-keyed lookups.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Missing => None,
            Self::Text(text) => {
                let trimmed = text.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Self::Integer(value) => Some(value.to_string()),
            Self::Float(value) if value.is_nan() => None,
            Self::Float(value) => Some(float_text(*value)),
        }
    }

    /// Integer form when the value is integral, parsing text when needed.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            Self::Float(value) => whole_float(*value),
            Self::Text(text) => {
                let trimmed = text.trim();
                trimmed
                    .parse::<i64>()
                    .ok()
                    .or_else(|| trimmed.parse::<f64>().ok().and_then(whole_float))
            }
            Self::Missing => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Integer(value) => Some(*value as f64),
            Self::Float(value) => Some(*value).filter(|v| !v.is_nan()),
            Self::Text(text) => text.trim().parse::<f64>().ok().filter(|v| !v.is_nan()),
            Self::Missing => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text().unwrap_or_default())
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::from_text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        if value.is_nan() {
            Self::Missing
        } else {
            Self::Float(value)
        }
    }
}

pub(crate) fn float_text(value: f64) -> String {
    match whole_float(value) {
        Some(whole) => whole.to_string(),
        None => value.to_string(),
    }
}

pub(crate) fn whole_float(value: f64) -> Option<i64> {
    (value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15).then_some(value as i64)
}
