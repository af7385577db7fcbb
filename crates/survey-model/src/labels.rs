//! Lookup structures produced from a normalized codebook.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::cell::{CellValue, float_text, whole_float};

/// Value-to-label mapping for one variable.
///
/// Keys are indexed three ways (text, integer and float) so that a dataset
/// cell typed differently from the codebook still finds its label: integer
/// `1`, float `1.0` and text `"1"` all resolve to the same entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct ValueLabelMap {
    by_text: BTreeMap<String, String>,
    by_integer: HashMap<i64, String>,
    by_float: HashMap<u64, String>,
}

impl ValueLabelMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a mapping. A later insert for the same value replaces the earlier one.
    pub fn insert(&mut self, value: &CellValue, label: &str) {
        let label = label.to_string();
        if let Some(text) = value.as_text() {
            self.by_text.insert(text, label.clone());
        }
        if let Some(integer) = value.as_integer() {
            self.by_integer.insert(integer, label.clone());
        }
        if let Some(key) = value.as_float().and_then(float_key) {
            self.by_float.insert(key, label);
        }
    }

    /// Finds the label for a cell, trying its own type first and then its
    /// other numeric and text forms.
    pub fn lookup(&self, value: &CellValue) -> Option<&str> {
        let found = match value {
            CellValue::Missing => None,
            CellValue::Integer(v) => self
                .get_integer(*v)
                .or_else(|| self.get_float(*v as f64))
                .or_else(|| self.get_text(&v.to_string())),
            CellValue::Float(v) => self
                .get_float(*v)
                .or_else(|| whole_float(*v).and_then(|whole| self.get_integer(whole)))
                .or_else(|| self.get_text(&float_text(*v))),
            CellValue::Text(text) => self
                .get_text(text)
                .or_else(|| value.as_integer().and_then(|v| self.get_integer(v)))
                .or_else(|| value.as_float().and_then(|v| self.get_float(v))),
        };
        found.map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_text.is_empty()
    }

    /// Iterates `(value text, label)` pairs ordered by value text.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.by_text.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn get_integer(&self, value: i64) -> Option<&String> {
        self.by_integer.get(&value)
    }

    fn get_float(&self, value: f64) -> Option<&String> {
        float_key(value).and_then(|key| self.by_float.get(&key))
    }

    fn get_text(&self, value: &str) -> Option<&String> {
        self.by_text.get(value.trim())
    }
}

impl From<BTreeMap<String, String>> for ValueLabelMap {
    fn from(entries: BTreeMap<String, String>) -> Self {
        let mut map = Self::new();
        for (value, label) in &entries {
            map.insert(&CellValue::from_text(value), label);
        }
        map
    }
}

impl From<ValueLabelMap> for BTreeMap<String, String> {
    fn from(map: ValueLabelMap) -> Self {
        map.by_text
    }
}

fn float_key(value: f64) -> Option<u64> {
    if value.is_nan() {
        None
    } else if value == 0.0 {
        Some(0.0f64.to_bits())
    } else {
        Some(value.to_bits())
    }
}

/// Variable labels and per-variable value labels built from a codebook.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelMaps {
    pub variable_labels: BTreeMap<String, String>,
    pub value_labels: BTreeMap<String, ValueLabelMap>,
}

impl LabelMaps {
    /// Human label for a variable, falling back to the raw name.
    pub fn variable_label<'a>(&'a self, variable: &'a str) -> &'a str {
        self.variable_labels
            .get(variable)
            .map_or(variable, String::as_str)
    }

    pub fn value_map(&self, variable: &str) -> Option<&ValueLabelMap> {
        self.value_labels.get(variable)
    }

    /// Label for a single value of a variable, if the codebook defines one.
    pub fn value_label(&self, variable: &str, value: &CellValue) -> Option<&str> {
        self.value_map(variable).and_then(|map| map.lookup(value))
    }

    pub fn is_empty(&self) -> bool {
        self.variable_labels.is_empty() && self.value_labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sexo_map() -> ValueLabelMap {
        let mut map = ValueLabelMap::new();
        map.insert(&CellValue::Integer(1), "Hombre");
        map.insert(&CellValue::Integer(2), "Mujer");
        map
    }

    #[test]
    fn integer_keys_match_float_and_text_cells() {
        let map = sexo_map();
        assert_eq!(map.lookup(&CellValue::Integer(1)), Some("Hombre"));
        assert_eq!(map.lookup(&CellValue::Float(2.0)), Some("Mujer"));
        assert_eq!(map.lookup(&CellValue::Text("1".to_string())), Some("Hombre"));
        assert_eq!(map.lookup(&CellValue::Text(" 2.0 ".to_string())), Some("Mujer"));
        assert_eq!(map.lookup(&CellValue::Integer(3)), None);
        assert_eq!(map.lookup(&CellValue::Missing), None);
    }

    #[test]
    fn text_keys_match_numeric_cells() {
        let mut map = ValueLabelMap::new();
        map.insert(&CellValue::Text("1".to_string()), "Urbano");
        map.insert(&CellValue::Text("A".to_string()), "Alta");
        assert_eq!(map.lookup(&CellValue::Integer(1)), Some("Urbano"));
        assert_eq!(map.lookup(&CellValue::Text("A".to_string())), Some("Alta"));
        assert_eq!(map.lookup(&CellValue::Text("a".to_string())), None);
    }

    #[test]
    fn later_insert_wins() {
        let mut map = sexo_map();
        map.insert(&CellValue::Float(1.0), "Masculino");
        assert_eq!(map.lookup(&CellValue::Integer(1)), Some("Masculino"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn fractional_values_do_not_collide_with_integers() {
        let mut map = ValueLabelMap::new();
        map.insert(&CellValue::Float(1.5), "Medio");
        assert_eq!(map.lookup(&CellValue::Float(1.5)), Some("Medio"));
        assert_eq!(map.lookup(&CellValue::Integer(1)), None);
        assert_eq!(map.lookup(&CellValue::Integer(2)), None);
    }

    #[test]
    fn variable_label_falls_back_to_name() {
        let mut maps = LabelMaps::default();
        maps.variable_labels
            .insert("sexo".to_string(), "Sexo de la persona".to_string());
        assert_eq!(maps.variable_label("sexo"), "Sexo de la persona");
        assert_eq!(maps.variable_label("edad"), "edad");
    }
}
