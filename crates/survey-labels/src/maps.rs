use std::collections::BTreeMap;

use polars::prelude::DataFrame;
use survey_model::{Codebook, LabelMaps, ValueLabelMap};
use tracing::debug;

use crate::normalize::normalize_codebook;

/// Normalizes a raw codebook and builds its label maps.
///
/// Never fails: an empty or unrecognizable codebook yields empty maps.
pub fn build_label_maps(raw: &DataFrame, dataset_columns: Option<&[String]>) -> LabelMaps {
    let codebook = normalize_codebook(raw, dataset_columns);
    label_maps_from_codebook(&codebook)
}

/// Builds variable and value label maps from a normalized codebook.
///
/// The first usable variable label per variable wins. For value labels a
/// later row for the same value replaces an earlier one.
pub fn label_maps_from_codebook(codebook: &Codebook) -> LabelMaps {
    let mut variable_labels = BTreeMap::new();
    let mut value_labels: BTreeMap<String, ValueLabelMap> = BTreeMap::new();

    for entry in codebook.entries() {
        let Some(variable) = entry.variable.as_deref() else {
            continue;
        };
        if let Some(label) = usable_label(entry.label_variable.as_deref()) {
            variable_labels
                .entry(variable.to_string())
                .or_insert_with(|| label.to_string());
        }
        if entry.value.is_missing() {
            continue;
        }
        if let Some(label) = usable_label(entry.label_value.as_deref()) {
            value_labels
                .entry(variable.to_string())
                .or_default()
                .insert(&entry.value, label);
        }
    }

    debug!(
        entries = codebook.len(),
        variable_labels = variable_labels.len(),
        value_labels = value_labels.len(),
        "built label maps"
    );
    LabelMaps {
        variable_labels,
        value_labels,
    }
}

/// Trimmed label, or `None` when it is blank or the text `nan`.
fn usable_label(label: Option<&str>) -> Option<&str> {
    let trimmed = label?.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        None
    } else {
        Some(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use survey_model::{CellValue, CodebookEntry};

    use super::*;

    #[test]
    fn first_usable_variable_label_wins() {
        let codebook: Codebook = [
            CodebookEntry::new("sexo", 1_i64).with_label_variable("NaN"),
            CodebookEntry::new("sexo", 2_i64).with_label_variable("Sexo"),
            CodebookEntry::new("sexo", 3_i64).with_label_variable("Sexo (otro)"),
        ]
        .into_iter()
        .collect();
        let maps = label_maps_from_codebook(&codebook);
        assert_eq!(maps.variable_label("sexo"), "Sexo");
    }

    #[test]
    fn rows_without_usable_labels_are_skipped() {
        let codebook: Codebook = [
            CodebookEntry::new("area", 1_i64).with_label_value("  "),
            CodebookEntry::new("area", CellValue::Missing).with_label_value("Urbano"),
            CodebookEntry::new("agua", 1_i64).with_label_value("nan"),
            CodebookEntry::new("agua", 2_i64).with_label_value(" Pozo "),
        ]
        .into_iter()
        .collect();
        let maps = label_maps_from_codebook(&codebook);
        assert!(maps.value_map("area").is_none());
        let agua = maps.value_map("agua").expect("agua labels");
        assert_eq!(agua.len(), 1);
        assert_eq!(agua.lookup(&CellValue::Integer(2)), Some("Pozo"));
    }

    #[test]
    fn duplicate_values_keep_last_label() {
        let codebook: Codebook = [
            CodebookEntry::new("nivel", "3").with_label_value("Alta"),
            CodebookEntry::new("nivel", "3").with_label_value("Muy alta"),
        ]
        .into_iter()
        .collect();
        let maps = label_maps_from_codebook(&codebook);
        assert_eq!(maps.value_label("nivel", &CellValue::Integer(3)), Some("Muy alta"));
    }
}
