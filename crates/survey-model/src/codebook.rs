use serde::{Deserialize, Serialize};

use crate::cell::CellValue;

/// Canonical codebook column names, in positional order.
pub const CANONICAL_COLUMNS: [&str; 4] = ["variable", "value", "label_value", "label_variable"];

/// One normalized codebook row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodebookEntry {
    pub variable: Option<String>,
    pub value: CellValue,
    pub label_value: Option<String>,
    pub label_variable: Option<String>,
}

impl CodebookEntry {
    pub fn new(variable: impl Into<String>, value: impl Into<CellValue>) -> Self {
        Self {
            variable: Some(variable.into()),
            value: value.into(),
            label_value: None,
            label_variable: None,
        }
    }

    pub fn with_label_value(mut self, label: impl Into<String>) -> Self {
        self.label_value = Some(label.into());
        self
    }

    pub fn with_label_variable(mut self, label: impl Into<String>) -> Self {
        self.label_variable = Some(label.into());
        self
    }
}

/// A normalized codebook with the four canonical columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Codebook {
    entries: Vec<CodebookEntry>,
}

impl Codebook {
    pub fn new(entries: Vec<CodebookEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CodebookEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, entry: CodebookEntry) {
        self.entries.push(entry);
    }

    /// Distinct variable names in first-seen order.
    pub fn variables(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for entry in &self.entries {
            if let Some(name) = entry.variable.as_deref()
                && !seen.contains(&name)
            {
                seen.push(name);
            }
        }
        seen
    }

    pub fn entries_for<'a>(&'a self, variable: &'a str) -> impl Iterator<Item = &'a CodebookEntry> {
        self.entries
            .iter()
            .filter(move |entry| entry.variable.as_deref() == Some(variable))
    }
}

impl FromIterator<CodebookEntry> for Codebook {
    fn from_iter<T: IntoIterator<Item = CodebookEntry>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variables_are_distinct_and_ordered() {
        let codebook: Codebook = [
            CodebookEntry::new("sexo", 1_i64),
            CodebookEntry::new("area", 1_i64),
            CodebookEntry::new("sexo", 2_i64),
        ]
        .into_iter()
        .collect();
        assert_eq!(codebook.variables(), vec!["sexo", "area"]);
        assert_eq!(codebook.entries_for("sexo").count(), 2);
    }
}
