use serde::{Deserialize, Serialize};

use crate::tables::Normalize;

/// Ordered groups of tables rendered by the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TabulationPlan {
    #[serde(default, rename = "tabulados", alias = "groups")]
    pub groups: Vec<TableGroup>,
}

impl TabulationPlan {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableGroup {
    #[serde(default = "default_group_name")]
    pub name: String,
    #[serde(default)]
    pub tables: Vec<TableSpec>,
}

fn default_group_name() -> String {
    "Tabulado".to_string()
}

/// One table request. Written in TOML as `{ freq = "var" }`,
/// `{ crosstab = { row = "a", col = "b" } }` or `{ summary = { var = "x" } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableSpec {
    Freq(String),
    Crosstab(CrosstabSpec),
    Summary(SummarySpec),
}

impl TableSpec {
    /// Variables the table reads.
    pub fn variables(&self) -> Vec<&str> {
        match self {
            Self::Freq(var) => vec![var.as_str()],
            Self::Crosstab(spec) => vec![spec.row.as_str(), spec.col.as_str()],
            Self::Summary(spec) => vec![spec.var.as_str()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrosstabSpec {
    pub row: String,
    pub col: String,
    #[serde(default)]
    pub weight: Option<String>,
    #[serde(default)]
    pub normalize: Normalize,
    #[serde(default)]
    pub binned: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummarySpec {
    pub var: String,
    #[serde(default)]
    pub weight: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_specs_deserialize_from_json() {
        let plan: TabulationPlan = serde_json::from_str(
            r#"{"tabulados": [{"name": "Vivienda", "tables": [
                {"freq": "area"},
                {"crosstab": {"row": "area", "col": "sexo", "normalize": "columns"}},
                {"summary": {"var": "ingreso", "weight": "factor"}}
            ]}]}"#,
        )
        .expect("parse plan");
        let tables = &plan.groups[0].tables;
        assert_eq!(tables[0], TableSpec::Freq("area".to_string()));
        match &tables[1] {
            TableSpec::Crosstab(spec) => {
                assert_eq!(spec.normalize, Normalize::Columns);
                assert!(!spec.binned);
                assert_eq!(spec.weight, None);
            }
            other => panic!("unexpected table {other:?}"),
        }
        assert_eq!(tables[2].variables(), vec!["ingreso"]);
    }

    #[test]
    fn group_name_defaults() {
        let plan: TabulationPlan =
            serde_json::from_str(r#"{"groups": [{"tables": []}]}"#).expect("parse plan");
        assert_eq!(plan.groups[0].name, "Tabulado");
    }
}
