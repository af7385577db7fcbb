use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Right-closed numeric bins: value `v` falls in bin `i` when
/// `edges[i] < v <= edges[i + 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinSpec {
    edges: Vec<f64>,
    labels: Vec<String>,
}

impl BinSpec {
    pub fn new(edges: Vec<f64>, labels: Vec<String>) -> Result<Self> {
        if edges.len() < 2 {
            return Err(ModelError::InvalidBins {
                reason: "at least two edges are required".to_string(),
            });
        }
        if labels.len() != edges.len() - 1 {
            return Err(ModelError::InvalidBins {
                reason: format!(
                    "{} edges need {} labels, got {}",
                    edges.len(),
                    edges.len() - 1,
                    labels.len()
                ),
            });
        }
        if edges.iter().any(|edge| edge.is_nan()) {
            return Err(ModelError::InvalidBins {
                reason: "edges must not be NaN".to_string(),
            });
        }
        if edges.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(ModelError::InvalidBins {
                reason: "edges must be strictly increasing".to_string(),
            });
        }
        Ok(Self { edges, labels })
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Index of the bin containing `value`, or `None` outside every bin.
    pub fn bucket(&self, value: f64) -> Option<usize> {
        if value.is_nan() {
            return None;
        }
        self.edges
            .windows(2)
            .position(|pair| pair[0] < value && value <= pair[1])
    }

    pub fn label_for(&self, value: f64) -> Option<&str> {
        self.bucket(value).map(|index| self.labels[index].as_str())
    }

    /// Position of a label in bin order.
    pub fn label_rank(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|candidate| candidate == label)
    }
}

impl Default for BinSpec {
    fn default() -> Self {
        Self {
            edges: vec![f64::NEG_INFINITY, 0.0, 1.0, 5.0, 10.0, f64::INFINITY],
            labels: ["0", "1", "2-5", "6-10", "10+"]
                .iter()
                .map(|label| (*label).to_string())
                .collect(),
        }
    }
}
