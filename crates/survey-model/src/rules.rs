use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Named indicator definitions, as read from a rules file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRules {
    #[serde(default)]
    pub rules: BTreeMap<String, IndicatorRule>,
}

impl IndicatorRules {
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }
}

/// One indicator: the share of rows in `var` that satisfy a criterion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRule {
    #[serde(default)]
    pub var: Option<String>,
    #[serde(default)]
    pub label_regex_any: Option<Vec<String>>,
    #[serde(default)]
    pub threshold: Option<f64>,
}

/// The criterion a rule applies. A regex list takes precedence over a threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndicatorCriterion<'a> {
    LabelRegexAny(&'a [String]),
    Threshold(f64),
}

impl IndicatorRule {
    pub fn regex(var: impl Into<String>, patterns: &[&str]) -> Self {
        Self {
            var: Some(var.into()),
            label_regex_any: Some(patterns.iter().map(|p| (*p).to_string()).collect()),
            threshold: None,
        }
    }

    pub fn threshold(var: impl Into<String>, threshold: f64) -> Self {
        Self {
            var: Some(var.into()),
            label_regex_any: None,
            threshold: Some(threshold),
        }
    }

    pub fn criterion(&self) -> Option<IndicatorCriterion<'_>> {
        if let Some(patterns) = &self.label_regex_any {
            return Some(IndicatorCriterion::LabelRegexAny(patterns));
        }
        self.threshold.map(IndicatorCriterion::Threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regex_takes_precedence() {
        let rule = IndicatorRule {
            var: Some("agua".to_string()),
            label_regex_any: Some(vec!["cañería".to_string()]),
            threshold: Some(1.0),
        };
        assert!(matches!(
            rule.criterion(),
            Some(IndicatorCriterion::LabelRegexAny(_))
        ));
    }

    #[test]
    fn rule_without_criterion() {
        let rule = IndicatorRule {
            var: Some("agua".to_string()),
            ..IndicatorRule::default()
        };
        assert_eq!(rule.criterion(), None);
        assert_eq!(
            IndicatorRule::threshold("hacinamiento", 3.0).criterion(),
            Some(IndicatorCriterion::Threshold(3.0))
        );
    }
}
