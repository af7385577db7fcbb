use std::cmp::Ordering;

use survey_common::parse_f64;

/// Sorts labels numerically when every label is a number, otherwise as text.
pub fn sort_labels(labels: &mut [String]) {
    if labels.iter().all(|label| parse_f64(label).is_some()) {
        labels.sort_by(|a, b| compare_numeric(a, b));
    } else {
        labels.sort();
    }
}

fn compare_numeric(a: &str, b: &str) -> Ordering {
    match (parse_f64(a), parse_f64(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        _ => a.cmp(b),
    }
}
