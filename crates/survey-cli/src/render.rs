//! Terminal rendering of tables, metrics and indicators.

use std::collections::BTreeMap;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use survey_core::{DashboardReport, FilterOptions, HeadlineMetrics, TableResult};
use survey_model::{CrossTab, FrequencyTable, LabelMaps, Normalize, NumericSummary};

/// Two decimals; `-` for values that are not numbers.
pub fn format_percent(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.2}")
    } else {
        "-".to_string()
    }
}

/// Counts print as integers; weighted sums keep two decimals.
pub fn format_amount(value: f64, weighted: bool) -> String {
    if !value.is_finite() {
        "-".to_string()
    } else if weighted {
        format!("{value:.2}")
    } else {
        format_thousands(value.round() as u64)
    }
}

pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn metrics_line(metrics: &HeadlineMetrics, key_label: Option<&str>) -> String {
    let weight = metrics
        .weight_sum
        .map_or_else(|| "-".to_string(), |sum| format!("{sum:.2}"));
    let groups = metrics
        .groups
        .map_or_else(|| "-".to_string(), |n| format_thousands(n as u64));
    format!(
        "Records (n): {} | Weight sum: {} | #{}: {}",
        format_thousands(metrics.records as u64),
        weight,
        key_label.unwrap_or("Groups"),
        groups
    )
}

pub fn indicator_lines(indicators: &BTreeMap<String, Option<f64>>) -> String {
    indicators
        .iter()
        .map(|(name, value)| {
            let value = value.map_or_else(|| "n/a".to_string(), |v| format!("{}%", format_percent(v)));
            format!("{name}: {value}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn frequency_table(table: &FrequencyTable) -> Table {
    let mut out = Table::new();
    let amount = if table.weighted { "Weighted n" } else { "n" };
    out.set_header(vec![
        header_cell(&table.variable),
        header_cell(amount),
        header_cell("%"),
    ]);
    apply_table_style(&mut out);
    align_column(&mut out, 1, CellAlignment::Right);
    align_column(&mut out, 2, CellAlignment::Right);
    for row in &table.rows {
        out.add_row(vec![
            Cell::new(&row.value),
            Cell::new(format_amount(row.n, table.weighted)),
            Cell::new(format_percent(row.percent)),
        ]);
    }
    if table.is_empty() {
        out.add_row(vec![dim_cell("(no data)"), dim_cell("-"), dim_cell("-")]);
    }
    out
}

pub fn crosstab_table(table: &CrossTab) -> Table {
    let mut out = Table::new();
    let mut header = vec![header_cell(&format!(
        "{} \\ {}",
        table.row_variable, table.col_variable
    ))];
    header.extend(table.col_labels.iter().map(|label| header_cell(label)));
    out.set_header(header);
    apply_table_style(&mut out);
    for idx in 1..=table.col_labels.len() {
        align_column(&mut out, idx, CellAlignment::Right);
    }
    let format_cell = |value: f64| match table.normalize {
        Normalize::None => format_amount(value, table.weighted),
        Normalize::Index | Normalize::Columns => format_percent(value),
    };
    for (label, cells) in table.row_labels.iter().zip(&table.cells) {
        let mut row = vec![Cell::new(label).add_attribute(Attribute::Bold)];
        row.extend(cells.iter().map(|value| Cell::new(format_cell(*value))));
        out.add_row(row);
    }
    if table.is_empty() {
        out.add_row(vec![dim_cell("(no data)")]);
    }
    out
}

pub fn summary_table(summary: &NumericSummary) -> Table {
    let mut out = Table::new();
    out.set_header(vec![header_cell("Statistic"), header_cell(&summary.variable)]);
    apply_table_style(&mut out);
    align_column(&mut out, 1, CellAlignment::Right);
    out.add_row(vec![
        Cell::new("n"),
        Cell::new(format_thousands(summary.count as u64)),
    ]);
    for (name, value) in summary.statistics() {
        out.add_row(vec![Cell::new(name), Cell::new(format_statistic(value))]);
    }
    out
}

fn format_statistic(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.3}")
    } else {
        "-".to_string()
    }
}

pub fn codebook_table(labels: &LabelMaps) -> Table {
    let mut out = Table::new();
    out.set_header(vec![
        header_cell("Variable"),
        header_cell("Label"),
        header_cell("Value labels"),
    ]);
    apply_wide_table_style(&mut out);
    align_column(&mut out, 2, CellAlignment::Right);
    let mut variables: Vec<&String> = labels
        .variable_labels
        .keys()
        .chain(labels.value_labels.keys())
        .collect();
    variables.sort();
    variables.dedup();
    for variable in variables {
        let count = labels.value_map(variable).map_or(0, |map| map.len());
        let label = labels
            .variable_labels
            .get(variable.as_str())
            .map_or_else(|| dim_cell("-"), Cell::new);
        out.add_row(vec![
            Cell::new(variable).fg(Color::Blue),
            label,
            if count > 0 { Cell::new(count) } else { dim_cell(0) },
        ]);
    }
    out
}

pub fn filters_table(options: &FilterOptions) -> Table {
    let mut out = Table::new();
    out.set_header(vec![
        header_cell("Filter"),
        header_cell("Column"),
        header_cell("Values"),
    ]);
    apply_wide_table_style(&mut out);
    if let (Some(column), Some(label)) = (&options.key_column, &options.key_label) {
        out.add_row(vec![
            Cell::new(label).add_attribute(Attribute::Bold),
            Cell::new(column).fg(Color::Blue),
            Cell::new(options.key_values.join(", ")),
        ]);
    }
    for filter in &options.secondary {
        out.add_row(vec![
            Cell::new(&filter.label),
            Cell::new(&filter.column).fg(Color::Blue),
            Cell::new(filter.values.join(", ")),
        ]);
    }
    out
}

pub fn print_table_result(title: &str, result: &TableResult) {
    println!();
    println!("{title}");
    let table = match result {
        TableResult::Frequency(table) => frequency_table(table),
        TableResult::Crosstab(table) => crosstab_table(table),
        TableResult::Summary(summary) => summary_table(summary),
    };
    println!("{table}");
}

pub fn print_dashboard(report: &DashboardReport) {
    println!("{}", metrics_line(&report.metrics, report.key_label.as_deref()));
    for section in &report.sections {
        println!();
        println!("== {} ==", section.name);
        if section.tables.is_empty() {
            println!("(no tables for the current view)");
        }
        for table in &section.tables {
            print_table_result(&table.title, &table.result);
        }
    }
    if !report.indicators.is_empty() {
        println!();
        println!("Indicators");
        println!("{}", indicator_lines(&report.indicators));
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_wide_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(160);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_separators() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1_000), "1,000");
        assert_eq!(format_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn amounts_and_percentages() {
        assert_eq!(format_amount(3.0, false), "3");
        assert_eq!(format_amount(2.5, true), "2.50");
        assert_eq!(format_percent(66.666), "66.67");
        assert_eq!(format_percent(f64::NAN), "-");
    }
}
