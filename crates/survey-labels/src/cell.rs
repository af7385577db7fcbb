use polars::prelude::AnyValue;
use survey_model::CellValue;

/// Converts a frame cell into the model's scalar type.
pub fn any_to_cell(value: &AnyValue<'_>) -> CellValue {
    match value {
        AnyValue::Null => CellValue::Missing,
        AnyValue::Int8(v) => CellValue::Integer(i64::from(*v)),
        AnyValue::Int16(v) => CellValue::Integer(i64::from(*v)),
        AnyValue::Int32(v) => CellValue::Integer(i64::from(*v)),
        AnyValue::Int64(v) => CellValue::Integer(*v),
        AnyValue::UInt8(v) => CellValue::Integer(i64::from(*v)),
        AnyValue::UInt16(v) => CellValue::Integer(i64::from(*v)),
        AnyValue::UInt32(v) => CellValue::Integer(i64::from(*v)),
        AnyValue::UInt64(v) => match i64::try_from(*v) {
            Ok(v) => CellValue::Integer(v),
            Err(_) => CellValue::Float(*v as f64),
        },
        AnyValue::Float32(v) => CellValue::from(f64::from(*v)),
        AnyValue::Float64(v) => CellValue::from(*v),
        AnyValue::String(s) => CellValue::from_text(s),
        AnyValue::StringOwned(s) => CellValue::from_text(s),
        AnyValue::Boolean(b) => CellValue::Text(b.to_string()),
        other => CellValue::from_text(&other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_text_cells() {
        assert_eq!(any_to_cell(&AnyValue::Int32(3)), CellValue::Integer(3));
        assert_eq!(any_to_cell(&AnyValue::Float64(3.5)), CellValue::Float(3.5));
        assert_eq!(any_to_cell(&AnyValue::Float64(f64::NAN)), CellValue::Missing);
        assert_eq!(
            any_to_cell(&AnyValue::String(" Alta ")),
            CellValue::Text("Alta".to_string())
        );
        assert_eq!(any_to_cell(&AnyValue::String("")), CellValue::Missing);
        assert_eq!(any_to_cell(&AnyValue::Null), CellValue::Missing);
    }
}
