//! Dataset to canonical CSV text.
//!
//! One header row of indicator names in schema order, then one row per
//! record. Numbers are written with exactly one decimal, text as-is. Values
//! containing a separator, quote or newline are quoted.

use serde_json::Value;

use super::decode::coerce_token;
use crate::error::CodecResult;
use crate::models::{Dataset, Record};
use crate::schema::{self, Indicator, ValueKind};

/// Render a dataset as CSV. Rows are joined with `\n`, without a trailing
/// newline.
///
/// One-decimal rounding is lossy: `6.14` is written as `6.1`.
pub fn encode_csv(dataset: &Dataset) -> CodecResult<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(schema::field_names())?;

    for record in dataset {
        writer.write_record(schema::indicators().iter().map(|i| render_cell(i, record)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;

    let mut text = String::from_utf8(bytes)?;
    if text.ends_with('\n') {
        text.pop();
    }

    Ok(text)
}

/// Fixed-point rendering with exactly one digit after the decimal point.
///
/// Rounding works on the exact binary value and breaks exact ties to even,
/// so `6.25` is written as `6.2` and `6.75` as `6.8`. Values such as `6.35`
/// are not ties (the stored double is slightly below) and round down.
///
/// # Example
/// ```rust
/// use outlook::codec::format_number;
///
/// assert_eq!(format_number(2135.44), "2135.4");
/// assert_eq!(format_number(7.0), "7.0");
/// assert_eq!(format_number(-0.96), "-1.0");
/// ```
pub fn format_number(value: f64) -> String {
    format!("{:.1}", value)
}

fn render_cell(indicator: &Indicator, record: &Record) -> String {
    let value = record.get(indicator.name);

    match (indicator.kind, value) {
        (_, None) => String::new(),
        (ValueKind::Number, Some(value)) => match numeric_value(value) {
            Some(n) => format_number(n),
            None => render_text(value),
        },
        (_, Some(value)) => render_text(value),
    }
}

/// Numeric reading of a stored value, coercing number-shaped text.
fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => coerce_token(s).as_f64(),
        _ => None,
    }
}

fn render_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode_csv;
    use crate::validation::{sample_record, validate};
    use serde_json::json;

    fn dataset(records: Value) -> Dataset {
        validate(&records).unwrap()
    }

    #[test]
    fn test_header_and_rows() {
        let data = dataset(json!([
            sample_record("2022/23", 100.0),
            sample_record("2023/24", 200.0)
        ]));
        let csv = encode_csv(&data).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("year,Area (1000 ha),Yield (t/ha),"));
        assert!(lines[1].starts_with("2022/23,101.0,102.0,"));
        assert!(lines[2].ends_with(",219.0"));
        assert!(!csv.ends_with('\n'));
    }

    #[test]
    fn test_numbers_have_one_decimal() {
        let mut record = sample_record("2023/24", 0.0);
        record["Yield (t/ha)"] = json!(6.14);
        record["Area (1000 ha)"] = json!(2098);

        let csv = encode_csv(&dataset(json!([record]))).unwrap();
        let row = csv.lines().nth(1).unwrap();

        assert!(row.starts_with("2023/24,2098.0,6.1,"));
    }

    #[test]
    fn test_exact_ties_round_to_even() {
        assert_eq!(format_number(6.25), "6.2");
        assert_eq!(format_number(6.75), "6.8");
        assert_eq!(format_number(-0.25), "-0.2");
        assert_eq!(format_number(6.35), "6.3");
    }

    #[test]
    fn test_text_with_comma_is_quoted() {
        let record = sample_record("2023/24, forecast", 0.0);
        let csv = encode_csv(&dataset(json!([record]))).unwrap();

        assert!(csv.lines().nth(1).unwrap().starts_with("\"2023/24, forecast\",1.0,"));
    }

    #[test]
    fn test_round_trip_through_decode() {
        let mut first = sample_record("2022/23", 10.0);
        first["Yield (t/ha)"] = json!(6.14);
        let original = dataset(json!([first, sample_record("2021", 20.0)]));

        let decoded = decode_csv(&encode_csv(&original).unwrap()).unwrap();
        let restored = validate(&decoded).unwrap();

        assert_eq!(restored.len(), 2);
        assert_eq!(restored.years(), vec!["2022/23", "2021"]);
        // One-decimal rounding is the only loss.
        assert_eq!(restored.records()[0].number("Yield (t/ha)"), Some(6.1));
        assert_eq!(restored.records()[1], original.records()[1]);
    }
}
