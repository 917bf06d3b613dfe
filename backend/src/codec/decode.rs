//! CSV text to raw JSON records.
//!
//! Uploads arrive column-major: one indicator per line, one column per year,
//! with a meaningless top-left cell.
//!
//! ```text
//! ,2022/23,2023/24
//! Area (1000 ha),2 135.4,2 098.1
//! Yield (t/ha),6.2,5.9
//! ```
//!
//! The matrix is transposed so each year becomes a row, the top-left cell is
//! renamed `year`, and each row is zipped positionally with the header row.
//! Text already in the persisted row-major layout (header row of indicator
//! names) is used without transposing.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Number, Value};

use crate::error::{CodecError, CodecResult};
use crate::schema::{self, ValueKind, YEAR};

/// Optional minus, then only digits, spaces, commas and periods.
static NUMERIC_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?[0-9 ,.]+$").expect("numeric token pattern is valid"));

/// Decode CSV text into a JSON array of records.
///
/// The result is not validated: records may be incomplete or mistyped.
/// An input with no data yields an empty array.
///
/// # Example
/// ```rust
/// use outlook::decode_csv;
///
/// let records = decode_csv(",2022/23,2023/24\nYield (t/ha),6.2,5.9").unwrap();
///
/// assert_eq!(records[0]["year"], "2022/23");
/// assert_eq!(records[1]["Yield (t/ha)"], 5.9);
/// ```
pub fn decode_csv(text: &str) -> CodecResult<Value> {
    let matrix = read_matrix(text)?;

    let rows = if is_row_major(&matrix) {
        matrix
    } else {
        transpose(matrix)
    };

    let mut rows = rows.into_iter();
    let Some(mut header) = rows.next().filter(|header| !header.is_empty()) else {
        return Ok(Value::Array(Vec::new()));
    };
    header[0] = YEAR.to_string();
    let names: Vec<&str> = header.iter().map(|name| name.trim()).collect();

    let records = rows
        .map(|row| {
            let fields: Map<String, Value> = names
                .iter()
                .zip(&row)
                .map(|(name, token)| (name.to_string(), coerce_cell(name, token)))
                .collect();
            Value::Object(fields)
        })
        .collect();

    Ok(Value::Array(records))
}

/// Coerce a token that looks like a number into a JSON number.
///
/// Spaces and comma grouping separators inside the number are dropped, so
/// `"1 234.5"` and `"1,234.5"` both become `1234.5`. Anything else, including
/// tokens that match the shape but do not parse (`"1.2.3"`), stays text.
///
/// # Example
/// ```rust
/// use outlook::codec::coerce_token;
/// use serde_json::json;
///
/// assert_eq!(coerce_token(" 1 234.5 "), json!(1234.5));
/// assert_eq!(coerce_token("N/A"), json!("N/A"));
/// ```
pub fn coerce_token(token: &str) -> Value {
    let trimmed = token.trim();

    if NUMERIC_TOKEN.is_match(trimmed) {
        let compact: String = trimmed.chars().filter(|c| *c != ' ' && *c != ',').collect();
        if let Some(number) = compact.parse::<f64>().ok().and_then(Number::from_f64) {
            return Value::Number(number);
        }
    }

    Value::String(trimmed.to_string())
}

/// Coerce a cell using the declared kind of its column when there is one.
///
/// Text indicators keep their token verbatim, so a year label such as
/// `2021` is not turned into a number.
fn coerce_cell(column: &str, token: &str) -> Value {
    match schema::kind_of(column) {
        Some(ValueKind::Text) => Value::String(token.trim().to_string()),
        _ => coerce_token(token),
    }
}

/// Read non-blank lines into a rectangular matrix of raw tokens.
fn read_matrix(text: &str) -> CodecResult<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut matrix: Vec<Vec<String>> = Vec::new();

    for result in reader.records() {
        let record = result?;

        if record.len() == 1 && record[0].trim().is_empty() {
            continue;
        }

        if let Some(first) = matrix.first() {
            if record.len() != first.len() {
                let line = record
                    .position()
                    .map_or(matrix.len() + 1, |pos| pos.line() as usize);
                return Err(CodecError::RaggedRow {
                    line,
                    expected: first.len(),
                    found: record.len(),
                });
            }
        }

        matrix.push(record.iter().map(str::to_string).collect());
    }

    Ok(matrix)
}

/// True when the first line is a header of indicator names.
fn is_row_major(matrix: &[Vec<String>]) -> bool {
    match matrix.first() {
        Some(first) if first.len() > 1 => {
            first[1..].iter().all(|token| schema::is_indicator(token.trim()))
        }
        _ => false,
    }
}

fn transpose(matrix: Vec<Vec<String>>) -> Vec<Vec<String>> {
    let width = matrix.first().map_or(0, Vec::len);
    let mut columns: Vec<Vec<String>> = (0..width)
        .map(|_| Vec::with_capacity(matrix.len()))
        .collect();

    for row in matrix {
        for (column, cell) in columns.iter_mut().zip(row) {
            column.push(cell);
        }
    }

    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const UPLOAD: &str = include_str!("../../fixtures/outlook_upload.csv");

    #[test]
    fn test_coerce_spaced_number() {
        assert_eq!(coerce_token("1 234.5"), json!(1234.5));
        assert_eq!(coerce_token("-291.7"), json!(-291.7));
        assert_eq!(coerce_token("1,234.5"), json!(1234.5));
    }

    #[test]
    fn test_coerce_keeps_text() {
        assert_eq!(coerce_token("N/A"), json!("N/A"));
        assert_eq!(coerce_token("2022/23"), json!("2022/23"));
        assert_eq!(coerce_token("1.2.3"), json!("1.2.3"));
        assert_eq!(coerce_token("-"), json!("-"));
        assert_eq!(coerce_token("  "), json!(""));
    }

    #[test]
    fn test_decode_column_major_upload() {
        let records = decode_csv(UPLOAD).unwrap();
        let records = records.as_array().unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0]["year"], "2022/23");
        assert_eq!(records[2]["year"], "2024/25");
        assert_eq!(records[0]["Area (1000 ha)"], json!(2135.4));
        assert_eq!(records[1]["Stock change (1000 t)"], json!(-291.7));
        assert_eq!(records[0].as_object().unwrap().len(), 20);
    }

    #[test]
    fn test_decode_zips_by_position() {
        let records = decode_csv("x,2020,2021\nColour,red,blue\n").unwrap();

        assert_eq!(records[0]["year"], "2020");
        assert_eq!(records[0]["Colour"], "red");
        assert_eq!(records[1]["Colour"], "blue");
    }

    #[test]
    fn test_decode_year_column_stays_text() {
        let records = decode_csv(",2021,2022\nYield (t/ha),6.0,5.5").unwrap();
        assert_eq!(records[0]["year"], json!("2021"));
        assert_eq!(records[1]["Yield (t/ha)"], json!(5.5));
    }

    #[test]
    fn test_decode_row_major_header() {
        let text = "year,Area (1000 ha),Yield (t/ha)\n2022/23,2135.4,6.2\n2023/24,2098.1,5.9";
        let records = decode_csv(text).unwrap();

        assert_eq!(records.as_array().unwrap().len(), 2);
        assert_eq!(records[1]["year"], "2023/24");
        assert_eq!(records[1]["Yield (t/ha)"], json!(5.9));
    }

    #[test]
    fn test_blank_lines_dropped() {
        let records = decode_csv("\n,2022/23\n   \n\nYield (t/ha),6.2\n\n").unwrap();
        assert_eq!(records, json!([{ "year": "2022/23", "Yield (t/ha)": 6.2 }]));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(decode_csv("").unwrap(), json!([]));
        assert_eq!(decode_csv("\n  \n").unwrap(), json!([]));
    }

    #[test]
    fn test_single_column_has_no_records() {
        // One column transposes into a lone header row.
        assert_eq!(decode_csv("\nYield (t/ha)\nArea (1000 ha)").unwrap(), json!([]));
    }

    #[test]
    fn test_ragged_row_rejected() {
        let err = decode_csv(",2022/23,2023/24\nYield (t/ha),6.2\n").unwrap_err();
        match err {
            CodecError::RaggedRow { line, expected, found } => {
                assert_eq!(line, 2);
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_quoted_values() {
        let records = decode_csv(",2022/23\nArea (1000 ha),\"2,135.4\"").unwrap();
        assert_eq!(records[0]["Area (1000 ha)"], json!(2135.4));
    }
}
