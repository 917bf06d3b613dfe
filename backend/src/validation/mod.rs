//! Schema validation for outlook datasets.
//!
//! A candidate is valid when it is a non-empty JSON array whose every element
//! is an object carrying exactly the indicators of [`crate::schema`], each
//! value of the declared kind.
//!
//! Checks run in a fixed order so the first error reported is predictable:
//!
//! 1. the candidate is an array, and not empty
//! 2. per record, in order: it is an object; then per key, the key is an
//!    indicator and its value has the declared kind; then the key count
//!    matches the schema
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use outlook::validation::validate;
//! use outlook::ValidationError;
//!
//! assert_eq!(validate(&json!([])), Err(ValidationError::EmptySequence));
//! assert!(validate(&json!([{ "year": 2024 }])).is_err());
//! ```

use serde_json::{Map, Value};

use crate::error::{ValidationError, ValidationResult};
use crate::models::{Dataset, Record};
use crate::schema::{self, ValueKind};

/// Validate a candidate and return it as a [`Dataset`].
pub fn validate(candidate: &Value) -> ValidationResult<Dataset> {
    let elements = checked_elements(candidate)?;
    let records = elements
        .iter()
        .filter_map(Value::as_object)
        .map(|fields| Record::from_checked(fields.clone()))
        .collect();

    Ok(Dataset::from_records(records))
}

/// Validate an owned candidate without copying its values.
pub fn validate_owned(candidate: Value) -> ValidationResult<Dataset> {
    check(&candidate)?;

    let records = match candidate {
        Value::Array(elements) => elements
            .into_iter()
            .filter_map(|element| match element {
                Value::Object(fields) => Some(Record::from_checked(fields)),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };

    Ok(Dataset::from_records(records))
}

/// Run every check without building a dataset.
pub fn check(candidate: &Value) -> ValidationResult<()> {
    checked_elements(candidate).map(|_| ())
}

fn checked_elements(candidate: &Value) -> ValidationResult<&Vec<Value>> {
    let elements = candidate.as_array().ok_or(ValidationError::NotASequence {
        actual: ValueKind::of(candidate),
    })?;

    if elements.is_empty() {
        return Err(ValidationError::EmptySequence);
    }

    for (index, element) in elements.iter().enumerate() {
        let fields = as_record(index, element)?;
        check_fields(index, fields)?;
    }

    Ok(elements)
}

fn as_record(index: usize, element: &Value) -> ValidationResult<&Map<String, Value>> {
    element.as_object().ok_or(ValidationError::NotARecord {
        index,
        actual: ValueKind::of(element),
    })
}

fn check_fields(index: usize, fields: &Map<String, Value>) -> ValidationResult<()> {
    for (name, value) in fields {
        let expected = schema::kind_of(name).ok_or_else(|| ValidationError::UnknownField {
            index,
            name: name.clone(),
        })?;

        let actual = ValueKind::of(value);
        if actual != expected {
            return Err(ValidationError::TypeMismatch {
                index,
                name: name.clone(),
                expected,
                actual,
            });
        }
    }

    // With no unknown keys left, a short count means missing indicators.
    let expected = schema::field_count();
    if fields.len() != expected {
        return Err(ValidationError::FieldCountMismatch {
            index,
            expected,
            actual: fields.len(),
        });
    }

    Ok(())
}

/// Build a complete, well-typed record for tests.
#[cfg(test)]
pub(crate) fn sample_record(year: &str, base: f64) -> Value {
    let mut fields = Map::new();
    for (i, indicator) in schema::indicators().iter().enumerate() {
        let value = match indicator.kind {
            ValueKind::Text => Value::String(year.to_string()),
            _ => serde_json::json!(base + i as f64),
        };
        fields.insert(indicator.name.to_string(), value);
    }
    Value::Object(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn two_years() -> Value {
        json!([sample_record("2022/23", 100.0), sample_record("2023/24", 200.0)])
    }

    #[test]
    fn test_valid_dataset() {
        let dataset = validate(&two_years()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.years(), vec!["2022/23", "2023/24"]);
        assert_eq!(dataset.records()[1].number("Area (1000 ha)"), Some(201.0));
    }

    #[test]
    fn test_not_a_sequence() {
        let err = validate(&json!({ "year": "2023/24" })).unwrap_err();
        assert_eq!(err, ValidationError::NotASequence { actual: ValueKind::Object });
    }

    #[test]
    fn test_empty_sequence() {
        assert_eq!(validate(&json!([])).unwrap_err(), ValidationError::EmptySequence);
    }

    #[test]
    fn test_not_a_record() {
        let data = json!([sample_record("2022/23", 1.0), "2023/24"]);
        let err = validate(&data).unwrap_err();
        assert_eq!(err, ValidationError::NotARecord { index: 1, actual: ValueKind::Text });
    }

    #[test]
    fn test_unknown_field() {
        let mut record = sample_record("2023/24", 1.0);
        record["Rainfall (mm)"] = json!(640.0);

        let err = validate(&json!([record])).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownField { index: 0, name: "Rainfall (mm)".into() }
        );
    }

    #[test]
    fn test_missing_field() {
        let mut record = sample_record("2023/24", 1.0);
        record.as_object_mut().unwrap().remove("Losses (1000 t)");

        let err = validate(&json!([record])).unwrap_err();
        assert_eq!(
            err,
            ValidationError::FieldCountMismatch { index: 0, expected: 20, actual: 19 }
        );
    }

    #[test]
    fn test_numeric_year_rejected() {
        let mut record = sample_record("2023/24", 1.0);
        record["year"] = json!(2023);

        let err = validate(&json!([record])).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TypeMismatch {
                index: 0,
                name: "year".into(),
                expected: ValueKind::Text,
                actual: ValueKind::Number,
            }
        );
    }

    #[test]
    fn test_text_in_numeric_field_rejected() {
        let mut record = sample_record("2023/24", 1.0);
        record["Yield (t/ha)"] = json!("N/A");

        let err = validate(&json!([sample_record("2022/23", 1.0), record])).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::TypeMismatch { index: 1, ref name, .. } if name == "Yield (t/ha)"
        ));
    }

    #[test]
    fn test_validate_owned_matches_borrowed() {
        let data = two_years();
        assert_eq!(validate_owned(data.clone()).unwrap(), validate(&data).unwrap());
        assert!(check(&data).is_ok());
        assert!(check(&json!([{}])).is_err());
    }
}
