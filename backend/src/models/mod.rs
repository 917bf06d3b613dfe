//! Domain models for outlook datasets.
//!
//! - [`Record`] - one year's indicator values, keyed by indicator name
//! - [`Dataset`] - the ordered records of one upload
//!
//! Both types can only be built from validated input (see
//! [`crate::validation::validate`]), so holding one means the schema
//! constraints hold.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::schema::{self, YEAR};

// =============================================================================
// Record
// =============================================================================

/// One year's complete set of indicator values.
///
/// Fields are stored in schema order, so serializing a record lists
/// indicators in canonical column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Rebuild `fields` in schema order.
    ///
    /// Callers must have checked the fields against the schema.
    pub(crate) fn from_checked(mut fields: Map<String, Value>) -> Self {
        let mut ordered = Map::with_capacity(fields.len());
        for name in schema::field_names() {
            if let Some(value) = fields.remove(name) {
                ordered.insert(name.to_string(), value);
            }
        }
        Self(ordered)
    }

    /// Value of an indicator.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Numeric value of an indicator.
    pub fn number(&self, name: &str) -> Option<f64> {
        self.0.get(name).and_then(Value::as_f64)
    }

    /// Text value of an indicator.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// The year label.
    pub fn year(&self) -> &str {
        self.text(YEAR).unwrap_or_default()
    }

    /// Fields in schema order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

// =============================================================================
// Dataset
// =============================================================================

/// The ordered records of one upload, one per year, in supplied order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Dataset(Vec<Record>);

impl Dataset {
    pub(crate) fn from_records(records: Vec<Record>) -> Self {
        Self(records)
    }

    pub fn records(&self) -> &[Record] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Year labels in dataset order.
    pub fn years(&self) -> Vec<&str> {
        self.0.iter().map(Record::year).collect()
    }

    /// Pretty-printed JSON array, the `outlook.json` format.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_reorders_to_schema() {
        let mut fields = Map::new();
        fields.insert("Yield (t/ha)".into(), json!(6.1));
        fields.insert("year".into(), json!("2023/24"));
        fields.insert("Area (1000 ha)".into(), json!(2100.0));

        let record = Record::from_checked(fields);
        let names: Vec<_> = record.fields().map(|(k, _)| k).collect();

        assert_eq!(names, vec!["year", "Area (1000 ha)", "Yield (t/ha)"]);
        assert_eq!(record.year(), "2023/24");
        assert_eq!(record.number("Yield (t/ha)"), Some(6.1));
    }

    #[test]
    fn test_dataset_serializes_as_array() {
        let mut fields = Map::new();
        fields.insert("year".into(), json!("2022/23"));
        let dataset = Dataset::from_records(vec![Record::from_checked(fields)]);

        let json = dataset.to_json_pretty().unwrap();
        let parsed: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, json!([{ "year": "2022/23" }]));
        assert_eq!(dataset.years(), vec!["2022/23"]);
    }
}
