//! Indicator schema for outlook datasets.
//!
//! The schema is a fixed, ordered list of indicators. Its order is the
//! canonical CSV column order and its name set is the exact field set every
//! record must carry. Changing it is a code change, not a runtime operation.
//!
//! # Example
//!
//! ```rust
//! use outlook::schema::{self, ValueKind};
//!
//! assert_eq!(schema::field_count(), 20);
//! assert_eq!(schema::kind_of("year"), Some(ValueKind::Text));
//! assert_eq!(schema::kind_of("Yield (t/ha)"), Some(ValueKind::Number));
//! assert_eq!(schema::kind_of("Colour"), None);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Name of the indicator that labels each record.
pub const YEAR: &str = "year";

/// Kind of a value, as declared by the schema or observed in JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Text,
    Number,
    Boolean,
    Null,
    Array,
    Object,
}

impl ValueKind {
    /// Classify a JSON value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::String(_) => Self::Text,
            Value::Number(_) => Self::Number,
            Value::Bool(_) => Self::Boolean,
            Value::Null => Self::Null,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Null => "null",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One schema entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indicator {
    pub name: &'static str,
    pub kind: ValueKind,
}

const fn text(name: &'static str) -> Indicator {
    Indicator { name, kind: ValueKind::Text }
}

const fn number(name: &'static str) -> Indicator {
    Indicator { name, kind: ValueKind::Number }
}

/// The indicator schema, in canonical column order.
pub const INDICATORS: [Indicator; 20] = [
    text(YEAR),
    number("Area (1000 ha)"),
    number("Yield (t/ha)"),
    number("Production (1000 t)"),
    number("Beginning stocks (1000 t)"),
    number("Imports (1000 t)"),
    number("Total supply (1000 t)"),
    number("Exports (1000 t)"),
    number("Domestic use (1000 t)"),
    number("Food use (1000 t)"),
    number("Feed use (1000 t)"),
    number("Industrial use (1000 t)"),
    number("Seed use (1000 t)"),
    number("Losses (1000 t)"),
    number("Ending stocks (1000 t)"),
    number("Stock change (1000 t)"),
    number("Stocks-to-use ratio (%)"),
    number("Self-sufficiency (%)"),
    number("Producer price (EUR/t)"),
    number("World price (USD/t)"),
];

/// All indicators in canonical order.
pub fn indicators() -> &'static [Indicator] {
    &INDICATORS
}

/// Indicator names in canonical order.
pub fn field_names() -> impl Iterator<Item = &'static str> {
    INDICATORS.iter().map(|i| i.name)
}

/// Number of fields a complete record carries.
pub fn field_count() -> usize {
    INDICATORS.len()
}

/// Declared kind of an indicator, `None` if the name is not in the schema.
pub fn kind_of(name: &str) -> Option<ValueKind> {
    INDICATORS.iter().find(|i| i.name == name).map(|i| i.kind)
}

pub fn is_indicator(name: &str) -> bool {
    kind_of(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_year_is_first_and_text() {
        assert_eq!(INDICATORS[0].name, "year");
        assert_eq!(INDICATORS[0].kind, ValueKind::Text);
        assert!(INDICATORS[1..].iter().all(|i| i.kind == ValueKind::Number));
    }

    #[test]
    fn test_names_are_unique_and_comma_free() {
        let names: Vec<_> = field_names().collect();
        for (i, name) in names.iter().enumerate() {
            assert!(!name.contains(','), "{name} contains a comma");
            assert!(!names[i + 1..].contains(name), "{name} is duplicated");
        }
    }

    #[test]
    fn test_value_kind_of() {
        assert_eq!(ValueKind::of(&json!("2021/22")), ValueKind::Text);
        assert_eq!(ValueKind::of(&json!(3.5)), ValueKind::Number);
        assert_eq!(ValueKind::of(&json!(true)), ValueKind::Boolean);
        assert_eq!(ValueKind::of(&json!(null)), ValueKind::Null);
        assert_eq!(ValueKind::of(&json!([])), ValueKind::Array);
        assert_eq!(ValueKind::of(&json!({})), ValueKind::Object);
    }
}
