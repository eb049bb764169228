use crate::utils::error::{EtlError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;

/// A single JSON object flowing through the pipeline. Keys are kept sorted
/// so serialized output is stable between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub data: Map<String, Value>,
}

impl Record {
    pub fn new(data: Map<String, Value>) -> Self {
        Self { data }
    }

    /// Wraps a parsed JSON document; anything other than an object is rejected.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(data) => Ok(Self { data }),
            other => Err(EtlError::input(format!(
                "expected a JSON object, found {}",
                json_type_name(&other)
            ))),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    pub fn name(&self) -> Option<&str> {
        self.get("name").and_then(Value::as_str)
    }

    pub fn value(&self) -> Option<&Number> {
        match self.get("value") {
            Some(Value::Number(n)) => Some(n),
            _ => None,
        }
    }
}

pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "text",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub violations: Vec<Violation>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.violations.push(Violation {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn descriptions(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Failure,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Success => f.write_str("success"),
            Status::Failure => f.write_str("failure"),
        }
    }
}

/// Terminal summary of one run.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingResult {
    pub source: String,
    pub original: Record,
    pub processed_value: Option<Number>,
    pub multiplier: Number,
    pub status: Status,
    pub error: Option<String>,
    pub violations: Vec<String>,
    pub processed_at: DateTime<Utc>,
}

impl ProcessingResult {
    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_from_object() {
        let record = Record::from_value(json!({"name": "Test Data", "value": 10})).unwrap();
        assert_eq!(record.name(), Some("Test Data"));
        assert_eq!(record.value().and_then(Number::as_i64), Some(10));
    }

    #[test]
    fn test_record_rejects_non_object() {
        let err = Record::from_value(json!([1, 2, 3])).unwrap_err();
        assert!(err.is_input_error());
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn test_record_serializes_with_sorted_keys() {
        let record =
            Record::from_value(json!({"value": 1, "name": "x", "completed": false})).unwrap();
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"completed":false,"name":"x","value":1}"#
        );
    }

    #[test]
    fn test_validation_result_descriptions_keep_order() {
        let mut result = ValidationResult::default();
        result.push("name", "missing required field");
        result.push("value", "missing required field");

        assert!(!result.is_valid());
        assert_eq!(
            result.descriptions(),
            vec![
                "name: missing required field".to_string(),
                "value: missing required field".to_string()
            ]
        );
    }
}
