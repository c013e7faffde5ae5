use crate::error::ValidationError;

use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Narrows a generic parameter map to the string map the template API takes.
///
/// Keys and their order are kept as-is. Any non-string value is a
/// [`ValidationError::TypeMismatch`] for that key.
pub fn encode_parameters(raw: &Map<String, Value>) -> Result<IndexMap<String, String>, ValidationError> {
    raw.iter()
        .map(|(key, value)| match value {
            Value::String(s) => Ok((key.clone(), s.clone())),
            other => Err(ValidationError::TypeMismatch {
                key: key.clone(),
                expected: "string",
                found: json_type_name(other),
            }),
        })
        .collect()
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
