//! Output records.
//!
//! The host expects one flat sequence of JSON records per execution.

use serde_json::{Value, json};

use crate::{error::BridgeError, resource::Resource};

/// Flattens an API response into records.
///
/// An array contributes one record per element (none if empty); any other
/// value, `null` included, is a single record. `null` is emitted as `{}` so
/// every record is an object.
///
/// # Examples
///
/// ```
/// use guru_dm_bridge::output::flatten_response;
/// use serde_json::json;
///
/// assert_eq!(flatten_response(json!([{"id": 1}, {"id": 2}])).len(), 2);
/// assert_eq!(flatten_response(json!({"id": 1})), vec![json!({"id": 1})]);
/// ```
#[must_use]
pub fn flatten_response(body: Value) -> Vec<Value> {
    match body {
        Value::Array(elements) => elements,
        Value::Null => vec![Value::Object(serde_json::Map::new())],
        other => vec![other],
    }
}

/// Acknowledgment emitted for a successful delete, whatever the server sent.
#[must_use]
pub fn delete_acknowledgment(resource: Resource) -> Value {
    json!({
        "success": true,
        "message": format!("{} deleted successfully", resource.display_name()),
    })
}

/// Record emitted in place of a failed item when failures are tolerated.
#[must_use]
pub fn error_record(error: &BridgeError) -> Value {
    json!({ "error": error.to_string() })
}
