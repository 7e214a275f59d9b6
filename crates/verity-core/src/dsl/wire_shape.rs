// verity-core/src/dsl/wire_shape.rs
// ============================================================================
// Module: Shared DSL Wire Shape
// Description: The common `{type, params, children?}` envelope used by both
//              `Trigger` and `Expected`.
// Purpose: One encode/decode helper so the two trees don't duplicate it.
// Dependencies: serde_json, crate::error
// ============================================================================

use serde_json::Map;
use serde_json::Value;

use crate::error::WireError;

/// Builds the `{type, params, children?}` envelope.
pub(crate) fn build(ty: &str, params: Value, children: Option<Vec<Value>>) -> Value {
    let mut object = Map::new();
    object.insert("type".to_string(), Value::String(ty.to_string()));
    object.insert("params".to_string(), params);
    if let Some(children) = children {
        object.insert("children".to_string(), Value::Array(children));
    }
    Value::Object(object)
}

/// A parsed envelope: the `type` tag, the `params` object (defaulting to an
/// empty object if absent), and the raw `children` array if present.
pub(crate) struct Envelope<'a> {
    pub(crate) ty: &'a str,
    pub(crate) params: &'a Value,
    pub(crate) children: Option<&'a Vec<Value>>,
}

static EMPTY_PARAMS: Value = Value::Null;

/// Parses the common envelope shape, failing loudly if the
/// payload isn't an object or is missing its `type` tag.
pub(crate) fn parse<'a>(value: &'a Value, node: &'static str) -> Result<Envelope<'a>, WireError> {
    let object = value.as_object().ok_or_else(|| WireError::MalformedPayload {
        node,
        detail: "expected a JSON object".to_string(),
    })?;
    let ty = object
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| WireError::MalformedPayload {
            node,
            detail: "missing string \"type\" field".to_string(),
        })?;
    let params = object.get("params").unwrap_or(&EMPTY_PARAMS);
    let children = object.get("children").and_then(Value::as_array);
    Ok(Envelope { ty, params, children })
}

/// Extracts a required string field from a `params` object.
pub(crate) fn field_str<'a>(
    params: &'a Value,
    name: &str,
    node: &'static str,
) -> Result<&'a str, WireError> {
    params
        .as_object()
        .and_then(|object| object.get(name))
        .and_then(Value::as_str)
        .ok_or_else(|| WireError::MalformedPayload {
            node,
            detail: format!("missing string field \"{name}\""),
        })
}

/// Extracts an optional string field from a `params` object; `None` if
/// absent or explicitly `null`.
pub(crate) fn field_str_opt<'a>(params: &'a Value, name: &str) -> Option<&'a str> {
    params.as_object().and_then(|object| object.get(name)).and_then(Value::as_str)
}

/// Extracts a required `u64` field from a `params` object.
pub(crate) fn field_u64(params: &Value, name: &str, node: &'static str) -> Result<u64, WireError> {
    params
        .as_object()
        .and_then(|object| object.get(name))
        .and_then(Value::as_u64)
        .ok_or_else(|| WireError::MalformedPayload {
            node,
            detail: format!("missing integer field \"{name}\""),
        })
}

/// Extracts a required `i64` field from a `params` object.
pub(crate) fn field_i64(params: &Value, name: &str, node: &'static str) -> Result<i64, WireError> {
    params
        .as_object()
        .and_then(|object| object.get(name))
        .and_then(Value::as_i64)
        .ok_or_else(|| WireError::MalformedPayload {
            node,
            detail: format!("missing integer field \"{name}\""),
        })
}

/// Extracts a required `f64` field from a `params` object.
pub(crate) fn field_f64(params: &Value, name: &str, node: &'static str) -> Result<f64, WireError> {
    params
        .as_object()
        .and_then(|object| object.get(name))
        .and_then(Value::as_f64)
        .ok_or_else(|| WireError::MalformedPayload {
            node,
            detail: format!("missing numeric field \"{name}\""),
        })
}

/// Extracts an optional array-of-strings field from a `params` object.
pub(crate) fn field_str_list_opt(params: &Value, name: &str) -> Option<Vec<String>> {
    params
        .as_object()
        .and_then(|object| object.get(name))
        .and_then(Value::as_array)
        .map(|values| values.iter().filter_map(Value::as_str).map(str::to_string).collect())
}
