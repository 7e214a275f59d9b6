// verity-core/src/model/wire.rs
// ============================================================================
// Module: Wire Shape Helpers
// Description: Permissive deserialization for identifiers with two shapes.
// Purpose: Accept both bare-integer and single-keyed-map encodings.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Different simulator builds encode `EntityId`/`SystemId` either as a bare
//! integer or as a single-keyed mapping whose lone value is that integer
//! (an artifact of how some guest-side newtype wrappers serialize). Both
//! [`EntityId`](crate::model::identifiers::EntityId) and
//! [`SystemId`](crate::model::identifiers::SystemId) delegate their
//! `Deserialize` impl to the helpers in this module so the rest of the
//! crate never has to care which shape a given manifest used. Serialization
//! always emits the bare-integer shape — the permissiveness is read-only.

use serde::Deserialize;
use serde::Deserializer;
use serde::de::Error as DeError;
use serde_json::Value;

/// Recursively unwraps a bare number or a single-keyed map down to its
/// `u64` value.
fn extract_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number.as_u64(),
        Value::Object(map) if map.len() == 1 => map.values().next().and_then(extract_u64),
        _ => None,
    }
}

/// Deserializes a `u64` from either a bare integer or a single-keyed map
/// whose value is an integer.
///
/// # Errors
/// Returns an error if the input is neither shape, or the integer doesn't
/// fit in a `u64`.
pub fn deserialize_u64_or_keyed_map<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    extract_u64(&value)
        .ok_or_else(|| DeError::custom(format!("expected integer or single-keyed integer map, got {value}")))
}

/// Deserializes a `u32` from either a bare integer or a single-keyed map
/// whose value is an integer.
///
/// # Errors
/// Returns an error if the input is neither shape, or the integer doesn't
/// fit in a `u32`.
pub fn deserialize_u32_or_keyed_map<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = deserialize_u64_or_keyed_map(deserializer)?;
    u32::try_from(raw).map_err(|_| DeError::custom(format!("integer {raw} does not fit in a u32")))
}
