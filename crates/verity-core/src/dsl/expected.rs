// verity-core/src/dsl/expected.rs
// ============================================================================
// Module: Expected Outcome DSL (B)
// Description: The postcondition tree that must hold within a behavior's
//              timeout window.
// Purpose: Tagged-variant tree over the seven expected shapes, including the
//          ALL/ANY composites and the value-relation checks.
// Dependencies: crate::dsl::wire_shape, serde_json
// ============================================================================

//! ## Overview
//! Mirrors [`crate::dsl::trigger::Trigger`]'s wire shape and round-trip
//! contract. The single-tick evaluator lives in
//! [`crate::eval::expected_eval`].

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde_json::Value;
use serde_json::json;

use crate::comparator::Operator;
use crate::dsl::wire_shape;
use crate::error::WireError;

const NODE: &str = "expected";

/// A value-relation check applied to a matching component's `(old, new)`
/// numeric field pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// `old * new < 0`.
    SignFlipped,
    /// `old != 0 && |new - old| / |old| <= tolerance`.
    MagnitudePreserved,
    /// `new > old`.
    Increased,
    /// `new < old`.
    Decreased,
    /// `|new - old| > tolerance`.
    ChangedByMoreThan,
}

impl Relation {
    /// Parses the wire token for a relation.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "sign_flipped" => Some(Self::SignFlipped),
            "magnitude_preserved" => Some(Self::MagnitudePreserved),
            "increased" => Some(Self::Increased),
            "decreased" => Some(Self::Decreased),
            "changed_by_more_than" => Some(Self::ChangedByMoreThan),
            _ => None,
        }
    }

    /// Returns the canonical wire token for this relation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SignFlipped => "sign_flipped",
            Self::MagnitudePreserved => "magnitude_preserved",
            Self::Increased => "increased",
            Self::Decreased => "decreased",
            Self::ChangedByMoreThan => "changed_by_more_than",
        }
    }
}

/// The postcondition that must hold within a behavior's timeout window.
#[derive(Debug, Clone, PartialEq)]
pub enum Expected {
    /// A component on a matching entity changed, optionally constrained to a
    /// field and/or an expected new value.
    ComponentChanged {
        /// The entity's role or name, if constrained.
        entity: Option<String>,
        /// The component type name.
        component: String,
        /// The field within the component's value to check, if any.
        field: Option<String>,
        /// The required new value, if any.
        expected_value: Option<Value>,
    },
    /// A matching entity despawned, with evidence linking the despawn to it.
    EntityDespawned {
        /// The entity's role or name.
        entity: String,
    },
    /// A named aggregate satisfies a relational condition.
    AggregateChanged {
        /// The aggregate's name.
        aggregate_type: String,
        /// The relational operator.
        op: Operator,
        /// The right-hand side value.
        value: f64,
    },
    /// A component reached a named state value. The entity parameter is
    /// carried in the DSL but not used for matching at evaluation time.
    InState {
        /// The entity's role or name (carried, not matched).
        entity: String,
        /// The component type name.
        component: String,
        /// The required state value.
        state: Value,
    },
    /// A named event occurred. The `involving` parameter is likewise carried
    /// but unused by the evaluator.
    EventEmitted {
        /// The event's type name.
        event_type: String,
        /// Names that must all appear in the event (carried, not matched).
        involving: Option<Vec<String>>,
    },
    /// A value relation holds over a matching component's numeric field.
    ValueRelation {
        /// The entity's role or name, if constrained.
        entity: Option<String>,
        /// The component type name.
        component: String,
        /// The field within the component's value to extract.
        field: String,
        /// The relation to check.
        relation: Relation,
        /// The tolerance used by `magnitude_preserved`/`changed_by_more_than`.
        tolerance: f64,
    },
    /// Conjunction: every child must hold on the same manifest.
    All(Vec<Expected>),
    /// Disjunction: at least one child must hold on the same manifest.
    Any(Vec<Expected>),
}

impl Expected {
    /// Encodes this expected outcome into its wire shape.
    #[must_use]
    pub fn to_wire(&self) -> Value {
        match self {
            Self::ComponentChanged { entity, component, field, expected_value } => wire_shape::build(
                "component_changed",
                json!({
                    "entity": entity,
                    "component": component,
                    "field": field,
                    "expected_value": expected_value,
                }),
                None,
            ),
            Self::EntityDespawned { entity } => {
                wire_shape::build("entity_despawned", json!({"entity": entity}), None)
            }
            Self::AggregateChanged { aggregate_type, op, value } => wire_shape::build(
                "aggregate_changed",
                json!({"aggregate_type": aggregate_type, "op": op.as_str(), "value": value}),
                None,
            ),
            Self::InState { entity, component, state } => wire_shape::build(
                "in_state",
                json!({"entity": entity, "component": component, "state": state}),
                None,
            ),
            Self::EventEmitted { event_type, involving } => wire_shape::build(
                "event_emitted",
                json!({"event_type": event_type, "involving": involving}),
                None,
            ),
            Self::ValueRelation { entity, component, field, relation, tolerance } => wire_shape::build(
                "value_relation",
                json!({
                    "entity": entity,
                    "component": component,
                    "field": field,
                    "relation": relation.as_str(),
                    "tolerance": tolerance,
                }),
                None,
            ),
            Self::All(children) => {
                wire_shape::build("all", Value::Null, Some(children.iter().map(Expected::to_wire).collect()))
            }
            Self::Any(children) => {
                wire_shape::build("any", Value::Null, Some(children.iter().map(Expected::to_wire).collect()))
            }
        }
    }

    /// Decodes an expected outcome from its wire shape.
    ///
    /// # Errors
    /// Returns [`WireError`] if the `type` tag is unrecognized or a required
    /// field is missing or malformed.
    pub fn from_wire(value: &Value) -> Result<Self, WireError> {
        let envelope = wire_shape::parse(value, NODE)?;
        match envelope.ty {
            "component_changed" => {
                let object = envelope.params.as_object().ok_or_else(|| WireError::MalformedPayload {
                    node: NODE,
                    detail: "component_changed params must be an object".to_string(),
                })?;
                Ok(Self::ComponentChanged {
                    entity: wire_shape::field_str_opt(envelope.params, "entity").map(str::to_string),
                    component: wire_shape::field_str(envelope.params, "component", NODE)?.to_string(),
                    field: wire_shape::field_str_opt(envelope.params, "field").map(str::to_string),
                    expected_value: object.get("expected_value").filter(|v| !v.is_null()).cloned(),
                })
            }
            "entity_despawned" => Ok(Self::EntityDespawned {
                entity: wire_shape::field_str(envelope.params, "entity", NODE)?.to_string(),
            }),
            "aggregate_changed" => Ok(Self::AggregateChanged {
                aggregate_type: wire_shape::field_str(envelope.params, "aggregate_type", NODE)?.to_string(),
                op: parse_op(envelope.params)?,
                value: wire_shape::field_f64(envelope.params, "value", NODE)?,
            }),
            "in_state" => {
                let object = envelope.params.as_object().ok_or_else(|| WireError::MalformedPayload {
                    node: NODE,
                    detail: "in_state params must be an object".to_string(),
                })?;
                Ok(Self::InState {
                    entity: wire_shape::field_str(envelope.params, "entity", NODE)?.to_string(),
                    component: wire_shape::field_str(envelope.params, "component", NODE)?.to_string(),
                    state: object.get("state").cloned().ok_or_else(|| WireError::MalformedPayload {
                        node: NODE,
                        detail: "missing field \"state\"".to_string(),
                    })?,
                })
            }
            "event_emitted" => Ok(Self::EventEmitted {
                event_type: wire_shape::field_str(envelope.params, "event_type", NODE)?.to_string(),
                involving: wire_shape::field_str_list_opt(envelope.params, "involving"),
            }),
            "value_relation" => Ok(Self::ValueRelation {
                entity: wire_shape::field_str_opt(envelope.params, "entity").map(str::to_string),
                component: wire_shape::field_str(envelope.params, "component", NODE)?.to_string(),
                field: wire_shape::field_str(envelope.params, "field", NODE)?.to_string(),
                relation: parse_relation(envelope.params)?,
                tolerance: wire_shape::field_f64(envelope.params, "tolerance", NODE)?,
            }),
            "all" => Ok(Self::All(parse_children(envelope.children)?)),
            "any" => Ok(Self::Any(parse_children(envelope.children)?)),
            other => Err(WireError::UnknownVariant { node: NODE, tag: Some(other.to_string()) }),
        }
    }
}

/// Reads and parses the `op` field shared by several expected-outcome
/// variants.
fn parse_op(params: &Value) -> Result<Operator, WireError> {
    let token = wire_shape::field_str(params, "op", NODE)?;
    Operator::parse(token).ok_or_else(|| WireError::MalformedPayload {
        node: NODE,
        detail: format!("unrecognized operator token {token:?}"),
    })
}

/// Reads and parses the `relation` field of a `ValueRelation` payload.
fn parse_relation(params: &Value) -> Result<Relation, WireError> {
    let token = wire_shape::field_str(params, "relation", NODE)?;
    Relation::parse(token).ok_or_else(|| WireError::MalformedPayload {
        node: NODE,
        detail: format!("unrecognized relation token {token:?}"),
    })
}

/// Parses a composite expected-outcome's `children` array, defaulting to
/// empty when absent.
fn parse_children(children: Option<&Vec<Value>>) -> Result<Vec<Expected>, WireError> {
    let Some(children) = children else {
        return Ok(Vec::new());
    };
    children.iter().map(Expected::from_wire).collect()
}

impl Serialize for Expected {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_wire().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Expected {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_wire(&value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::Expected;
    use super::Relation;

    #[test]
    fn component_changed_round_trips_with_optional_fields_absent() {
        let expected = Expected::ComponentChanged {
            entity: Some("ball".to_string()),
            component: "velocity".to_string(),
            field: None,
            expected_value: None,
        };
        let json = expected.to_wire();
        let parsed = Expected::from_wire(&json).expect("parse");
        assert_eq!(parsed, expected);
    }

    #[test]
    fn all_any_round_trip_with_nested_value_relation() {
        let expected = Expected::All(vec![
            Expected::EntityDespawned { entity: "brick".to_string() },
            Expected::Any(vec![Expected::ValueRelation {
                entity: Some("ball".to_string()),
                component: "velocity".to_string(),
                field: "dx".to_string(),
                relation: Relation::SignFlipped,
                tolerance: 0.0,
            }]),
        ]);
        let json = expected.to_wire();
        let parsed = Expected::from_wire(&json).expect("parse");
        assert_eq!(parsed, expected);
    }

    #[test]
    fn unknown_relation_token_raises() {
        let json = serde_json::json!({
            "type": "value_relation",
            "params": {
                "entity": "ball", "component": "velocity", "field": "dx",
                "relation": "not_a_real_relation", "tolerance": 0.0,
            },
        });
        assert!(Expected::from_wire(&json).is_err());
    }

    #[test]
    fn unknown_variant_tag_raises() {
        let json = serde_json::json!({"type": "nonsense", "params": {}});
        assert!(Expected::from_wire(&json).is_err());
    }
}
