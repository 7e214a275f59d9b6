// verity-core/src/dsl/trigger.rs
// ============================================================================
// Module: Trigger DSL (B)
// Description: The precondition tree whose firing starts a behavior check.
// Purpose: Tagged-variant tree over the nine trigger shapes, including the
//          AND/OR composites and the AFTER special case.
// Dependencies: crate::comparator, crate::dsl::wire_shape, serde_json
// ============================================================================

//! ## Overview
//! `Trigger` round-trips through the `{type, params, children?}` envelope.
//! Leaf variants carry their fields under `params`; `And`/`Or` carry their
//! children under `children`; `After` carries both (`params.delay_ticks` and
//! a single-element `children`).
//!
//! The single-tick evaluator for this tree lives in
//! [`crate::eval::trigger_eval`]; `After` always evaluates to `false` there —
//! only the behavior evaluator knows how to resolve it.

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde_json::Value;
use serde_json::json;

use crate::comparator::Operator;
use crate::dsl::wire_shape;
use crate::error::WireError;

const NODE: &str = "trigger";

/// The precondition tree whose firing starts a behavior check.
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    /// A `"collision"` event naming both entities.
    Collision {
        /// The first entity's role or name.
        a: String,
        /// The second entity's role or name.
        b: String,
    },
    /// A component transitioned from one state value to another.
    StateTransition {
        /// The entity whose component transitioned.
        entity: String,
        /// The prior state value.
        from: Value,
        /// The new state value.
        to: Value,
    },
    /// A named aggregate satisfies a relational condition.
    AggregateCondition {
        /// The aggregate's name (`entity_count_by_type` key).
        aggregate_type: String,
        /// The relational operator.
        op: Operator,
        /// The right-hand side value.
        value: f64,
    },
    /// A component field on a matching entity satisfies a relational condition.
    ComponentCondition {
        /// The entity's role or name.
        entity: String,
        /// The component type name.
        component: String,
        /// The field within the component's value to extract.
        field: String,
        /// The relational operator.
        op: Operator,
        /// The right-hand side value.
        value: Value,
    },
    /// A named event occurred, optionally naming entities it must involve.
    EventOccurred {
        /// The event's type name.
        event_type: String,
        /// Names that must all appear in the event's description or detail.
        involving: Option<Vec<String>>,
    },
    /// The manifest's tick has reached at least the given value.
    TickReached {
        /// The tick threshold.
        tick: u64,
    },
    /// Conjunction: every child must fire on the same manifest.
    And(Vec<Trigger>),
    /// Disjunction: at least one child must fire on the same manifest.
    Or(Vec<Trigger>),
    /// Resolved by the behavior evaluator only: the child's first firing
    /// tick index, offset by `delay_ticks`.
    After {
        /// The child trigger to resolve first.
        child: Box<Trigger>,
        /// The tick-index offset applied after the child fires.
        delay_ticks: i64,
    },
}

impl Trigger {
    /// Encodes this trigger into its `{type, params, children?}` wire shape.
    #[must_use]
    pub fn to_wire(&self) -> Value {
        match self {
            Self::Collision { a, b } => wire_shape::build("collision", json!({"a": a, "b": b}), None),
            Self::StateTransition { entity, from, to } => wire_shape::build(
                "state_transition",
                json!({"entity": entity, "from": from, "to": to}),
                None,
            ),
            Self::AggregateCondition { aggregate_type, op, value } => wire_shape::build(
                "aggregate_condition",
                json!({"aggregate_type": aggregate_type, "op": op.as_str(), "value": value}),
                None,
            ),
            Self::ComponentCondition { entity, component, field, op, value } => wire_shape::build(
                "component_condition",
                json!({
                    "entity": entity,
                    "component": component,
                    "field": field,
                    "op": op.as_str(),
                    "value": value,
                }),
                None,
            ),
            Self::EventOccurred { event_type, involving } => wire_shape::build(
                "event_occurred",
                json!({"event_type": event_type, "involving": involving}),
                None,
            ),
            Self::TickReached { tick } => wire_shape::build("tick_reached", json!({"tick": tick}), None),
            Self::And(children) => {
                wire_shape::build("and", Value::Null, Some(children.iter().map(Trigger::to_wire).collect()))
            }
            Self::Or(children) => {
                wire_shape::build("or", Value::Null, Some(children.iter().map(Trigger::to_wire).collect()))
            }
            Self::After { child, delay_ticks } => wire_shape::build(
                "after",
                json!({"delay_ticks": delay_ticks}),
                Some(vec![child.to_wire()]),
            ),
        }
    }

    /// Decodes a trigger from its wire shape.
    ///
    /// # Errors
    /// Returns [`WireError`] if the `type` tag is unrecognized
    /// or a required field is missing or malformed.
    pub fn from_wire(value: &Value) -> Result<Self, WireError> {
        let envelope = wire_shape::parse(value, NODE)?;
        match envelope.ty {
            "collision" => Ok(Self::Collision {
                a: wire_shape::field_str(envelope.params, "a", NODE)?.to_string(),
                b: wire_shape::field_str(envelope.params, "b", NODE)?.to_string(),
            }),
            "state_transition" => {
                let object = envelope.params.as_object().ok_or_else(|| WireError::MalformedPayload {
                    node: NODE,
                    detail: "state_transition params must be an object".to_string(),
                })?;
                Ok(Self::StateTransition {
                    entity: wire_shape::field_str(envelope.params, "entity", NODE)?.to_string(),
                    from: object.get("from").cloned().unwrap_or(Value::Null),
                    to: object.get("to").cloned().unwrap_or(Value::Null),
                })
            }
            "aggregate_condition" => Ok(Self::AggregateCondition {
                aggregate_type: wire_shape::field_str(envelope.params, "aggregate_type", NODE)?.to_string(),
                op: parse_op(envelope.params, NODE)?,
                value: wire_shape::field_f64(envelope.params, "value", NODE)?,
            }),
            "component_condition" => {
                let object = envelope.params.as_object().ok_or_else(|| WireError::MalformedPayload {
                    node: NODE,
                    detail: "component_condition params must be an object".to_string(),
                })?;
                Ok(Self::ComponentCondition {
                    entity: wire_shape::field_str(envelope.params, "entity", NODE)?.to_string(),
                    component: wire_shape::field_str(envelope.params, "component", NODE)?.to_string(),
                    field: wire_shape::field_str(envelope.params, "field", NODE)?.to_string(),
                    op: parse_op(envelope.params, NODE)?,
                    value: object.get("value").cloned().ok_or_else(|| WireError::MalformedPayload {
                        node: NODE,
                        detail: "missing field \"value\"".to_string(),
                    })?,
                })
            }
            "event_occurred" => Ok(Self::EventOccurred {
                event_type: wire_shape::field_str(envelope.params, "event_type", NODE)?.to_string(),
                involving: wire_shape::field_str_list_opt(envelope.params, "involving"),
            }),
            "tick_reached" => Ok(Self::TickReached { tick: wire_shape::field_u64(envelope.params, "tick", NODE)? }),
            "and" => Ok(Self::And(parse_children(envelope.children, NODE)?)),
            "or" => Ok(Self::Or(parse_children(envelope.children, NODE)?)),
            "after" => {
                let mut children = parse_children(envelope.children, NODE)?;
                if children.len() != 1 {
                    return Err(WireError::MalformedPayload {
                        node: NODE,
                        detail: format!("after requires exactly one child, got {}", children.len()),
                    });
                }
                Ok(Self::After {
                    child: Box::new(children.remove(0)),
                    delay_ticks: wire_shape::field_i64(envelope.params, "delay_ticks", NODE)?,
                })
            }
            other => Err(WireError::UnknownVariant { node: NODE, tag: Some(other.to_string()) }),
        }
    }
}

/// Reads and parses the `op` field shared by several trigger variants.
fn parse_op(params: &Value, node: &'static str) -> Result<Operator, WireError> {
    let token = wire_shape::field_str(params, "op", node)?;
    Operator::parse(token).ok_or_else(|| WireError::MalformedPayload {
        node,
        detail: format!("unrecognized operator token {token:?}"),
    })
}

/// Parses a composite trigger's `children` array, defaulting to empty when
/// absent.
fn parse_children(children: Option<&Vec<Value>>, node: &'static str) -> Result<Vec<Trigger>, WireError> {
    let Some(children) = children else {
        return Ok(Vec::new());
    };
    children.iter().map(Trigger::from_wire).collect()
}

impl Serialize for Trigger {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_wire().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Trigger {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_wire(&value).map_err(serde::de::Error::custom)
    }
}
