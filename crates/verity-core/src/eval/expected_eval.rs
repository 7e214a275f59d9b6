// verity-core/src/eval/expected_eval.rs
// ============================================================================
// Module: Expected Evaluator (E)
// Description: Single-manifest predicate over every expected-outcome variant.
// Purpose: Decide whether a postcondition holds on one tick.
// Dependencies: crate::{comparator, dsl::expected, model}, serde_json
// ============================================================================

//! ## Overview
//! [`holds`] implements one branch per `Expected` variant. The delta check inside
//! `ComponentChanged` is load-bearing: without it,
//! setting a component to the value it already holds would spuriously
//! satisfy a bounce-style intent.

use serde_json::Value;
use verity_logic::Node;

use crate::comparator;
use crate::comparator::compare_numeric;
use crate::dsl::expected::Expected;
use crate::dsl::expected::Relation;
use crate::model::ComponentChange;
use crate::model::TickManifest;

/// Evaluates whether `expected` holds on this single `manifest`.
///
/// `All`/`Any` dispatch through [`verity_logic::Node`], the same composite
/// combinator [`crate::eval::trigger_eval::fires`] uses for `And`/`Or`.
#[must_use]
pub fn holds(expected: &Expected, manifest: &TickManifest) -> bool {
    as_node(expected).eval_with(&mut |leaf| holds_leaf(leaf, manifest))
}

/// Maps `All`/`Any` onto `Node::All`/`Node::Any`, leaving every other
/// variant as a leaf.
fn as_node(expected: &Expected) -> Node<&Expected> {
    match expected {
        Expected::All(children) => Node::All(children.iter().map(as_node).collect()),
        Expected::Any(children) => Node::Any(children.iter().map(as_node).collect()),
        other => Node::Leaf(other),
    }
}

/// Evaluates every non-composite expected-outcome variant against one
/// manifest.
fn holds_leaf(expected: &Expected, manifest: &TickManifest) -> bool {
    match expected {
        Expected::ComponentChanged { entity, component, field, expected_value } => manifest
            .component_changes
            .iter()
            .filter(|change| change.component_type_name == *component && entity_matches(entity.as_deref(), change))
            .any(|change| component_changed(change, field.as_deref(), expected_value.as_ref())),
        Expected::EntityDespawned { entity } => entity_despawned(entity, manifest),
        Expected::AggregateChanged { aggregate_type, op, value } => {
            let lhs = manifest.aggregates.get(aggregate_type).unwrap_or(0.0);
            compare_numeric(*op, lhs, *value)
        }
        Expected::InState { entity: _, component, state } => manifest
            .component_changes
            .iter()
            .any(|change| change.component_type_name == *component && change.new_value.as_ref() == Some(state)),
        Expected::EventEmitted { event_type, involving: _ } => {
            manifest.events.iter().any(|event| event.event_type == *event_type)
        }
        Expected::ValueRelation { entity, component, field, relation, tolerance } => manifest
            .component_changes
            .iter()
            .filter(|change| change.component_type_name == *component && entity_matches(entity.as_deref(), change))
            .any(|change| value_relation_holds(change, field, *relation, *tolerance)),
        // `as_node` already lifts these into `Node::All`/`Node::Any` before
        // `holds_leaf` runs; this arm only guards against calling it directly.
        Expected::All(children) => children.iter().all(|child| holds(child, manifest)),
        Expected::Any(children) => children.iter().any(|child| holds(child, manifest)),
    }
}

/// Filters a component change by entity name, if one was given.
fn entity_matches(entity: Option<&str>, change: &ComponentChange) -> bool {
    let Some(name) = entity else { return true };
    comparator::matches_entity(change.entity_id, &change.reason.detail_text(), name)
}

/// Implements the `ComponentChanged` rule, including the
/// load-bearing delta check.
fn component_changed(change: &ComponentChange, field: Option<&str>, expected_value: Option<&Value>) -> bool {
    if let Some(field) = field {
        let Some(new_field) = change.new_value.as_ref().and_then(|new| comparator::extract_field(new, field))
        else {
            return false;
        };
        if let Some(old_field) =
            change.old_value.as_ref().and_then(|old| comparator::extract_field(old, field))
            && old_field == new_field
        {
            return false;
        }
        match expected_value {
            Some(expected) => new_field == expected,
            None => true,
        }
    } else if let Some(expected) = expected_value {
        change.new_value.as_ref() == Some(expected)
    } else {
        match &change.old_value {
            None => true,
            Some(old) => Some(old) != change.new_value.as_ref(),
        }
    }
}

/// Implements the `EntityDespawned` rule: requires both a
/// despawn record and corroborating evidence linking it to `entity`.
fn entity_despawned(entity: &str, manifest: &TickManifest) -> bool {
    if manifest.entity_despawns.is_empty() {
        return false;
    }
    manifest.entity_despawns.iter().any(|entry| {
        entry.role.eq_ignore_ascii_case(entity)
            || entry.entity_type.eq_ignore_ascii_case(entity)
            || entry.entity_id.value().to_string() == entity
            || manifest.events.iter().any(|event| {
                event.involved_entities.contains(&entry.entity_id)
                    && comparator::matches_entity(entry.entity_id, &event.reason.detail_text(), entity)
            })
            || manifest.component_changes.iter().any(|change| {
                change.entity_id == entry.entity_id
                    && comparator::matches_entity(entry.entity_id, &change.reason.detail_text(), entity)
            })
    })
}

/// Implements the `ValueRelation` rule over a change's
/// extracted old/new numeric field values.
fn value_relation_holds(change: &ComponentChange, field: &str, relation: Relation, tolerance: f64) -> bool {
    let Some(old) = change.old_value.as_ref().and_then(|old| comparator::extract_field(old, field)).and_then(Value::as_f64)
    else {
        return false;
    };
    let Some(new) = change.new_value.as_ref().and_then(|new| comparator::extract_field(new, field)).and_then(Value::as_f64)
    else {
        return false;
    };
    match relation {
        Relation::SignFlipped => old * new < 0.0,
        Relation::MagnitudePreserved => old != 0.0 && ((new - old).abs() / old.abs()) <= tolerance,
        Relation::Increased => new > old,
        Relation::Decreased => new < old,
        Relation::ChangedByMoreThan => (new - old).abs() > tolerance,
    }
}
