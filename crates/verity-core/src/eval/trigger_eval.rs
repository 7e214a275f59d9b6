// verity-core/src/eval/trigger_eval.rs
// ============================================================================
// Module: Trigger Evaluator (D)
// Description: Single-manifest predicate over every trigger variant.
// Purpose: Decide whether a trigger fires on one tick.
// Dependencies: crate::{comparator, dsl::trigger, model}, serde_json
// ============================================================================

//! ## Overview
//! [`fires`] implements one match arm per trigger variant. `After` always
//! returns `false` here — resolving it requires scanning across manifests,
//! which only the behavior evaluator does.

use verity_logic::Node;

use crate::comparator;
use crate::dsl::trigger::Trigger;
use crate::model::TickManifest;

/// Evaluates whether `trigger` fires on this single `manifest`.
///
/// `And`/`Or` dispatch through [`verity_logic::Node`]'s short-circuiting
/// `All`/`Any` combinator rather than a hand-rolled recursion, so the
/// composite-tree semantics live in one place shared with
/// [`crate::eval::expected_eval::holds`].
#[must_use]
pub fn fires(trigger: &Trigger, manifest: &TickManifest) -> bool {
    as_node(trigger).eval_with(&mut |leaf| fires_leaf(leaf, manifest))
}

/// Maps `And`/`Or` onto `Node::All`/`Node::Any`, leaving every other
/// variant (including `After`, which never fires at this layer) as a leaf.
fn as_node(trigger: &Trigger) -> Node<&Trigger> {
    match trigger {
        Trigger::And(children) => Node::All(children.iter().map(as_node).collect()),
        Trigger::Or(children) => Node::Any(children.iter().map(as_node).collect()),
        other => Node::Leaf(other),
    }
}

/// Evaluates every non-composite trigger variant against one manifest.
fn fires_leaf(trigger: &Trigger, manifest: &TickManifest) -> bool {
    match trigger {
        Trigger::TickReached { tick } => manifest.tick.value() >= *tick,
        Trigger::EventOccurred { event_type, involving } => manifest.events.iter().any(|event| {
            event.event_type == *event_type && involving_matches(involving.as_deref(), event)
        }),
        Trigger::ComponentCondition { entity: _, component, field, op, value } => {
            let Some(rhs) = value.as_f64() else { return false };
            manifest.component_changes.iter().any(|change| {
                change.component_type_name == *component
                    && change
                        .new_value
                        .as_ref()
                        .and_then(|value| comparator::extract_field(value, field))
                        .and_then(serde_json::Value::as_f64)
                        .is_some_and(|lhs| comparator::compare_numeric(*op, lhs, rhs))
            })
        }
        Trigger::AggregateCondition { aggregate_type, op, value } => {
            let lhs = manifest.aggregates.get(aggregate_type).unwrap_or(0.0);
            comparator::compare_numeric(*op, lhs, *value)
        }
        Trigger::Collision { a, b } => manifest.events.iter().any(|event| {
            if event.event_type != "collision" {
                return false;
            }
            let detail = event.reason.detail_text().to_lowercase();
            detail.contains(&a.to_lowercase()) && detail.contains(&b.to_lowercase())
        }),
        Trigger::StateTransition { entity, from, to } => manifest.component_changes.iter().any(|change| {
            change.old_value.as_ref() == Some(from)
                && change.new_value.as_ref() == Some(to)
                && change.reason.detail_text().to_lowercase().contains(&entity.to_lowercase())
        }),
        // `as_node` already lifts these into `Node::All`/`Node::Any` before
        // `fires_leaf` runs; this arm only guards against calling it directly.
        Trigger::And(children) => children.iter().all(|child| fires(child, manifest)),
        Trigger::Or(children) => children.iter().any(|child| fires(child, manifest)),
        Trigger::After { .. } => false,
    }
}

/// `EventOccurred`'s optional `involving` check: every named entity must
/// appear, case-insensitively, in the event's description or detail text.
fn involving_matches(involving: Option<&[String]>, event: &crate::model::GameEvent) -> bool {
    let Some(names) = involving else { return true };
    let haystack = format!("{} {}", event.description, event.reason.detail_text()).to_lowercase();
    names.iter().all(|name| haystack.contains(&name.to_lowercase()))
}
