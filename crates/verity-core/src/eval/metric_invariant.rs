// verity-core/src/eval/metric_invariant.rs
// ============================================================================
// Module: Metric & Invariant Evaluators (G)
// Description: Per-tick scans of component changes or aggregates against a
//              bound or condition string.
// Purpose: Evaluate Metric- and Invariant-kind intents.
// Dependencies: crate::{comparator, error, model}, serde_json
// ============================================================================

//! ## Overview
//! The metric evaluator scans every manifest for a breach; the
//! invariant evaluator parses a condition string against a small grammar
//! and checks it on every manifest. Parse failures never
//! escape — they become a failed outcome.

use crate::comparator;
use crate::comparator::Operator;
use crate::error::ConditionError;
use crate::model::ComponentChange;
use crate::model::Tick;
use crate::model::TickManifest;

/// The outcome of a Metric- or Invariant-kind intent evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundOutcome {
    /// Whether the bound/condition held across every manifest.
    pub passed: bool,
    /// A human-readable failure reason, set only when `passed` is `false`.
    pub failure_reason: Option<String>,
    /// The tick at which the first breach occurred, if any.
    pub breach_tick: Option<Tick>,
    /// The offending component change, if the breach came from one.
    pub evidence: Vec<ComponentChange>,
}

/// Builds a passing outcome with no breach tick or evidence.
fn pass() -> BoundOutcome {
    BoundOutcome { passed: true, failure_reason: None, breach_tick: None, evidence: Vec::new() }
}

/// Evaluates a Metric intent: every component change matching
/// `component` (and `entity`, if given) must have `field` within
/// `[min, max]`.
#[must_use]
pub fn evaluate_metric(
    entity: Option<&str>,
    component: &str,
    field: &str,
    range: (f64, f64),
    manifests: &[TickManifest],
) -> BoundOutcome {
    let (min, max) = range;
    for manifest in manifests {
        for change in &manifest.component_changes {
            if change.component_type_name != component {
                continue;
            }
            if let Some(name) = entity
                && !comparator::matches_entity(change.entity_id, &change.reason.detail_text(), name)
            {
                continue;
            }
            let Some(value) = change
                .new_value
                .as_ref()
                .and_then(|new| comparator::extract_field(new, field))
                .and_then(serde_json::Value::as_f64)
            else {
                continue;
            };
            if value < min || value > max {
                return BoundOutcome {
                    passed: false,
                    failure_reason: Some(format!("{value:?} out of range [{min:?},{max:?}]")),
                    breach_tick: Some(manifest.tick),
                    evidence: vec![change.clone()],
                };
            }
        }
    }
    pass()
}

/// Evaluates a `degenerate_guard:` condition: every component change
/// matching `component`/`entity` must have `field` not equal to
/// `forbidden`. Unlike [`evaluate_metric`], this is an equality exclusion,
/// not a range — `!= 0` must reject exactly `0`, not an open-ended half of
/// the number line.
fn evaluate_degenerate_guard(
    entity: &str,
    component: &str,
    field: &str,
    forbidden: f64,
    manifests: &[TickManifest],
) -> BoundOutcome {
    for manifest in manifests {
        for change in &manifest.component_changes {
            if change.component_type_name != component {
                continue;
            }
            if !comparator::matches_entity(change.entity_id, &change.reason.detail_text(), entity) {
                continue;
            }
            let Some(value) = change
                .new_value
                .as_ref()
                .and_then(|new| comparator::extract_field(new, field))
                .and_then(serde_json::Value::as_f64)
            else {
                continue;
            };
            if comparator::compare_numeric(Operator::Eq, value, forbidden) {
                return BoundOutcome {
                    passed: false,
                    failure_reason: Some(format!("{value:?} equals forbidden value {forbidden:?}")),
                    breach_tick: Some(manifest.tick),
                    evidence: vec![change.clone()],
                };
            }
        }
    }
    pass()
}

/// Evaluates an Invariant intent's condition string against
/// every manifest.
#[must_use]
pub fn evaluate_invariant(condition: &str, manifests: &[TickManifest]) -> BoundOutcome {
    match Condition::parse(condition) {
        Ok(Condition::Aggregate { aggregate_type, op, value }) => {
            for manifest in manifests {
                let lhs = manifest.aggregates.get(&aggregate_type).unwrap_or(0.0);
                if !comparator::compare_numeric(op, lhs, value) {
                    return BoundOutcome {
                        passed: false,
                        failure_reason: Some(format!(
                            "aggregate {aggregate_type:?} = {lhs} violates {} {value}",
                            op.as_str()
                        )),
                        breach_tick: Some(manifest.tick),
                        evidence: Vec::new(),
                    };
                }
            }
            pass()
        }
        Ok(Condition::EntityCount { op, value }) => {
            for manifest in manifests {
                let lhs = manifest.aggregates.total_entity_count as f64;
                if !comparator::compare_numeric(op, lhs, value) {
                    return BoundOutcome {
                        passed: false,
                        failure_reason: Some(format!("entity_count {lhs} violates {} {value}", op.as_str())),
                        breach_tick: Some(manifest.tick),
                        evidence: Vec::new(),
                    };
                }
            }
            pass()
        }
        Ok(Condition::ComponentRange { entity, component, field, min, max }) => {
            evaluate_metric(Some(&entity), &component, &field, (min, max), manifests)
        }
        Ok(Condition::DegenerateGuard { entity, component, field, forbidden }) => {
            evaluate_degenerate_guard(&entity, &component, &field, forbidden, manifests)
        }
        Ok(Condition::FreeForm(_)) => pass(),
        Err(error) => BoundOutcome {
            passed: false,
            failure_reason: Some(format!("invalid condition: {error}")),
            breach_tick: None,
            evidence: Vec::new(),
        },
    }
}

/// A parsed invariant condition.
#[derive(Debug, Clone, PartialEq)]
enum Condition {
    Aggregate { aggregate_type: String, op: Operator, value: f64 },
    EntityCount { op: Operator, value: f64 },
    ComponentRange { entity: String, component: String, field: String, min: f64, max: f64 },
    DegenerateGuard { entity: String, component: String, field: String, forbidden: f64 },
    FreeForm(String),
}

impl Condition {
    /// Parses a condition string against the small grammar described in
    /// the module overview.
    fn parse(condition: &str) -> Result<Self, ConditionError> {
        if let Some(rest) = condition.strip_prefix("aggregate:") {
            let (aggregate_type, op, value) = parse_name_op_value(rest)?;
            return Ok(Self::Aggregate { aggregate_type, op, value });
        }
        if let Some(rest) = condition.strip_prefix("entity_count ") {
            let (op, value) = parse_op_value(rest)?;
            return Ok(Self::EntityCount { op, value });
        }
        if let Some(rest) = condition.strip_prefix("component_range:") {
            let (entity, component, field, min, max) = parse_range_clause(rest, " in [")?;
            return Ok(Self::ComponentRange { entity, component, field, min, max });
        }
        if let Some(rest) = condition.strip_prefix("degenerate_guard:") {
            let (entity, component, field, forbidden) = parse_degenerate_clause(rest)?;
            return Ok(Self::DegenerateGuard { entity, component, field, forbidden });
        }
        Ok(Self::FreeForm(condition.to_string()))
    }
}

/// Parses a `"<op> <number>"` clause.
fn parse_op_value(rest: &str) -> Result<(Operator, f64), ConditionError> {
    let mut parts = rest.splitn(2, ' ');
    let op_token = parts.next().ok_or_else(|| ConditionError::Malformed(rest.to_string()))?;
    let value_token = parts.next().ok_or_else(|| ConditionError::Malformed(rest.to_string()))?;
    let op = Operator::parse(op_token).ok_or_else(|| ConditionError::UnknownOperator(op_token.to_string()))?;
    let value = value_token
        .trim()
        .parse::<f64>()
        .map_err(|_| ConditionError::Malformed(rest.to_string()))?;
    Ok((op, value))
}

/// Parses a `"<name> <op> <number>"` clause.
fn parse_name_op_value(rest: &str) -> Result<(String, Operator, f64), ConditionError> {
    let mut parts = rest.splitn(2, ' ');
    let name = parts.next().ok_or_else(|| ConditionError::Malformed(rest.to_string()))?.to_string();
    let remainder = parts.next().ok_or_else(|| ConditionError::Malformed(rest.to_string()))?;
    let (op, value) = parse_op_value(remainder)?;
    Ok((name, op, value))
}

/// Parses an `"entity.component.field" SEPARATOR "[min, max]"` clause.
fn parse_range_clause(rest: &str, separator: &str) -> Result<(String, String, String, f64, f64), ConditionError> {
    let (path, range) = rest.split_once(separator).ok_or_else(|| ConditionError::Malformed(rest.to_string()))?;
    let mut path_parts = path.splitn(3, '.');
    let entity = path_parts.next().ok_or_else(|| ConditionError::Malformed(rest.to_string()))?.to_string();
    let component = path_parts.next().ok_or_else(|| ConditionError::Malformed(rest.to_string()))?.to_string();
    let field = path_parts.next().ok_or_else(|| ConditionError::Malformed(rest.to_string()))?.to_string();
    let range = range.trim_end_matches(']');
    let mut bounds = range.splitn(2, ", ");
    let min = bounds
        .next()
        .and_then(|token| token.trim().parse::<f64>().ok())
        .ok_or_else(|| ConditionError::Malformed(rest.to_string()))?;
    let max = bounds
        .next()
        .and_then(|token| token.trim().parse::<f64>().ok())
        .ok_or_else(|| ConditionError::Malformed(rest.to_string()))?;
    Ok((entity, component, field, min, max))
}

/// Parses an `"entity.component.field" != "number"` clause.
fn parse_degenerate_clause(rest: &str) -> Result<(String, String, String, f64), ConditionError> {
    let (path, value_clause) =
        rest.split_once(" != ").ok_or_else(|| ConditionError::Malformed(rest.to_string()))?;
    let mut path_parts = path.splitn(3, '.');
    let entity = path_parts.next().ok_or_else(|| ConditionError::Malformed(rest.to_string()))?.to_string();
    let component = path_parts.next().ok_or_else(|| ConditionError::Malformed(rest.to_string()))?.to_string();
    let field = path_parts.next().ok_or_else(|| ConditionError::Malformed(rest.to_string()))?.to_string();
    let forbidden = value_clause
        .trim()
        .parse::<f64>()
        .map_err(|_| ConditionError::Malformed(rest.to_string()))?;
    Ok((entity, component, field, forbidden))
}
