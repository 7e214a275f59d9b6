// verity-core/src/dsl/intent.rs
// ============================================================================
// Module: Intent Spec (B)
// Description: The four intent kinds and their validation warnings.
// Purpose: The single declarative claim a verification suite is built from.
// Dependencies: crate::dsl::{trigger, expected}, serde
// ============================================================================

//! ## Overview
//! `IntentSpec` is a flat struct carrying every kind's fields; only the
//! fields relevant to `kind` are expected to be populated. This
//! mirrors how `metric_range` is documented as a single `(min, max)` pair
//! that serializes as a two-element list rather than as a
//! separate min/max struct.
//!
//! `validate()` never runs automatically — suite authors call it explicitly
//! — and never fails the intent; it only collects warnings.

use serde::Deserialize;
use serde::Serialize;

use crate::dsl::expected::Expected;
use crate::dsl::trigger::Trigger;

/// The default behavior timeout, in ticks, when none is specified.
pub const DEFAULT_TIMEOUT_TICKS: u64 = 600;

/// The four verification-suite intent kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentKind {
    /// Does an entity with a given role exist (and optionally hold
    /// required components)?
    Entity,
    /// Does a trigger→expected cause/effect relationship hold within a
    /// timeout window?
    Behavior,
    /// Does a component field stay within a numeric range across the run?
    Metric,
    /// Does a per-tick condition hold across every manifest?
    Invariant,
}

/// A single declarative claim evaluated against a manifest sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentSpec {
    /// A stable, human-readable identifier for this intent.
    pub name: String,
    /// Which of the four kinds this intent is.
    pub kind: IntentKind,
    /// A free-form description shown in reports.
    #[serde(default)]
    pub description: String,

    // Entity-kind fields.
    /// Entity kind: the expected entity type name, if declared.
    #[serde(default)]
    pub entity_type: Option<String>,
    /// Entity kind: the role name to look the entity up by.
    #[serde(default)]
    pub entity_role: Option<String>,
    /// Entity kind: whether the entity is required to exist.
    #[serde(default = "default_true")]
    pub must_exist: bool,
    /// Entity kind: whether the entity is required to be visible. Carried
    /// as a documented contract; the core evaluator does not independently
    /// fail on this.
    #[serde(default)]
    pub must_be_visible: bool,
    /// Entity kind: components the entity is required to carry. Carried as
    /// a documented contract; see `must_be_visible`.
    #[serde(default)]
    pub required_components: Vec<String>,

    // Behavior-kind fields.
    /// Behavior kind: the precondition that starts the check.
    #[serde(default)]
    pub trigger: Option<Trigger>,
    /// Behavior kind: the postcondition that must hold within the window.
    #[serde(default)]
    pub expected: Option<Expected>,
    /// Behavior kind: the tick window after the trigger fires.
    #[serde(default = "default_timeout_ticks")]
    pub timeout_ticks: u64,

    // Metric-kind fields.
    /// Metric kind: the entity to constrain matching changes to, if any.
    #[serde(default)]
    pub metric_entity: Option<String>,
    /// Metric kind: the component type name to scan.
    #[serde(default)]
    pub metric_component: Option<String>,
    /// Metric kind: the field within the component's value to check.
    #[serde(default)]
    pub metric_field: Option<String>,
    /// Metric kind: the inclusive `(min, max)` bound.
    #[serde(default)]
    pub metric_range: Option<(f64, f64)>,

    // Invariant-kind fields.
    /// Invariant kind: the condition string.
    #[serde(default)]
    pub condition: Option<String>,
}

/// Default for `must_exist`: entities are assumed required unless stated otherwise.
const fn default_true() -> bool {
    true
}

/// Default for `timeout_ticks` when the wire payload omits it.
const fn default_timeout_ticks() -> u64 {
    DEFAULT_TIMEOUT_TICKS
}

impl IntentSpec {
    /// Validates this intent, returning non-fatal warnings.
    /// Never called automatically during evaluation.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        match self.kind {
            IntentKind::Behavior => {
                if self.trigger.is_none() {
                    warnings.push(format!("intent {:?}: behavior is missing a trigger", self.name));
                }
                if self.expected.is_none() {
                    warnings.push(format!("intent {:?}: behavior is missing an expected outcome", self.name));
                }
                if let Some(trigger) = &self.trigger {
                    collect_trigger_warnings(&self.name, trigger, &mut warnings);
                }
            }
            IntentKind::Metric => match self.metric_range {
                None => warnings.push(format!("intent {:?}: metric is missing a range", self.name)),
                Some((min, max)) if min > max => {
                    warnings.push(format!("intent {:?}: metric range min {min} exceeds max {max}", self.name));
                }
                Some(_) => {}
            },
            IntentKind::Entity => {
                if self.entity_role.is_none() {
                    warnings.push(format!("intent {:?}: entity is missing a role", self.name));
                }
            }
            IntentKind::Invariant => {
                if self.condition.is_none() {
                    warnings.push(format!("intent {:?}: invariant is missing a condition", self.name));
                }
            }
        }
        warnings
    }
}

/// Walks a trigger tree collecting the two trigger-shaped validation
/// warnings: an `After` with a non-positive delay, and an empty `And`/`Or`.
fn collect_trigger_warnings(intent_name: &str, trigger: &Trigger, warnings: &mut Vec<String>) {
    match trigger {
        Trigger::After { child, delay_ticks } => {
            if *delay_ticks <= 0 {
                warnings.push(format!(
                    "intent {intent_name:?}: after trigger has a non-positive delay ({delay_ticks})"
                ));
            }
            collect_trigger_warnings(intent_name, child, warnings);
        }
        Trigger::And(children) => {
            if children.is_empty() {
                warnings.push(format!("intent {intent_name:?}: and trigger has no children"));
            }
            for child in children {
                collect_trigger_warnings(intent_name, child, warnings);
            }
        }
        Trigger::Or(children) => {
            if children.is_empty() {
                warnings.push(format!("intent {intent_name:?}: or trigger has no children"));
            }
            for child in children {
                collect_trigger_warnings(intent_name, child, warnings);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::IntentKind;
    use super::IntentSpec;
    use crate::dsl::expected::Expected;
    use crate::dsl::trigger::Trigger;

    fn base(kind: IntentKind) -> IntentSpec {
        IntentSpec {
            name: "test".to_string(),
            kind,
            description: String::new(),
            entity_type: None,
            entity_role: None,
            must_exist: true,
            must_be_visible: false,
            required_components: Vec::new(),
            trigger: None,
            expected: None,
            timeout_ticks: super::DEFAULT_TIMEOUT_TICKS,
            metric_entity: None,
            metric_component: None,
            metric_field: None,
            metric_range: None,
            condition: None,
        }
    }

    #[test]
    fn behavior_missing_trigger_and_expected_warns_twice() {
        let intent = base(IntentKind::Behavior);
        let warnings = intent.validate();
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn behavior_with_empty_and_warns() {
        let mut intent = base(IntentKind::Behavior);
        intent.trigger = Some(Trigger::And(Vec::new()));
        intent.expected = Some(Expected::EventEmitted { event_type: "x".to_string(), involving: None });
        let warnings = intent.validate();
        assert!(warnings.iter().any(|w| w.contains("and trigger has no children")));
    }

    #[test]
    fn behavior_with_non_positive_after_delay_warns() {
        let mut intent = base(IntentKind::Behavior);
        intent.trigger = Some(Trigger::After {
            child: Box::new(Trigger::TickReached { tick: 1 }),
            delay_ticks: 0,
        });
        intent.expected = Some(Expected::EventEmitted { event_type: "x".to_string(), involving: None });
        let warnings = intent.validate();
        assert!(warnings.iter().any(|w| w.contains("non-positive delay")));
    }

    #[test]
    fn metric_with_inverted_range_warns() {
        let mut intent = base(IntentKind::Metric);
        intent.metric_range = Some((10.0, 1.0));
        let warnings = intent.validate();
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn entity_missing_role_warns() {
        let intent = base(IntentKind::Entity);
        let warnings = intent.validate();
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn invariant_missing_condition_warns() {
        let intent = base(IntentKind::Invariant);
        let warnings = intent.validate();
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn well_formed_intent_has_no_warnings() {
        let mut intent = base(IntentKind::Metric);
        intent.metric_range = Some((0.0, 10.0));
        assert!(intent.validate().is_empty());
    }

    #[test]
    fn kind_serializes_lowercase() {
        let json = serde_json::to_value(IntentKind::Behavior).expect("serialize");
        assert_eq!(json, serde_json::json!("behavior"));
    }
}
