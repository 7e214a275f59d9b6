// verity-core/src/eval/behavior.rs
// ============================================================================
// Module: Behavior Evaluator (F)
// Description: Two-phase trigger→expected scan with AFTER resolution.
// Purpose: Evaluate a Behavior-kind intent against a manifest sequence.
// Dependencies: crate::{dsl, eval::{trigger_eval, expected_eval}, model}
// ============================================================================

//! ## Overview
//! Resolves the trigger's firing index (with `After`'s special two-phase
//! handling), then scans the timeout window for the expected outcome.
//! First-match semantics everywhere: earliest trigger tick, then earliest
//! expected tick.

use crate::dsl::expected::Expected;
use crate::dsl::trigger::Trigger;
use crate::eval::expected_eval;
use crate::eval::trigger_eval;
use crate::model::ComponentChange;
use crate::model::Tick;
use crate::model::TickManifest;

/// The outcome of evaluating a Behavior-kind intent.
#[derive(Debug, Clone, PartialEq)]
pub struct BehaviorOutcome {
    /// Whether the expected outcome was observed within the window.
    pub passed: bool,
    /// The tick at which the trigger resolved, if it resolved at all.
    pub trigger_tick: Option<Tick>,
    /// A human-readable failure reason, set only when `passed` is `false`.
    pub failure_reason: Option<String>,
    /// The full `component_changes` of the tick where `expected` held,
    /// collected as evidence. Empty on failure.
    pub evidence: Vec<ComponentChange>,
}

/// Evaluates a Behavior intent's `(trigger, expected, timeout_ticks)` against
/// `manifests`.
#[must_use]
pub fn evaluate(trigger: &Trigger, expected: &Expected, timeout_ticks: u64, manifests: &[TickManifest]) -> BehaviorOutcome {
    let Some(trigger_index) = resolve_trigger_index(trigger, manifests) else {
        return BehaviorOutcome {
            passed: false,
            trigger_tick: None,
            failure_reason: Some(failure_for_unresolved_trigger(trigger, manifests)),
            evidence: Vec::new(),
        };
    };
    let Some(trigger_index) = trigger_index else {
        return BehaviorOutcome {
            passed: false,
            trigger_tick: None,
            failure_reason: Some("delay exceeds available manifests".to_string()),
            evidence: Vec::new(),
        };
    };

    let trigger_tick = manifests[trigger_index].tick;
    let timeout_ticks_usize = usize::try_from(timeout_ticks).unwrap_or(usize::MAX);
    let window_end = trigger_index.saturating_add(timeout_ticks_usize).min(manifests.len());
    for manifest in &manifests[trigger_index..window_end] {
        if expected_eval::holds(expected, manifest) {
            return BehaviorOutcome {
                passed: true,
                trigger_tick: Some(trigger_tick),
                failure_reason: None,
                evidence: manifest.component_changes.clone(),
            };
        }
    }
    BehaviorOutcome {
        passed: false,
        trigger_tick: Some(trigger_tick),
        failure_reason: Some(format!(
            "expected not met within {timeout_ticks} ticks after trigger at tick {trigger_tick}"
        )),
        evidence: Vec::new(),
    }
}

/// Resolves the manifest index at which `trigger` fires.
///
/// Returns `None` (outer) if the trigger never fires at all — including an
/// `After` whose child never fires. Returns `Some(None)` (inner `None`) for
/// an `After` whose resolved index runs past the end of `manifests`, which
/// is a distinct failure reason from "never fired".
fn resolve_trigger_index(trigger: &Trigger, manifests: &[TickManifest]) -> Option<Option<usize>> {
    if let Trigger::After { child, delay_ticks } = trigger {
        let child_index = find_first_firing(child, manifests)?;
        let resolved = i64::try_from(child_index).unwrap_or(i64::MAX).saturating_add(*delay_ticks);
        let Ok(resolved) = usize::try_from(resolved) else {
            return Some(None);
        };
        if resolved >= manifests.len() {
            return Some(None);
        }
        return Some(Some(resolved));
    }
    find_first_firing(trigger, manifests).map(Some)
}

fn find_first_firing(trigger: &Trigger, manifests: &[TickManifest]) -> Option<usize> {
    manifests.iter().position(|manifest| trigger_eval::fires(trigger, manifest))
}

fn failure_for_unresolved_trigger(trigger: &Trigger, manifests: &[TickManifest]) -> String {
    if let Trigger::After { child, .. } = trigger {
        if find_first_firing(child, manifests).is_none() {
            return "child trigger never fired".to_string();
        }
    }
    format!("trigger never fired across {} ticks", manifests.len())
}
