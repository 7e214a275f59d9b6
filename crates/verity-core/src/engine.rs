// verity-core/src/engine.rs
// ============================================================================
// Module: Verification Engine & Report (I, K)
// Description: Drives every intent kind to its evaluator, assembles the
//              report, and classifies failures for remediation.
// Purpose: The single public entry point callers actually invoke.
// Dependencies: crate::{causal_chain, dsl, eval, model, physics}
// ============================================================================

//! ## Overview
//! [`VerificationEngine::verify`] is stateless and reentrant:
//! it holds no fields across calls, and running it twice over the same
//! suite and manifests yields identical `(passed, failed, results)` modulo
//! `wall_time_ms`. An unknown `IntentKind` would only arise from a
//! forward-compatible suite loaded by an older binary; the match is
//! already exhaustive over the four declared kinds, so that guard lives
//! only in the doc comment, not in code that would otherwise be dead.

use std::time::Instant;

use crate::dsl::IntentKind;
use crate::dsl::IntentSpec;
use crate::dsl::VerificationSuite;
use crate::eval::behavior;
use crate::eval::entity;
use crate::eval::metric_invariant;
use crate::model::ComponentChange;
use crate::model::Tick;
use crate::model::TickManifest;
use crate::physics::PhysicsRegistry;
use crate::physics::run_sanity_checks;

// ============================================================================
// SECTION: IntentResult
// ============================================================================

/// The outcome of evaluating one intent (or one physics sanity check,
/// which shares this shape).
#[derive(Debug, Clone, PartialEq)]
pub struct IntentResult {
    /// The intent's name, or a self-describing name for a physics check
    /// (e.g. `physics_sanity:bounce_response(entity_3)`).
    pub intent_name: String,
    /// Whether the intent passed.
    pub passed: bool,
    /// A human-readable failure reason, set only when `passed` is `false`.
    pub failure_reason: Option<String>,
    /// The tick at which a behavior intent's trigger resolved, if any.
    pub trigger_tick: Option<Tick>,
    /// Evidence component changes backing the result.
    pub evidence: Vec<ComponentChange>,
}

impl IntentResult {
    /// Builds a passing result with no evidence or trigger tick.
    fn pass(intent_name: String) -> Self {
        Self { intent_name, passed: true, failure_reason: None, trigger_tick: None, evidence: Vec::new() }
    }

    /// Builds a bare failure result, used by the physics sanity checks (J)
    /// which never carry a trigger tick or evidence of their own.
    #[must_use]
    pub fn failed(intent_name: String, failure_reason: String) -> Self {
        Self { intent_name, passed: false, failure_reason: Some(failure_reason), trigger_tick: None, evidence: Vec::new() }
    }
}

// ============================================================================
// SECTION: VerificationEngine
// ============================================================================

/// Drives a [`VerificationSuite`] against a manifest sequence. Carries no
/// state across calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerificationEngine;

impl VerificationEngine {
    /// Creates a new engine. There is nothing to configure; the type
    /// exists to give `verify` a stable home as a zero-sized evaluator type.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Runs every intent in `suite` against `manifests`, in declaration
    /// order, and assembles a [`VerificationReport`].
    #[must_use]
    pub fn verify(&self, suite: &VerificationSuite, manifests: &[TickManifest]) -> VerificationReport {
        self.verify_with_physics(suite, manifests, None)
    }

    /// As [`Self::verify`], additionally appending physics sanity results
    /// (J) when a registry is supplied.
    #[must_use]
    pub fn verify_with_physics(
        &self,
        suite: &VerificationSuite,
        manifests: &[TickManifest],
        physics: Option<&PhysicsRegistry>,
    ) -> VerificationReport {
        let started_at = Instant::now();
        let entity_index = entity::build_entity_index(manifests);

        let mut results: Vec<IntentResult> = suite.intents.iter().map(|intent| evaluate_intent(intent, manifests, &entity_index)).collect();

        if let Some(registry) = physics {
            results.extend(run_sanity_checks(registry, manifests, &crate::physics::EngineConfig::default()));
        }

        let passed = results.iter().filter(|result| result.passed).count();
        let total = results.len();
        let failed = total - passed;
        let wall_time_ms = u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX);

        VerificationReport {
            suite_name: suite.name.clone(),
            total,
            passed,
            failed,
            results,
            wall_time_ms,
            ticks_examined: manifests.len(),
        }
    }
}

/// Dispatches one intent to its kind-specific evaluator and folds the
/// outcome into a common [`IntentResult`] shape.
fn evaluate_intent(
    intent: &IntentSpec,
    manifests: &[TickManifest],
    entity_index: &std::collections::HashMap<String, crate::model::EntityEntry>,
) -> IntentResult {
    match intent.kind {
        IntentKind::Entity => {
            let Some(role) = &intent.entity_role else {
                return IntentResult::failed(intent.name.clone(), "entity intent is missing a role".to_string());
            };
            let outcome = entity::evaluate(role, intent.entity_type.as_deref(), entity_index, manifests);
            if outcome.passed {
                IntentResult::pass(intent.name.clone())
            } else {
                IntentResult::failed(intent.name.clone(), outcome.failure_reason.unwrap_or_default())
            }
        }
        IntentKind::Behavior => {
            let (Some(trigger), Some(expected)) = (&intent.trigger, &intent.expected) else {
                return IntentResult::failed(intent.name.clone(), "behavior intent is missing a trigger or expected outcome".to_string());
            };
            let outcome = behavior::evaluate(trigger, expected, intent.timeout_ticks, manifests);
            IntentResult {
                intent_name: intent.name.clone(),
                passed: outcome.passed,
                failure_reason: outcome.failure_reason,
                trigger_tick: outcome.trigger_tick,
                evidence: outcome.evidence,
            }
        }
        IntentKind::Metric => {
            let (Some(component), Some(field), Some(range)) = (&intent.metric_component, &intent.metric_field, intent.metric_range) else {
                return IntentResult::failed(intent.name.clone(), "metric intent is missing a component, field, or range".to_string());
            };
            let outcome = metric_invariant::evaluate_metric(intent.metric_entity.as_deref(), component, field, range, manifests);
            IntentResult {
                intent_name: intent.name.clone(),
                passed: outcome.passed,
                failure_reason: outcome.failure_reason,
                trigger_tick: outcome.breach_tick,
                evidence: outcome.evidence,
            }
        }
        IntentKind::Invariant => {
            let Some(condition) = &intent.condition else {
                return IntentResult::failed(intent.name.clone(), "invariant intent is missing a condition".to_string());
            };
            let outcome = metric_invariant::evaluate_invariant(condition, manifests);
            IntentResult {
                intent_name: intent.name.clone(),
                passed: outcome.passed,
                failure_reason: outcome.failure_reason,
                trigger_tick: outcome.breach_tick,
                evidence: outcome.evidence,
            }
        }
    }
}

// ============================================================================
// SECTION: VerificationReport
// ============================================================================

/// The full result of one `verify()` call.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationReport {
    /// The suite's name.
    pub suite_name: String,
    /// Total intents (and physics checks) evaluated.
    pub total: usize,
    /// Count of passing results.
    pub passed: usize,
    /// Count of failing results.
    pub failed: usize,
    /// Every individual result, in evaluation order.
    pub results: Vec<IntentResult>,
    /// Wall-clock duration of the `verify()` call, in milliseconds.
    pub wall_time_ms: u64,
    /// Number of manifests examined.
    pub ticks_examined: usize,
}

impl VerificationReport {
    /// Returns `true` if every result passed.
    #[must_use]
    pub const fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Returns every failing result, in evaluation order.
    #[must_use]
    pub fn failures(&self) -> Vec<&IntentResult> {
        self.results.iter().filter(|result| !result.passed).collect()
    }

    /// A short human line-per-intent listing.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut lines = vec![format!(
            "{}: {}/{} passed ({} ms, {} ticks)",
            self.suite_name, self.passed, self.total, self.wall_time_ms, self.ticks_examined
        )];
        for result in &self.results {
            let status = if result.passed { "PASS" } else { "FAIL" };
            match &result.failure_reason {
                Some(reason) if !result.passed => lines.push(format!("  [{status}] {}: {reason}", result.intent_name)),
                _ => lines.push(format!("  [{status}] {}", result.intent_name)),
            }
        }
        lines.join("\n")
    }

    /// An AI-readable narrative dump: every failure's reason, the first
    /// three evidence changes, and the first five causal steps for each
    /// piece of evidence's `(entity_id, component)` pair.
    #[must_use]
    pub fn diagnosis(&self, manifests: &[TickManifest]) -> String {
        let mut sections = Vec::new();
        for result in self.failures() {
            let mut section = vec![format!("intent {:?} failed: {}", result.intent_name, result.failure_reason.as_deref().unwrap_or("unknown reason"))];
            for change in result.evidence.iter().take(3) {
                section.push(format!(
                    "  evidence: {} on entity {} changed by system {} at tick {}",
                    change.component_type_name, change.entity_id, change.changed_by_system, change.tick
                ));
                let chain = crate::causal_chain::build(manifests, change.entity_id, &change.component_type_name);
                for step in chain.steps.iter().take(5) {
                    section.push(format!("    causal step: {}", step.description));
                }
            }
            sections.push(section.join("\n"));
        }
        if sections.is_empty() {
            return format!("{}: no failures", self.suite_name);
        }
        sections.join("\n\n")
    }

    /// Classifies every failure's `failure_reason` text into a
    /// [`SuggestedFix`]. Classification is a stable pattern match on the
    /// fixed phrases the entity, behavior, and metric/invariant evaluators
    /// produce.
    #[must_use]
    pub fn suggested_fixes(&self) -> Vec<SuggestedFix> {
        self.failures().iter().map(|result| SuggestedFix::classify(result)).collect()
    }
}

// ============================================================================
// SECTION: SuggestedFix
// ============================================================================

/// A heuristic classification of why an intent failed, for surfacing to a
/// suite author (or an AI agent) alongside the raw diagnosis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixType {
    /// The entity evaluator (H) could not find a matching role.
    EntityNotFound,
    /// The behavior evaluator (F) never observed the trigger fire.
    TriggerNeverFired,
    /// The behavior evaluator (F) found the trigger but ran out of window.
    Timeout,
    /// A metric or invariant bound was breached by an observed value.
    WrongValue,
    /// No known phrase matched; the raw reason should be read directly.
    Unknown,
}

/// One suggested fix, attached to a single failed intent.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestedFix {
    /// The failing intent's name.
    pub intent_name: String,
    /// The heuristic classification.
    pub fix_type: FixType,
    /// A human-readable description, copied from the failure reason.
    pub description: String,
    /// A coarse urgency ranking; lower is more urgent.
    pub priority: u8,
}

impl SuggestedFix {
    /// Classifies a single failed result's reason text into a fix type.
    fn classify(result: &IntentResult) -> Self {
        let reason = result.failure_reason.as_deref().unwrap_or_default();
        let fix_type = if reason.contains("no entity found") {
            FixType::EntityNotFound
        } else if reason.contains("never fired") || reason.contains("child trigger never fired") {
            FixType::TriggerNeverFired
        } else if reason.contains("delay exceeds") || reason.contains("not met within") {
            FixType::Timeout
        } else if reason.contains("out of range") || reason.contains("violates") || reason.contains("invalid condition") {
            FixType::WrongValue
        } else {
            FixType::Unknown
        };
        let priority = match fix_type {
            FixType::EntityNotFound => 1,
            FixType::TriggerNeverFired => 2,
            FixType::Timeout => 3,
            FixType::WrongValue => 2,
            FixType::Unknown => 4,
        };
        Self { intent_name: result.intent_name.clone(), fix_type, description: reason.to_string(), priority }
    }
}

#[cfg(test)]
mod tests {
    use super::FixType;
    use super::VerificationEngine;
    use crate::dsl::Expected;
    use crate::dsl::IntentKind;
    use crate::dsl::IntentSpec;
    use crate::dsl::Trigger;
    use crate::dsl::VerificationSuite;
    use crate::model::EntityEntry;
    use crate::model::EntityId;
    use crate::model::Tick;
    use crate::model::TickManifest;

    fn entity_intent(name: &str, role: &str) -> IntentSpec {
        IntentSpec {
            name: name.to_string(),
            kind: IntentKind::Entity,
            description: String::new(),
            entity_type: None,
            entity_role: Some(role.to_string()),
            must_exist: true,
            must_be_visible: false,
            required_components: Vec::new(),
            trigger: None,
            expected: None,
            timeout_ticks: crate::dsl::DEFAULT_TIMEOUT_TICKS,
            metric_entity: None,
            metric_component: None,
            metric_field: None,
            metric_range: None,
            condition: None,
        }
    }

    #[test]
    fn verify_reports_pass_and_fail_counts() {
        let manifest = TickManifest {
            entity_spawns: vec![EntityEntry {
                entity_id: EntityId::new(1),
                tier: "actor".to_string(),
                entity_type: "ball".to_string(),
                role: "ball".to_string(),
                alive: true,
                spawned_at_tick: Tick::new(0),
                despawned_at_tick: None,
            }],
            ..TickManifest::default()
        };
        let suite = VerificationSuite {
            name: "smoke".to_string(),
            description: String::new(),
            intents: vec![entity_intent("ball exists", "ball"), entity_intent("ghost exists", "ghost")],
        };
        let report = VerificationEngine::new().verify(&suite, std::slice::from_ref(&manifest));
        assert_eq!(report.total, 2);
        assert_eq!(report.passed, 1);
        assert_eq!(report.failed, 1);
        assert!(!report.all_passed());
    }

    #[test]
    fn unresolved_behavior_yields_trigger_never_fired_fix() {
        let intent = IntentSpec {
            trigger: Some(Trigger::TickReached { tick: 99 }),
            expected: Some(Expected::EventEmitted { event_type: "none".to_string(), involving: None }),
            ..entity_intent("late trigger", "ball")
        };
        let mut intent = intent;
        intent.kind = IntentKind::Behavior;
        let suite = VerificationSuite { name: "s".to_string(), description: String::new(), intents: vec![intent] };
        let manifest = TickManifest { ..TickManifest::default() };
        let report = VerificationEngine::new().verify(&suite, std::slice::from_ref(&manifest));
        let fixes = report.suggested_fixes();
        assert_eq!(fixes.len(), 1);
        assert_eq!(fixes[0].fix_type, FixType::TriggerNeverFired);
    }

    #[test]
    fn diagnosis_reports_no_failures_when_all_pass() {
        let manifest = TickManifest {
            entity_spawns: vec![EntityEntry {
                entity_id: EntityId::new(1),
                tier: "actor".to_string(),
                entity_type: "ball".to_string(),
                role: "ball".to_string(),
                alive: true,
                spawned_at_tick: Tick::new(0),
                despawned_at_tick: None,
            }],
            ..TickManifest::default()
        };
        let suite = VerificationSuite { name: "s".to_string(), description: String::new(), intents: vec![entity_intent("ball exists", "ball")] };
        let report = VerificationEngine::new().verify(&suite, std::slice::from_ref(&manifest));
        assert!(report.diagnosis(std::slice::from_ref(&manifest)).contains("no failures"));
    }

    #[test]
    fn unknown_condition_classifies_as_wrong_value() {
        let mut intent = entity_intent("bad invariant", "ball");
        intent.kind = IntentKind::Invariant;
        intent.condition = Some("entity_count ~~ nonsense".to_string());
        let suite = VerificationSuite { name: "s".to_string(), description: String::new(), intents: vec![intent] };
        let report = VerificationEngine::new().verify(&suite, &[TickManifest::default()]);
        let fixes = report.suggested_fixes();
        assert_eq!(fixes[0].fix_type, FixType::WrongValue);
    }
}
