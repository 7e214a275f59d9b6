// system-tests/tests/support/mod.rs
// ============================================================================
// Module: System Test Fixtures
// Description: Manifest and intent builders shared across the scenario
//              suites below, loosely modeled on a Breakout-style simulator.
// Purpose: Keep each scenario file focused on the behavior under test.
// Dependencies: verity-core
// ============================================================================

#![allow(dead_code, reason = "not every builder is used by every suite")]

use verity_core::Aggregates;
use verity_core::CausalReason;
use verity_core::ComponentChange;
use verity_core::EntityEntry;
use verity_core::EntityId;
use verity_core::GameEvent;
use verity_core::IntentKind;
use verity_core::IntentSpec;
use verity_core::SystemId;
use verity_core::Tick;
use verity_core::TickManifest;

pub const BALL: u64 = 1;
pub const BRICK: u64 = 2;

/// Builds a bare Entity-kind intent with only the role populated.
pub fn entity_intent(name: &str, role: &str) -> IntentSpec {
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
        timeout_ticks: verity_core::dsl::DEFAULT_TIMEOUT_TICKS,
        metric_entity: None,
        metric_component: None,
        metric_field: None,
        metric_range: None,
        condition: None,
    }
}

/// Builds a Behavior-kind intent from a trigger/expected pair.
pub fn behavior_intent(
    name: &str,
    trigger: verity_core::Trigger,
    expected: verity_core::Expected,
    timeout_ticks: u64,
) -> IntentSpec {
    IntentSpec {
        name: name.to_string(),
        kind: IntentKind::Behavior,
        description: String::new(),
        entity_type: None,
        entity_role: None,
        must_exist: true,
        must_be_visible: false,
        required_components: Vec::new(),
        trigger: Some(trigger),
        expected: Some(expected),
        timeout_ticks,
        metric_entity: None,
        metric_component: None,
        metric_field: None,
        metric_range: None,
        condition: None,
    }
}

/// Builds a Metric-kind intent constraining one component field's range.
pub fn metric_intent(name: &str, component: &str, field: &str, range: (f64, f64)) -> IntentSpec {
    IntentSpec {
        name: name.to_string(),
        kind: IntentKind::Metric,
        description: String::new(),
        entity_type: None,
        entity_role: None,
        must_exist: true,
        must_be_visible: false,
        required_components: Vec::new(),
        trigger: None,
        expected: None,
        timeout_ticks: verity_core::dsl::DEFAULT_TIMEOUT_TICKS,
        metric_entity: None,
        metric_component: Some(component.to_string()),
        metric_field: Some(field.to_string()),
        metric_range: Some(range),
        condition: None,
    }
}

/// Builds an Invariant-kind intent from a condition string.
pub fn invariant_intent(name: &str, condition: &str) -> IntentSpec {
    IntentSpec {
        name: name.to_string(),
        kind: IntentKind::Invariant,
        description: String::new(),
        entity_type: None,
        entity_role: None,
        must_exist: true,
        must_be_visible: false,
        required_components: Vec::new(),
        trigger: None,
        expected: None,
        timeout_ticks: verity_core::dsl::DEFAULT_TIMEOUT_TICKS,
        metric_entity: None,
        metric_component: None,
        metric_field: None,
        metric_range: None,
        condition: Some(condition.to_string()),
    }
}

/// A manifest with the ball spawned and nothing else.
pub fn tick0_spawn_ball() -> TickManifest {
    TickManifest {
        tick: Tick::new(0),
        entity_spawns: vec![EntityEntry {
            entity_id: EntityId::new(BALL),
            tier: "projectile".to_string(),
            entity_type: "ball".to_string(),
            role: "ball".to_string(),
            alive: true,
            spawned_at_tick: Tick::new(0),
            despawned_at_tick: None,
        }],
        ..TickManifest::default()
    }
}

/// A manifest recording a `"collision"` event between `a` and `b`, with no
/// accompanying component changes.
pub fn collision_event(tick: u64, a: &str, b: &str, involved: Vec<EntityId>) -> TickManifest {
    TickManifest {
        tick: Tick::new(tick),
        events: vec![GameEvent {
            event_type: "collision".to_string(),
            description: format!("{a} hit {b}"),
            involved_entities: involved,
            caused_by_system: SystemId::UNKNOWN,
            reason: CausalReason::GameRule(format!("{a}:{b}")),
            tick: Tick::new(tick),
        }],
        ..TickManifest::default()
    }
}

/// A manifest recording a velocity component change on `entity_id` from
/// `(old_dx, old_dy)` to `(new_dx, new_dy)`, attributed to a collision
/// response between `entity_id` and `other`.
pub fn velocity_change_manifest(
    tick: u64,
    entity_id: EntityId,
    other: EntityId,
    old_dx: f64,
    new_dx: f64,
) -> TickManifest {
    TickManifest {
        tick: Tick::new(tick),
        component_changes: vec![ComponentChange {
            entity_id,
            component_type_name: "velocity".to_string(),
            old_value: Some(serde_json::json!({"dx": old_dx, "dy": 0.0})),
            new_value: Some(serde_json::json!({"dx": new_dx, "dy": 0.0})),
            changed_by_system: SystemId::UNKNOWN,
            reason: CausalReason::CollisionResponse(entity_id, other),
            command_index: 0,
            tick: Tick::new(tick),
        }],
        ..TickManifest::default()
    }
}

/// A manifest with `total_entity_count` and one named aggregate set, no
/// events or component changes of its own.
pub fn aggregate_manifest(tick: u64, name: &str, value: f64) -> TickManifest {
    let mut aggregates = Aggregates::default();
    aggregates.custom.insert(name.to_string(), value);
    TickManifest { tick: Tick::new(tick), aggregates, ..TickManifest::default() }
}
