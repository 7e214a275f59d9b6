// verity-core/src/physics.rs
// ============================================================================
// Module: Physics Sanity Checker (J)
// Description: Registry-driven collision-response, static-immobility, and
//              no-tunneling scans.
// Purpose: Automatic, advisory checks independent of user-authored intents.
// Dependencies: crate::model, std::collections::HashMap
// ============================================================================

//! ## Overview
//! Three scans over a registry of dynamic-body configurations, each
//! yielding only *failure* results — passing bodies are
//! silent. Every result shares the shape of an [`crate::engine::IntentResult`]
//! so the report (K) can list them alongside user intents without a second
//! code path.

use std::collections::HashMap;

use crate::engine::IntentResult;
use crate::model::EntityId;
use crate::model::TickManifest;

/// The default fixed timestep used by the no-tunneling check when the
/// caller doesn't override it.
pub const DEFAULT_PHYSICS_DT: f64 = 1.0 / 60.0;

/// Tunable parameters for the physics sanity checker. `Copy` and `Default`,
/// following a small deployment-config-struct pattern scaled down to the one
/// knob this crate actually needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// The fixed timestep the no-tunneling check uses to compute its
    /// displacement bound.
    pub physics_dt: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { physics_dt: DEFAULT_PHYSICS_DT }
    }
}

/// A dynamic/kinematic/static body classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyType {
    /// Subject to forces and collision response.
    Dynamic,
    /// Moves under explicit control, not collision response.
    Kinematic,
    /// Never expected to move.
    Static,
}

/// A registered body's physics configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyConfig {
    /// The body's motion classification.
    pub body_type: BodyType,
    /// Restitution coefficient in `[0, 1]`; `0` means no bounce expected.
    pub restitution: f64,
    /// The collider's shape name, carried for diagnostics.
    pub collider_shape: String,
}

/// Maps entity IDs to their physics configuration.
pub type PhysicsRegistry = HashMap<EntityId, BodyConfig>;

/// Runs all three physics sanity scans and returns only the failures.
#[must_use]
pub fn run_sanity_checks(registry: &PhysicsRegistry, manifests: &[TickManifest], config: &EngineConfig) -> Vec<IntentResult> {
    let mut results = check_collision_bounces(registry, manifests);
    results.extend(check_static_immobility(registry, manifests));
    results.extend(check_no_tunneling(registry, manifests, config.physics_dt));
    results
}

/// Scan 1: every collision event involving a dynamic body with positive
/// restitution must be followed, within 3 ticks inclusive of the collision
/// tick, by a velocity sign flip on that entity.
fn check_collision_bounces(registry: &PhysicsRegistry, manifests: &[TickManifest]) -> Vec<IntentResult> {
    let mut failures = Vec::new();
    for (index, manifest) in manifests.iter().enumerate() {
        for event in &manifest.events {
            if event.event_type != "collision" {
                continue;
            }
            for &entity_id in &event.involved_entities {
                let Some(config) = registry.get(&entity_id) else { continue };
                if config.body_type != BodyType::Dynamic || config.restitution <= 0.0 {
                    continue;
                }
                let window_end = (index + 3).min(manifests.len());
                let bounced = manifests[index..window_end].iter().any(|window_manifest| {
                    window_manifest.component_changes.iter().any(|change| {
                        change.entity_id == entity_id
                            && change.component_type_name == "velocity"
                            && velocity_sign_flipped(change)
                    })
                });
                if !bounced {
                    failures.push(IntentResult::failed(
                        format!("physics_sanity:bounce_response(entity_{})", entity_id.value()),
                        format!(
                            "entity {entity_id} has no velocity sign flip within 3 ticks of a collision at tick {}",
                            manifest.tick
                        ),
                    ));
                }
            }
        }
    }
    failures
}

/// Checks whether a velocity change's `dx` or `dy` flipped sign.
fn velocity_sign_flipped(change: &crate::model::ComponentChange) -> bool {
    let Some(old) = &change.old_value else { return false };
    let Some(new) = &change.new_value else { return false };
    let flip = |field: &str| -> bool {
        let old_value = old.get(field).and_then(serde_json::Value::as_f64);
        let new_value = new.get(field).and_then(serde_json::Value::as_f64);
        matches!((old_value, new_value), (Some(o), Some(n)) if o * n < 0.0)
    };
    flip("dx") || flip("dy")
}

/// Scan 2: a static body must never observe a position or velocity change.
fn check_static_immobility(registry: &PhysicsRegistry, manifests: &[TickManifest]) -> Vec<IntentResult> {
    let mut failures = Vec::new();
    for manifest in manifests {
        for change in &manifest.component_changes {
            if !matches!(change.component_type_name.as_str(), "position" | "velocity") {
                continue;
            }
            let Some(config) = registry.get(&change.entity_id) else { continue };
            if config.body_type != BodyType::Static {
                continue;
            }
            let Some(old) = &change.old_value else { continue };
            if Some(old) != change.new_value.as_ref() {
                failures.push(IntentResult::failed(
                    format!("physics_sanity:static_immobility(entity_{})", change.entity_id.value()),
                    format!(
                        "Static entity {} received a {} change at tick {}",
                        change.entity_id, change.component_type_name, change.tick
                    ),
                ));
            }
        }
    }
    failures
}

/// Scan 3: a dynamic body's position can move at most `2 * |v| * dt` per
/// tick given its last known velocity, or it's flagged as tunneling.
fn check_no_tunneling(registry: &PhysicsRegistry, manifests: &[TickManifest], dt: f64) -> Vec<IntentResult> {
    let mut failures = Vec::new();
    let mut last_velocity: HashMap<EntityId, (f64, f64)> = HashMap::new();

    for manifest in manifests {
        for change in &manifest.component_changes {
            if change.component_type_name == "velocity"
                && let Some(new) = &change.new_value
            {
                let dx = new.get("dx").and_then(serde_json::Value::as_f64).unwrap_or(0.0);
                let dy = new.get("dy").and_then(serde_json::Value::as_f64).unwrap_or(0.0);
                last_velocity.insert(change.entity_id, (dx, dy));
            }
        }
        for change in &manifest.component_changes {
            if change.component_type_name != "position" {
                continue;
            }
            let Some(config) = registry.get(&change.entity_id) else { continue };
            if config.body_type != BodyType::Dynamic {
                continue;
            }
            let (Some(old), Some(new)) = (&change.old_value, &change.new_value) else { continue };
            let (old_x, old_y) = (
                old.get("x").and_then(serde_json::Value::as_f64).unwrap_or(0.0),
                old.get("y").and_then(serde_json::Value::as_f64).unwrap_or(0.0),
            );
            let (new_x, new_y) = (
                new.get("x").and_then(serde_json::Value::as_f64).unwrap_or(0.0),
                new.get("y").and_then(serde_json::Value::as_f64).unwrap_or(0.0),
            );
            let displacement = ((new_x - old_x).powi(2) + (new_y - old_y).powi(2)).sqrt();
            let (vx, vy) = last_velocity.get(&change.entity_id).copied().unwrap_or((0.0, 0.0));
            let speed = (vx * vx + vy * vy).sqrt();
            let bound = 2.0 * speed * dt;
            if displacement > bound {
                failures.push(IntentResult::failed(
                    format!("physics_sanity:no_tunneling(entity_{})", change.entity_id.value()),
                    format!(
                        "entity {} jumped {displacement:.3} units at tick {}, exceeding the tunneling bound {bound:.3} for velocity {speed:.3}",
                        change.entity_id, change.tick
                    ),
                ));
            }
        }
    }
    failures
}

#[cfg(test)]
mod tests {
    use super::BodyConfig;
    use super::BodyType;
    use super::EngineConfig;
    use super::PhysicsRegistry;
    use super::run_sanity_checks;
    use crate::model::CausalReason;
    use crate::model::ComponentChange;
    use crate::model::EntityId;
    use crate::model::GameEvent;
    use crate::model::SystemId;
    use crate::model::Tick;
    use crate::model::TickManifest;

    fn registry_with(entity_id: EntityId, body_type: BodyType, restitution: f64) -> PhysicsRegistry {
        let mut registry = PhysicsRegistry::new();
        registry.insert(
            entity_id,
            BodyConfig { body_type, restitution, collider_shape: "circle".to_string() },
        );
        registry
    }

    #[test]
    fn missing_bounce_after_collision_fails() {
        let entity_id = EntityId::new(1);
        let registry = registry_with(entity_id, BodyType::Dynamic, 1.0);
        let manifests = vec![
            TickManifest {
                tick: Tick::new(0),
                events: vec![GameEvent {
                    event_type: "collision".to_string(),
                    description: String::new(),
                    involved_entities: vec![entity_id],
                    caused_by_system: SystemId::UNKNOWN,
                    reason: CausalReason::GameRule("hit".to_string()),
                    tick: Tick::new(0),
                }],
                ..TickManifest::default()
            },
            TickManifest::default(),
            TickManifest::default(),
        ];
        let failures = run_sanity_checks(&registry, &manifests, &EngineConfig::default());
        assert_eq!(failures.len(), 1);
        assert!(failures[0].failure_reason.as_ref().expect("reason").contains("no velocity sign flip"));
    }

    #[test]
    fn static_entity_position_change_fails() {
        let entity_id = EntityId::new(2);
        let registry = registry_with(entity_id, BodyType::Static, 0.0);
        let manifest = TickManifest {
            tick: Tick::new(0),
            component_changes: vec![ComponentChange {
                entity_id,
                component_type_name: "position".to_string(),
                old_value: Some(serde_json::json!({"x": 0.0, "y": 0.0})),
                new_value: Some(serde_json::json!({"x": 1.0, "y": 0.0})),
                changed_by_system: SystemId::UNKNOWN,
                reason: CausalReason::SystemInternal("moved".to_string()),
                command_index: 0,
                tick: Tick::new(0),
            }],
            ..TickManifest::default()
        };
        let failures = run_sanity_checks(&registry, &[manifest], &EngineConfig::default());
        assert_eq!(failures.len(), 1);
        assert!(failures[0].failure_reason.as_ref().expect("reason").contains("Static"));
    }

    #[test]
    fn large_position_jump_is_flagged_as_tunneling() {
        let entity_id = EntityId::new(3);
        let registry = registry_with(entity_id, BodyType::Dynamic, 0.0);
        let manifest = TickManifest {
            tick: Tick::new(0),
            component_changes: vec![
                ComponentChange {
                    entity_id,
                    component_type_name: "velocity".to_string(),
                    old_value: Some(serde_json::json!({"dx": 1.0, "dy": 0.0})),
                    new_value: Some(serde_json::json!({"dx": 1.0, "dy": 0.0})),
                    changed_by_system: SystemId::UNKNOWN,
                    reason: CausalReason::SystemInternal("tick".to_string()),
                    command_index: 0,
                    tick: Tick::new(0),
                },
                ComponentChange {
                    entity_id,
                    component_type_name: "position".to_string(),
                    old_value: Some(serde_json::json!({"x": 0.0, "y": 0.0})),
                    new_value: Some(serde_json::json!({"x": 100.0, "y": 0.0})),
                    changed_by_system: SystemId::UNKNOWN,
                    reason: CausalReason::SystemInternal("tick".to_string()),
                    command_index: 1,
                    tick: Tick::new(0),
                },
            ],
            ..TickManifest::default()
        };
        let failures = run_sanity_checks(&registry, &[manifest], &EngineConfig::default());
        assert_eq!(failures.len(), 1);
        assert!(failures[0].failure_reason.as_ref().expect("reason").contains("tunneling") ||
            failures[0].failure_reason.as_ref().expect("reason").contains("exceeding"));
    }

    #[test]
    fn passing_bounce_yields_no_failures() {
        let entity_id = EntityId::new(4);
        let registry = registry_with(entity_id, BodyType::Dynamic, 1.0);
        let manifests = vec![
            TickManifest {
                tick: Tick::new(0),
                events: vec![GameEvent {
                    event_type: "collision".to_string(),
                    description: String::new(),
                    involved_entities: vec![entity_id],
                    caused_by_system: SystemId::UNKNOWN,
                    reason: CausalReason::GameRule("hit".to_string()),
                    tick: Tick::new(0),
                }],
                component_changes: vec![ComponentChange {
                    entity_id,
                    component_type_name: "velocity".to_string(),
                    old_value: Some(serde_json::json!({"dx": -5.0, "dy": 0.0})),
                    new_value: Some(serde_json::json!({"dx": 5.0, "dy": 0.0})),
                    changed_by_system: SystemId::UNKNOWN,
                    reason: CausalReason::CollisionResponse(entity_id, EntityId::new(9)),
                    command_index: 0,
                    tick: Tick::new(0),
                }],
                ..TickManifest::default()
            },
        ];
        assert!(run_sanity_checks(&registry, &manifests, &EngineConfig::default()).is_empty());
    }
}
