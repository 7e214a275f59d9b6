// system-tests/tests/breakout_behaviors.rs
// ============================================================================
// Module: Breakout-Style Behavior Scenarios
// Description: End-to-end checks of the six named Behavior/Entity/Metric
//              scenarios against hand-built manifest sequences.
// Purpose: Pin `VerificationEngine::verify` at the whole-suite level, not
//          just per-evaluator.
// Dependencies: verity-core, support
// ============================================================================

mod support;

use verity_core::Expected;
use verity_core::IntentKind;
use verity_core::Relation;
use verity_core::Trigger;
use verity_core::VerificationEngine;
use verity_core::VerificationSuite;
use verity_core::comparator::Operator;

use support::BALL;
use support::BRICK;

fn wall_bounce_trigger() -> Trigger {
    Trigger::Collision { a: "ball".to_string(), b: "wall".to_string() }
}

fn wall_bounce_expected() -> Expected {
    Expected::ValueRelation {
        entity: Some("ball".to_string()),
        component: "velocity".to_string(),
        field: "dx".to_string(),
        relation: Relation::SignFlipped,
        tolerance: 0.0,
    }
}

#[test]
fn wall_bounce_passes_when_velocity_flips_within_window() {
    let ball = verity_core::EntityId::new(BALL);
    let wall = verity_core::EntityId::new(BALL + 100);
    let manifests = vec![
        support::collision_event(0, "ball", "wall", vec![ball]),
        support::velocity_change_manifest(1, ball, wall, -4.0, 4.0),
    ];
    let suite = VerificationSuite {
        name: "breakout".to_string(),
        description: String::new(),
        intents: vec![support::behavior_intent(
            "ball_bounces_off_wall",
            wall_bounce_trigger(),
            wall_bounce_expected(),
            10,
        )],
    };
    let report = VerificationEngine::new().verify(&suite, &manifests);
    assert!(report.all_passed(), "{}", report.summary());
}

#[test]
fn missing_bounce_fails_with_timeout_reason() {
    let ball = verity_core::EntityId::new(BALL);
    let manifests = vec![
        support::collision_event(0, "ball", "wall", vec![ball]),
        verity_core::TickManifest { tick: verity_core::Tick::new(1), ..verity_core::TickManifest::default() },
    ];
    let suite = VerificationSuite {
        name: "breakout".to_string(),
        description: String::new(),
        intents: vec![support::behavior_intent(
            "ball_bounces_off_wall",
            wall_bounce_trigger(),
            wall_bounce_expected(),
            2,
        )],
    };
    let report = VerificationEngine::new().verify(&suite, &manifests);
    assert!(!report.all_passed());
    assert_eq!(report.failures().len(), 1);
}

#[test]
fn brick_destruction_requires_despawn_and_aggregate_drop() {
    let ball = verity_core::EntityId::new(BALL);
    let brick = verity_core::EntityId::new(BRICK);
    let trigger = Trigger::EventOccurred {
        event_type: "collision".to_string(),
        involving: Some(vec!["ball".to_string(), "brick".to_string()]),
    };
    let expected = Expected::All(vec![
        Expected::EntityDespawned { entity: "brick".to_string() },
        Expected::AggregateChanged { aggregate_type: "brick".to_string(), op: Operator::Lt, value: 5.0 },
    ]);
    let hit = support::collision_event(0, "ball", "brick", vec![ball, brick]);
    let mut aftermath = support::aggregate_manifest(1, "brick", 4.0);
    aftermath.entity_despawns.push(verity_core::EntityEntry {
        entity_id: brick,
        tier: "obstacle".to_string(),
        entity_type: "brick".to_string(),
        role: "brick".to_string(),
        alive: false,
        spawned_at_tick: verity_core::Tick::new(0),
        despawned_at_tick: Some(verity_core::Tick::new(1)),
    });
    let manifests = vec![hit, aftermath];
    let suite = VerificationSuite {
        name: "breakout".to_string(),
        description: String::new(),
        intents: vec![support::behavior_intent("brick_destroyed", trigger, expected, 5)],
    };
    let report = VerificationEngine::new().verify(&suite, &manifests);
    assert!(report.all_passed(), "{}", report.summary());
}

#[test]
fn game_won_fires_when_brick_count_reaches_zero() {
    let trigger =
        Trigger::AggregateCondition { aggregate_type: "brick".to_string(), op: Operator::Eq, value: 0.0 };
    let expected = Expected::InState {
        entity: "game".to_string(),
        component: "game_state".to_string(),
        state: serde_json::json!("won"),
    };
    let cleared = support::aggregate_manifest(0, "brick", 0.0);
    let mut celebration = support::aggregate_manifest(1, "brick", 0.0);
    celebration.component_changes.push(verity_core::ComponentChange {
        entity_id: verity_core::EntityId::new(99),
        component_type_name: "game_state".to_string(),
        old_value: Some(serde_json::json!("playing")),
        new_value: Some(serde_json::json!("won")),
        changed_by_system: verity_core::SystemId::UNKNOWN,
        reason: verity_core::CausalReason::GameRule("all bricks cleared".to_string()),
        command_index: 0,
        tick: verity_core::Tick::new(1),
    });
    let manifests = vec![cleared, celebration];
    let suite = VerificationSuite {
        name: "breakout".to_string(),
        description: String::new(),
        intents: vec![support::behavior_intent("game_won", trigger, expected, 5)],
    };
    let report = VerificationEngine::new().verify(&suite, &manifests);
    assert!(report.all_passed(), "{}", report.summary());
}

#[test]
fn metric_breach_reports_out_of_range_value() {
    let ball = verity_core::EntityId::new(BALL);
    let manifest = verity_core::TickManifest {
        tick: verity_core::Tick::new(0),
        component_changes: vec![verity_core::ComponentChange {
            entity_id: ball,
            component_type_name: "velocity".to_string(),
            old_value: Some(serde_json::json!({"dx": 5.0})),
            new_value: Some(serde_json::json!({"dx": 15.0})),
            changed_by_system: verity_core::SystemId::UNKNOWN,
            reason: verity_core::CausalReason::SystemInternal("speed boost".to_string()),
            command_index: 0,
            tick: verity_core::Tick::new(0),
        }],
        ..verity_core::TickManifest::default()
    };
    let suite = VerificationSuite {
        name: "breakout".to_string(),
        description: String::new(),
        intents: vec![support::metric_intent("ball_speed_bounded", "velocity", "dx", (-10.0, 10.0))],
    };
    let report = VerificationEngine::new().verify(&suite, &[manifest]);
    assert!(!report.all_passed());
    let failure = &report.failures()[0];
    assert_eq!(failure.failure_reason.as_deref().expect("reason"), "15.0 out of range [-10.0,10.0]");
}

#[test]
fn entity_intent_fails_cleanly_when_role_never_spawns() {
    let suite = VerificationSuite {
        name: "breakout".to_string(),
        description: String::new(),
        intents: vec![support::entity_intent("paddle_exists", "paddle")],
    };
    let report = VerificationEngine::new().verify(&suite, &[support::tick0_spawn_ball()]);
    assert!(!report.all_passed());
    assert_eq!(suite.intents[0].kind, IntentKind::Entity);
}
