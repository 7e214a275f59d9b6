// verity-core/src/model/manifest.rs
// ============================================================================
// Module: Tick Manifest
// Description: The per-tick record of everything the simulator observed.
// Purpose: The evidence surface every evaluator reads from.
// Dependencies: crate::model::{causal, identifiers}, serde, serde_json
// ============================================================================

//! ## Overview
//! A [`TickManifest`] is the unit of evidence a simulator emits once per
//! fixed-timestep tick. A full run is a `Vec<TickManifest>` in increasing
//! tick order; nothing in this crate mutates a manifest once built, and
//! nothing here re-derives a manifest from another — every evaluator reads
//! straight off this structure.

use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::model::causal::CausalReason;
use crate::model::identifiers::EntityId;
use crate::model::identifiers::SystemId;
use crate::model::identifiers::Tick;

// ============================================================================
// SECTION: ComponentChange
// ============================================================================

/// A single observed mutation of one component field on one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentChange {
    /// The entity whose component changed.
    pub entity_id: EntityId,
    /// The component type name (e.g. `"velocity"`, `"position"`).
    pub component_type_name: String,
    /// The value before the change, or `None` if the component was just
    /// attached (no prior value to compare against) — this is "creation".
    pub old_value: Option<Value>,
    /// The value after the change, or `None` if the component was removed
    /// (destruction). `old_value` and `new_value` are never both `None`.
    pub new_value: Option<Value>,
    /// The system that performed the mutation.
    #[serde(rename = "changed_by")]
    pub changed_by_system: SystemId,
    /// Why the mutation occurred.
    pub reason: CausalReason,
    /// The index of the command within the tick that caused this change.
    pub command_index: u64,
    /// The tick at which this change was observed.
    pub tick: Tick,
}

// ============================================================================
// SECTION: GameEvent
// ============================================================================

/// A discrete, named occurrence within a tick (e.g. a collision, a score
/// change) that is not itself a component mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    /// The event's type name (e.g. `"collision"`, `"score_changed"`).
    pub event_type: String,
    /// A human-readable description of what happened.
    pub description: String,
    /// Entities involved in the event, in no particular order.
    pub involved_entities: Vec<EntityId>,
    /// The system that raised the event.
    #[serde(rename = "caused_by")]
    pub caused_by_system: SystemId,
    /// Why the event occurred.
    pub reason: CausalReason,
    /// The tick at which the event was observed.
    pub tick: Tick,
}

// ============================================================================
// SECTION: Aggregates
// ============================================================================

/// Per-tick summary counters the simulator chooses to report, plus an
/// open-ended bag of named numeric aggregates (e.g. `"score"`, `"lives"`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Aggregates {
    /// Count of live entities grouped by a simulator-defined tier label.
    #[serde(default)]
    pub entity_count_by_tier: HashMap<String, u64>,
    /// Count of live entities grouped by entity type name.
    #[serde(default)]
    pub entity_count_by_type: HashMap<String, u64>,
    /// Total count of live entities.
    #[serde(default)]
    pub total_entity_count: u64,
    /// Named numeric aggregates not covered by the fixed fields above.
    #[serde(default)]
    pub custom: HashMap<String, f64>,
}

impl Aggregates {
    /// Looks up a named aggregate, checking `custom` first and falling back
    /// to `total_entity_count` for the well-known name `"total_entity_count"`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        if let Some(value) = self.custom.get(name) {
            return Some(*value);
        }
        match name {
            "total_entity_count" => Some(self.total_entity_count as f64),
            _ => self
                .entity_count_by_type
                .get(name)
                .or_else(|| self.entity_count_by_tier.get(name))
                .map(|count| *count as f64),
        }
    }
}

// ============================================================================
// SECTION: EntityEntry
// ============================================================================

/// A snapshot of one entity's identity bookkeeping, used by the entity-index
/// fast path of [`crate::eval::entity`] lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityEntry {
    /// The entity's identifier.
    pub entity_id: EntityId,
    /// The simulator-defined tier label (e.g. `"enemy"`, `"projectile"`).
    pub tier: String,
    /// The entity type name (e.g. `"character"`, `"projectile"`).
    pub entity_type: String,
    /// The role name an intent spec looks entities up by (e.g. `"paddle"`).
    pub role: String,
    /// Whether the entity is currently alive.
    pub alive: bool,
    /// The tick at which the entity was spawned.
    pub spawned_at_tick: Tick,
    /// The tick at which the entity despawned, if it has.
    pub despawned_at_tick: Option<Tick>,
}

// ============================================================================
// SECTION: TickManifest
// ============================================================================

/// Everything observed during a single fixed-timestep tick.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TickManifest {
    /// The tick counter, monotonically non-decreasing within a run.
    pub tick: Tick,
    /// Wall-clock-independent simulation time in seconds at this tick.
    #[serde(default)]
    pub sim_time: f64,
    /// Entities spawned during this tick.
    #[serde(default)]
    pub entity_spawns: Vec<EntityEntry>,
    /// Entities that despawned during this tick.
    #[serde(default)]
    pub entity_despawns: Vec<EntityEntry>,
    /// All component mutations observed during this tick, in command order.
    #[serde(default)]
    pub component_changes: Vec<ComponentChange>,
    /// All discrete events observed during this tick.
    #[serde(default)]
    pub events: Vec<GameEvent>,
    /// The aggregate counters as of the end of this tick.
    #[serde(default)]
    pub aggregates: Aggregates,
    /// The systems that executed during this tick, in execution order.
    #[serde(default)]
    pub systems_executed: Vec<SystemId>,
    /// Total commands processed during this tick.
    #[serde(default)]
    pub commands_processed: u64,
    /// Commands that completed successfully during this tick.
    #[serde(default)]
    pub commands_succeeded: u64,
}
