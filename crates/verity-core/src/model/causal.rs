// verity-core/src/model/causal.rs
// ============================================================================
// Module: Causal Reason & Causal Chain
// Description: Why a mutation occurred, and the reverse-time chain of why.
// Purpose: Carry causality metadata through component changes and events.
// Dependencies: crate::model::identifiers, serde
// ============================================================================

//! ## Overview
//! `CausalReason` is an externally tagged enum: on the wire it is always a
//! single-key mapping from variant name to payload. Scalar-payload variants
//! (`GameRule`, `PlayerInput`, `Timer`, `SystemInternal`) carry a bare string
//! under their key; structured-payload variants carry either a sequence
//! (`CollisionResponse`) or a nested mapping (`StateTransition`) — this falls
//! directly out of serde's default enum representation given each variant's
//! shape, so no custom `Serialize`/`Deserialize` impl is needed here.
//!
//! Evaluators never match on the variant directly; they read
//! [`CausalReason::reason_type`] and [`CausalReason::detail_text`], which
//! normalize every variant into the `(reason_type, reason_detail)` pair the
//! rest of the crate matches against. Structured payloads are compacted to
//! JSON text in the detail slot.

use serde::Deserialize;
use serde::Serialize;

use crate::model::identifiers::EntityId;
use crate::model::identifiers::SystemId;
use crate::model::identifiers::Tick;

// ============================================================================
// SECTION: CausalReason
// ============================================================================

/// The reason a component mutation or event occurred.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CausalReason {
    /// A deterministic game rule fired (e.g. `"brick_destroyed"`).
    GameRule(String),
    /// A player input command was applied (e.g. `"move_right"`).
    PlayerInput(String),
    /// A physics solver produced a collision response between two entities.
    CollisionResponse(EntityId, EntityId),
    /// A finite-state-machine component transitioned between two states.
    StateTransition {
        /// The state before the transition.
        from: String,
        /// The state after the transition.
        to: String,
    },
    /// A named timer expired (e.g. `"cooldown_expired"`).
    Timer(String),
    /// An internal system detail not otherwise categorized.
    SystemInternal(String),
}

impl CausalReason {
    /// Returns the variant name, matching the wire tag exactly.
    #[must_use]
    pub const fn reason_type(&self) -> &'static str {
        match self {
            Self::GameRule(_) => "GameRule",
            Self::PlayerInput(_) => "PlayerInput",
            Self::CollisionResponse(_, _) => "CollisionResponse",
            Self::StateTransition { .. } => "StateTransition",
            Self::Timer(_) => "Timer",
            Self::SystemInternal(_) => "SystemInternal",
        }
    }

    /// Returns the normalized detail text used by the entity-name matcher
    /// and the event/trigger evaluators. Scalar variants return their
    /// string verbatim; structured variants return compact JSON text.
    #[must_use]
    pub fn detail_text(&self) -> String {
        match self {
            Self::GameRule(detail)
            | Self::PlayerInput(detail)
            | Self::Timer(detail)
            | Self::SystemInternal(detail) => detail.clone(),
            Self::CollisionResponse(a, b) => format!("[{},{}]", a.value(), b.value()),
            Self::StateTransition { from, to } => {
                format!(r#"{{"from":"{from}","to":"{to}"}}"#)
            }
        }
    }
}

// ============================================================================
// SECTION: CausalChain
// ============================================================================

/// A single step in a causal chain: one mutation along the reverse-time
/// path back to the root cause of a component's current value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CausalStep {
    /// The tick at which this step occurred.
    pub tick: Tick,
    /// The command index within that tick.
    pub command_index: u64,
    /// The system that performed the mutation.
    pub system_id: SystemId,
    /// Why the mutation occurred.
    pub reason: CausalReason,
    /// A human-readable description of the step.
    pub description: String,
}

/// A causal chain tracing a component's history back through its mutations,
/// ordered most-recent-first. Generated on demand from manifest history;
/// never persisted implicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CausalChain {
    /// The entity the chain belongs to.
    pub entity_id: EntityId,
    /// The component whose history is traced.
    pub component: String,
    /// The steps, most-recent-first.
    pub steps: Vec<CausalStep>,
}
