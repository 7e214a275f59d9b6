// verity-core/src/causal_chain.rs
// ============================================================================
// Module: Causal Chain Construction
// Description: On-demand reverse-time trace of a component's mutation
//              history.
// Purpose: Back `VerificationReport::diagnosis()`'s "why" narratives.
// Dependencies: crate::model
// ============================================================================

//! ## Overview
//! A [`crate::model::CausalChain`] is never persisted implicitly:
//! it is built on demand from a manifest sequence by [`build`], which scans
//! every matching `ComponentChange` and orders the resulting steps
//! most-recent-first.

use crate::model::CausalChain;
use crate::model::CausalStep;
use crate::model::EntityId;
use crate::model::TickManifest;

/// Builds the causal chain for `(entity_id, component)` from `manifests`,
/// most-recent-first.
#[must_use]
pub fn build(manifests: &[TickManifest], entity_id: EntityId, component: &str) -> CausalChain {
    let mut steps: Vec<CausalStep> = manifests
        .iter()
        .flat_map(|manifest| &manifest.component_changes)
        .filter(|change| change.entity_id == entity_id && change.component_type_name == component)
        .map(|change| CausalStep {
            tick: change.tick,
            command_index: change.command_index,
            system_id: change.changed_by_system,
            reason: change.reason.clone(),
            description: describe(change),
        })
        .collect();
    steps.reverse();
    CausalChain { entity_id, component: component.to_string(), steps }
}

/// Renders one human-readable line for a causal step.
fn describe(change: &crate::model::ComponentChange) -> String {
    format!(
        "{} changed by system {} at tick {}: {} -> {}",
        change.component_type_name,
        change.changed_by_system,
        change.tick,
        change.old_value.as_ref().map_or("∅".to_string(), ToString::to_string),
        change.new_value.as_ref().map_or("∅".to_string(), ToString::to_string),
    )
}
