// verity-core/src/eval/entity.rs
// ============================================================================
// Module: Entity Evaluator (H)
// Description: Name→metadata lookup plus fallback scan for identity-component
//              emergence.
// Purpose: Evaluate Entity-kind intents.
// Dependencies: crate::model, std::collections::HashMap
// ============================================================================

//! ## Overview
//! Implements a two-stage lookup: the fast path checks a
//! pre-built role→entry index; the fallback scans every manifest's
//! component changes for an identity-component emergence naming the role.
//! `required_components`/`must_be_visible`/`must_exist` are recorded on the
//! intent but do not independently fail here — they are a documented
//! contract for a future evaluator to consume.

use std::collections::HashMap;

use crate::model::EntityEntry;
use crate::model::TickManifest;

/// The outcome of evaluating an Entity-kind intent.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityOutcome {
    /// Whether a matching entity was found.
    pub passed: bool,
    /// A human-readable failure reason, set only when `passed` is `false`.
    pub failure_reason: Option<String>,
}

/// Builds a passing outcome with no failure reason.
fn pass() -> EntityOutcome {
    EntityOutcome { passed: true, failure_reason: None }
}

/// Builds a role→entry index from every entity ever spawned across the run,
/// the role→entry index used by the fast-path lookup. Later spawns
/// with the same role overwrite earlier ones, matching the common case of a
/// role naming "the current instance" of a repeatedly-spawned entity kind.
#[must_use]
pub fn build_entity_index(manifests: &[TickManifest]) -> HashMap<String, EntityEntry> {
    let mut index = HashMap::new();
    for manifest in manifests {
        for entry in &manifest.entity_spawns {
            index.insert(entry.role.clone(), entry.clone());
        }
    }
    index
}

/// Evaluates an Entity intent's role lookup against the index and, failing
/// that, a fallback scan of `manifests` for an identity-component change
/// naming the role.
#[must_use]
pub fn evaluate(
    entity_role: &str,
    entity_type: Option<&str>,
    index: &HashMap<String, EntityEntry>,
    manifests: &[TickManifest],
) -> EntityOutcome {
    if let Some(entry) = index.get(entity_role) {
        if let Some(declared_type) = entity_type
            && declared_type != entry.entity_type
        {
            return EntityOutcome {
                passed: false,
                failure_reason: Some(format!(
                    "type does not match: declared {declared_type:?}, found {:?}",
                    entry.entity_type
                )),
            };
        }
        return pass();
    }

    for manifest in manifests {
        for change in &manifest.component_changes {
            let role_matches = change
                .new_value
                .as_ref()
                .and_then(|value| value.as_object())
                .and_then(|object| object.get("role"))
                .and_then(serde_json::Value::as_str)
                .is_some_and(|role| role == entity_role);
            if role_matches {
                return pass();
            }
        }
    }

    EntityOutcome {
        passed: false,
        failure_reason: Some(format!(
            "no entity found with role '{entity_role}'; consider adding a spawn command for it"
        )),
    }
}
