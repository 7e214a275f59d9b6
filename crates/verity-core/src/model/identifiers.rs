// verity-core/src/model/identifiers.rs
// ============================================================================
// Module: Manifest Identifiers
// Description: Canonical numeric identifiers for entities, systems, and ticks.
// Purpose: Provide strongly typed, serializable IDs with stable wire shapes.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Entities, systems, and ticks are all unsigned integers on the wire, but
//! keeping them as bare `u64`/`u32` throughout the crate invites mixing them
//! up at call sites. These newtypes are `#[serde(transparent)]` so they
//! serialize identically to the bare integer, but accept either a bare
//! integer or a single-keyed integer map on the way in — simulator encodings
//! vary by newtype transparency (see [`crate::model::wire`]).

use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

use crate::model::wire::deserialize_u64_or_keyed_map;
use crate::model::wire::deserialize_u32_or_keyed_map;

/// Stable identifier for an entity, unique within a run and never reused
/// once allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct EntityId(u64);

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize_u64_or_keyed_map(deserializer).map(Self)
    }
}

impl EntityId {
    /// Creates a new entity identifier from its raw numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw numeric value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for EntityId {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

/// Identifier for the system that performed a mutation. `0` is reserved for
/// "system unknown"; well-known constants are documented by the host (e.g.
/// the guest code loader uses `100`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SystemId(u32);

impl<'de> Deserialize<'de> for SystemId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize_u32_or_keyed_map(deserializer).map(Self)
    }
}

impl SystemId {
    /// Reserved value meaning "system unknown".
    pub const UNKNOWN: Self = Self(0);

    /// Creates a new system identifier from its raw numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw numeric value.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u32> for SystemId {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl Default for SystemId {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

/// A fixed-timestep tick counter, monotonically non-decreasing within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tick(u64);

impl Tick {
    /// The initial tick of a run.
    pub const ZERO: Self = Self(0);

    /// Creates a new tick value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw numeric value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Returns the tick offset by `delta`, saturating at `u64::MAX`.
    #[must_use]
    pub const fn saturating_add(self, delta: u64) -> Self {
        Self(self.0.saturating_add(delta))
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for Tick {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

impl Default for Tick {
    fn default() -> Self {
        Self::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::EntityId;
    use super::SystemId;
    use super::Tick;

    #[test]
    fn system_id_default_is_unknown() {
        assert_eq!(SystemId::default(), SystemId::UNKNOWN);
        assert_eq!(SystemId::UNKNOWN.value(), 0);
    }

    #[test]
    fn transparent_serialization_round_trips_as_bare_integer() {
        let id = EntityId::new(42);
        let json = serde_json::to_string(&id).expect("serialize entity id");
        assert_eq!(json, "42");
        let parsed: EntityId = serde_json::from_str(&json).expect("deserialize entity id");
        assert_eq!(parsed, id);
    }

    #[test]
    fn tick_saturating_add_never_overflows() {
        let tick = Tick::new(u64::MAX);
        assert_eq!(tick.saturating_add(5), Tick::new(u64::MAX));
    }
}
