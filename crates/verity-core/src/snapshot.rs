// verity-core/src/snapshot.rs
// ============================================================================
// Module: Snapshot/Replay Pass-Through (§6.4)
// Description: Typed access to a handful of advertised fields on the
//              simulation kernel's opaque snapshot/replay blobs.
// Purpose: Let a caller inspect `tick_counter`/`fixed_dt`/`hash` on a
//          snapshot and `total_ticks` on a replay log without this crate
//          understanding the kernel's internal schema.
// Dependencies: serde, serde_json, crate::error::SnapshotError
// ============================================================================

//! ## Overview
//! The simulation kernel's snapshot/restore and deterministic-replay
//! mechanics are out of scope for this crate (§1) — but the kernel still
//! hands the verifier opaque JSON blobs for both, and the verifier is
//! specified to read a small advertised subset of top-level fields from
//! each rather than treating them as fully opaque bytes. [`EngineSnapshot`]
//! and [`ReplayLog`] each keep the full `raw_json` alongside the fields this
//! crate actually looks at, so a caller can hand the blob straight back to
//! the kernel for restore/replay while still getting typed access to
//! `tick_counter`/`fixed_dt`/`hash`/`total_ticks`.

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::error::SnapshotError;

/// A captured engine state snapshot, carried as an opaque JSON blob plus
/// the three advertised fields the verifier is allowed to inspect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    /// Number of ticks executed when the snapshot was captured.
    pub tick_counter: u64,
    /// Fixed time step in seconds per tick.
    pub fixed_dt: f64,
    /// A 64-character lowercase hex digest of the serialized engine state.
    pub hash: String,
    /// The full JSON blob, round-tripped verbatim back to the kernel.
    pub raw_json: String,
}

impl EngineSnapshot {
    /// Parses an [`EngineSnapshot`] out of the kernel's JSON string,
    /// reading only `tick_counter`, `fixed_dt`, and `hash` and keeping the
    /// rest of the payload opaque in `raw_json`.
    ///
    /// # Errors
    /// Returns [`SnapshotError`] if `json` is not valid JSON, is missing one
    /// of the three advertised fields, or `hash` is not 64 lowercase hex
    /// characters.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let value: Value = serde_json::from_str(json)?;
        let tick_counter = value
            .get("tick_counter")
            .and_then(Value::as_u64)
            .ok_or_else(|| SnapshotError::MissingField("tick_counter"))?;
        let fixed_dt = value.get("fixed_dt").and_then(Value::as_f64).ok_or_else(|| SnapshotError::MissingField("fixed_dt"))?;
        let hash = value
            .get("hash")
            .and_then(Value::as_str)
            .ok_or_else(|| SnapshotError::MissingField("hash"))?
            .to_string();
        if !is_hex_digest(&hash) {
            return Err(SnapshotError::MalformedHash(hash));
        }
        Ok(Self { tick_counter, fixed_dt, hash, raw_json: json.to_string() })
    }
}

/// 64 lowercase hex characters, per §6.4.
fn is_hex_digest(candidate: &str) -> bool {
    candidate.len() == 64 && candidate.bytes().all(|byte| byte.is_ascii_digit() || matches!(byte, b'a'..=b'f'))
}

/// A recorded replay log: an opaque JSON blob the kernel replays, plus the
/// one advertised field the verifier inspects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayLog {
    /// Number of ticks recorded in the log.
    pub total_ticks: u64,
    /// The full JSON blob, round-tripped verbatim back to the kernel.
    pub raw_json: String,
}

impl ReplayLog {
    /// Parses a [`ReplayLog`] out of the kernel's JSON string, reading only
    /// `total_ticks` and keeping the rest opaque in `raw_json`.
    ///
    /// # Errors
    /// Returns [`SnapshotError`] if `json` is not valid JSON or is missing
    /// `total_ticks`.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let value: Value = serde_json::from_str(json)?;
        let total_ticks = value.get("total_ticks").and_then(Value::as_u64).ok_or(SnapshotError::MissingField("total_ticks"))?;
        Ok(Self { total_ticks, raw_json: json.to_string() })
    }
}

/// A single determinism-check mismatch detected while replaying a
/// [`ReplayLog`]: the kernel's recorded checkpoint hash at `tick` disagreed
/// with the hash actually computed during replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayDivergence {
    /// The tick at which the divergence was detected.
    pub tick: u64,
    /// The hash recorded in the replay log at this tick.
    pub expected_hash: String,
    /// The hash actually computed during replay at this tick.
    pub actual_hash: String,
}

/// The outcome of replaying a [`ReplayLog`] against the kernel, as reported
/// back to the verifier. Distinct from
/// [`crate::regression::ReplayResult`], which replays a *verification*
/// run rather than a *simulation* run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KernelReplayResult {
    /// Whether the replay ran to completion without divergence.
    pub completed: bool,
    /// The total number of ticks replayed.
    pub ticks_replayed: u64,
    /// The first checkpoint mismatch encountered, if any. A divergence
    /// always implies `completed == false`.
    pub first_divergence: Option<ReplayDivergence>,
}

impl KernelReplayResult {
    /// Parses a [`KernelReplayResult`] out of the kernel's JSON string.
    ///
    /// # Errors
    /// Returns [`SnapshotError`] if `json` is not valid JSON or doesn't
    /// match the expected shape.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        serde_json::from_str(json).map_err(SnapshotError::from)
    }
}
