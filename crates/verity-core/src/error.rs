// verity-core/src/error.rs
// ============================================================================
// Module: Error Types
// Description: Typed failure domains for wire parsing, conditions, and the
//              regression artifact.
// Purpose: One `thiserror` enum per failure domain, matching the boundary
//          each error can actually escape from.
// Dependencies: thiserror, serde_json, std::io
// ============================================================================

//! ## Overview
//! Only [`WireError`] and [`RegressionError`] are meant to propagate out of
//! this crate's public API. [`ConditionError`] is caught at the invariant
//! evaluator boundary and folded into a failed `IntentResult`; it is `pub`
//! only so callers constructing their own invariant tooling can match on it.

use thiserror::Error;

/// Errors raised while parsing an externally tagged wire payload
/// (`CausalReason`, `Trigger`, `Expected`). An unknown variant tag always
/// raises here rather than being silently dropped.
#[derive(Debug, Error)]
pub enum WireError {
    /// The `type` tag did not match any known variant for this DSL node.
    #[error("unknown {node} variant: {tag:?}")]
    UnknownVariant {
        /// The DSL node kind being parsed (`"trigger"` or `"expected"`).
        node: &'static str,
        /// The offending tag value, if one was present at all.
        tag: Option<String>,
    },
    /// A required field was missing or had the wrong JSON shape.
    #[error("malformed {node} payload: {detail}")]
    MalformedPayload {
        /// The DSL node kind being parsed.
        node: &'static str,
        /// A human-readable description of what was expected.
        detail: String,
    },
}

/// Errors raised while parsing an invariant condition string.
/// Never escapes [`crate::engine::VerificationEngine::verify`]; the
/// invariant evaluator turns this into a failed result instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConditionError {
    /// The condition string did not match any grammar production.
    #[error("invalid invariant condition: {0}")]
    Malformed(String),
    /// The condition parsed but its operator token was not recognized.
    #[error("unknown operator {0:?} in condition")]
    UnknownOperator(String),
}

/// Errors raised while persisting or loading a [`crate::regression::RegressionTest`].
#[derive(Debug, Error)]
pub enum RegressionError {
    /// The underlying file I/O failed.
    #[error("regression artifact I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// The artifact's JSON was malformed or didn't match the expected shape.
    #[error("regression artifact is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Errors raised while parsing an opaque snapshot/replay blob's advertised
/// fields (§6.4). Never raised for the fields this crate doesn't look at —
/// only `tick_counter`/`fixed_dt`/`hash`/`total_ticks` are validated.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The blob was not valid JSON, or didn't match the advertised shape.
    #[error("snapshot/replay JSON is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
    /// One of the advertised fields was absent or the wrong JSON type.
    #[error("snapshot/replay JSON missing required field: {0}")]
    MissingField(&'static str),
    /// `hash` was present but not 64 lowercase hex characters.
    #[error("snapshot hash is not 64 lowercase hex characters: {0:?}")]
    MalformedHash(String),
}

/// The `?`-propagated error subset actually reachable from
/// [`crate::engine::VerificationEngine::verify`]. Kept as a typed alias
/// rather than `Result<_, Infallible>` so the public API can grow fallible
/// paths later without a breaking change; today `verify()` never returns
/// `Err` because every internal parse failure is caught and folded into a
/// failed `IntentResult` instead.
pub type VerifyError = WireError;
