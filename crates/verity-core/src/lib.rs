// verity-core/src/lib.rs
// ============================================================================
// Module: Verity Core Library
// Description: Public API surface for the simulation verification engine.
// Purpose: Expose the manifest model, intent DSL, evaluators, engine,
//          physics sanity checks, and regression harness.
// Dependencies: crate::{causal_chain, comparator, dsl, engine, error, eval,
//               model, physics, regression, snapshot}
// ============================================================================

//! ## Overview
//! Verity turns a declarative suite of `Trigger -> Expected` intents into
//! pass/fail verdicts over a recorded sequence of simulation ticks
//! (`TickManifest`s). It never touches a live simulator: everything here
//! is a pure function of the manifest sequence it's handed.
//!
//! The typical flow: build a [`dsl::VerificationSuite`] of
//! [`dsl::IntentSpec`]s, run it through [`engine::VerificationEngine::verify`]
//! against a `Vec<model::TickManifest>`, then inspect the resulting
//! [`engine::VerificationReport`] — `summary()` for a human, `diagnosis()`
//! for an AI agent, `suggested_fixes()` for a classification pass.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod causal_chain;
pub mod comparator;
pub mod dsl;
pub mod engine;
pub mod error;
pub mod eval;
pub mod model;
pub mod physics;
pub mod regression;
pub mod snapshot;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use dsl::Expected;
pub use dsl::IntentKind;
pub use dsl::IntentSpec;
pub use dsl::Relation;
pub use dsl::Trigger;
pub use dsl::VerificationSuite;
pub use engine::FixType;
pub use engine::IntentResult;
pub use engine::SuggestedFix;
pub use engine::VerificationEngine;
pub use engine::VerificationReport;
pub use error::ConditionError;
pub use error::RegressionError;
pub use error::SnapshotError;
pub use error::VerifyError;
pub use error::WireError;
pub use model::Aggregates;
pub use model::CausalChain;
pub use model::CausalReason;
pub use model::CausalStep;
pub use model::ComponentChange;
pub use model::EntityEntry;
pub use model::EntityId;
pub use model::GameEvent;
pub use model::SystemId;
pub use model::Tick;
pub use model::TickManifest;
pub use physics::BodyConfig;
pub use physics::BodyType;
pub use physics::EngineConfig;
pub use physics::PhysicsRegistry;
pub use physics::run_sanity_checks;
pub use regression::RegressionTest;
pub use regression::ReplayResult;
pub use snapshot::EngineSnapshot;
pub use snapshot::KernelReplayResult;
pub use snapshot::ReplayDivergence;
pub use snapshot::ReplayLog;
