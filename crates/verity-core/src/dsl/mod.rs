// verity-core/src/dsl/mod.rs
// ============================================================================
// Module: Intent DSL (B)
// Description: Trigger/expected trees, the four intent kinds, and suites.
// Purpose: Re-export the DSL surface consumed by the evaluators and engine.
// Dependencies: trigger, expected, intent, suite
// ============================================================================

pub mod expected;
pub mod intent;
pub mod suite;
pub mod trigger;
mod wire_shape;

pub use expected::Expected;
pub use expected::Relation;
pub use intent::DEFAULT_TIMEOUT_TICKS;
pub use intent::IntentKind;
pub use intent::IntentSpec;
pub use suite::VerificationSuite;
pub use trigger::Trigger;
