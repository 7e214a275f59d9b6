// verity-core/src/regression.rs
// ============================================================================
// Module: Regression Harness (L)
// Description: Freeze a suite/manifests/expected-outcome triple, persist
//              it, and replay it later to detect drift.
// Purpose: Catch behavior changes in the simulator or the verifier itself.
// Dependencies: crate::{dsl, engine, error, model}, serde_json, std::fs
// ============================================================================

//! ## Overview
//! A [`RegressionTest`] captures the expected pass/fail counts from a
//! `VerificationReport` at the time it was created; it does
//! not capture the individual results, so replay compares only aggregate
//! counts, not a result-by-result diff. `replay` re-runs the engine from
//! scratch — the harness holds no evaluator state of its own.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use crate::dsl::VerificationSuite;
use crate::engine::VerificationEngine;
use crate::engine::VerificationReport;
use crate::error::RegressionError;
use crate::model::TickManifest;

/// A frozen verification run: a suite, the manifests it was run against,
/// and the pass/fail counts it's expected to reproduce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTest {
    /// A stable, human-readable name for this regression test.
    pub name: String,
    /// The suite to re-run.
    pub suite: VerificationSuite,
    /// The manifest sequence to re-run it against.
    pub manifests: Vec<TickManifest>,
    /// The pass count captured at creation time.
    pub expected_pass_count: usize,
    /// The fail count captured at creation time.
    pub expected_fail_count: usize,
}

impl RegressionTest {
    /// Captures `expected_pass_count`/`expected_fail_count` from `report`.
    #[must_use]
    pub fn create(name: String, suite: VerificationSuite, manifests: Vec<TickManifest>, report: &VerificationReport) -> Self {
        Self { name, suite, manifests, expected_pass_count: report.passed, expected_fail_count: report.failed }
    }

    /// Persists this regression test as JSON, creating parent directories
    /// as needed.
    ///
    /// # Errors
    /// Returns [`RegressionError`] on I/O or serialization failure.
    pub fn save(&self, path: &Path) -> Result<(), RegressionError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Loads a regression test previously written by [`Self::save`].
    ///
    /// # Errors
    /// Returns [`RegressionError`] on I/O or deserialization failure.
    pub fn load(path: &Path) -> Result<Self, RegressionError> {
        let bytes = fs::read(path)?;
        let test = serde_json::from_slice(&bytes)?;
        Ok(test)
    }

    /// Re-runs `engine.verify` over this test's suite and manifests (or
    /// `manifests_override`, if given) and compares the resulting counts
    /// against the frozen expectation.
    #[must_use]
    pub fn replay(&self, engine: &VerificationEngine, manifests_override: Option<&[TickManifest]>) -> ReplayResult {
        let manifests = manifests_override.unwrap_or(&self.manifests);
        let report = engine.verify(&self.suite, manifests);
        let passed = report.passed == self.expected_pass_count && report.failed == self.expected_fail_count;
        let reason = if passed {
            None
        } else {
            Some(format!(
                "drift detected: expected {}/{} pass/fail, got {}/{}",
                self.expected_pass_count, self.expected_fail_count, report.passed, report.failed
            ))
        };
        ReplayResult {
            passed,
            reason,
            expected_passed: self.expected_pass_count,
            expected_failed: self.expected_fail_count,
            actual_passed: report.passed,
            actual_failed: report.failed,
        }
    }
}

/// The outcome of replaying a [`RegressionTest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayResult {
    /// Whether the replay reproduced the expected pass/fail counts.
    pub passed: bool,
    /// A description of the drift, set only when `passed` is `false`.
    pub reason: Option<String>,
    /// The pass count captured when this test was created.
    pub expected_passed: usize,
    /// The fail count captured when this test was created.
    pub expected_failed: usize,
    /// The pass count observed on replay.
    pub actual_passed: usize,
    /// The fail count observed on replay.
    pub actual_failed: usize,
}
