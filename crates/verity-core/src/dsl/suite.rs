// verity-core/src/dsl/suite.rs
// ============================================================================
// Module: Verification Suite (B)
// Description: An ordered collection of intents plus persistence.
// Purpose: The unit the verification engine (I) evaluates in one pass.
// Dependencies: crate::dsl::intent, crate::error, serde_json, std::fs
// ============================================================================

//! ## Overview
//! Intents are evaluated in declaration order; `VerificationSuite` preserves
//! that order as a plain `Vec`. `save`/`load` give the suite the same
//! persistence convenience as the regression harness, so a suite can be
//! authored, frozen to disk, and reloaded without going through a
//! `RegressionTest` first.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use crate::dsl::intent::IntentSpec;
use crate::error::RegressionError;

/// An ordered collection of intents evaluated together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationSuite {
    /// The suite's name.
    pub name: String,
    /// A free-form description.
    #[serde(default)]
    pub description: String,
    /// The intents, evaluated in this order.
    pub intents: Vec<IntentSpec>,
}

impl VerificationSuite {
    /// Validates every intent in the suite, in order, concatenating their
    /// warnings.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        self.intents.iter().flat_map(IntentSpec::validate).collect()
    }

    /// Persists this suite as JSON, creating parent directories as needed.
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

    /// Loads a suite previously written by [`Self::save`].
    ///
    /// # Errors
    /// Returns [`RegressionError`] on I/O or deserialization failure.
    pub fn load(path: &Path) -> Result<Self, RegressionError> {
        let bytes = fs::read(path)?;
        let suite = serde_json::from_slice(&bytes)?;
        Ok(suite)
    }
}
