// Unit Domain Model - one piece of work inside a queue item

use serde::{Deserialize, Serialize};

/// Raw input for one unit of work (e.g. one visual description)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitInput(String);

impl UnitInput {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

/// Outcome of one unit for one processing attempt.
///
/// Every input unit yields exactly one result, success or failure; a
/// failing unit is recorded, never dropped from the result set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitResult {
    pub input: UnitInput,
    /// May be empty when enrichment yielded nothing usable
    pub refined_instruction: String,
    /// Public refs of stored artifacts; empty on failure
    pub artifacts: Vec<String>,
    /// Why generation degraded or failed for this unit
    pub error_message: Option<String>,
}

impl UnitResult {
    /// Unit generated artifacts (possibly zero, if every download was skipped)
    pub fn generated(input: UnitInput, refined_instruction: String, artifacts: Vec<String>) -> Self {
        Self {
            input,
            refined_instruction,
            artifacts,
            error_message: None,
        }
    }

    /// Unit produced nothing but did not fail (blank input or blank enrichment)
    pub fn degraded(input: UnitInput) -> Self {
        Self {
            input,
            refined_instruction: String::new(),
            artifacts: Vec::new(),
            error_message: None,
        }
    }

    /// Unit failed; the error is recorded and processing moves on
    pub fn failed(input: UnitInput, error_message: impl Into<String>) -> Self {
        Self {
            input,
            refined_instruction: String::new(),
            artifacts: Vec::new(),
            error_message: Some(error_message.into()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error_message.is_some()
    }
}
