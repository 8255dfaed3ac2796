//! Engine configuration
//!
//! Every knob has a default matching the documented protocol, so
//! `EngineConfig::default()` is always a valid configuration. JSON overrides
//! may be partial: missing fields keep their defaults.

use crate::{EquateError, EquateResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Limits on expression input, enforced by the parser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpressionLimits {
    /// Maximum expression length in characters
    /// Real usage: ~20 characters, Limit: 1000 (50x)
    pub max_expression_length: usize,

    /// Maximum nesting depth of parentheses and operators
    /// Real usage: ~3 levels, Limit: 100 (30x+)
    pub max_expression_depth: usize,
}

impl Default for ExpressionLimits {
    fn default() -> Self {
        Self {
            max_expression_length: 1000,
            max_expression_depth: 100,
        }
    }
}

/// Parameters of the equivalence protocol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EquivalenceConfig {
    /// Number of randomized substitution trials
    pub trials: u32,

    /// Absolute difference below which two numbers count as equal
    pub tolerance: f64,

    /// Fraction of passing trials needed for a medium-confidence match
    pub supermajority: f64,

    /// Smallest integer sampled for a free variable
    pub sample_min: i64,

    /// Largest integer sampled for a free variable
    pub sample_max: i64,

    /// Compare simplified canonical forms before running trials
    pub canonical_form: bool,
}

impl Default for EquivalenceConfig {
    fn default() -> Self {
        Self {
            trials: 5,
            tolerance: 1e-10,
            supermajority: 0.8,
            sample_min: -10,
            sample_max: 10,
            canonical_form: true,
        }
    }
}

/// Parameters of the semantic-validator escalation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EscalationConfig {
    /// Time allowed for one validator call, in milliseconds
    pub timeout_ms: u64,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self { timeout_ms: 10_000 }
    }
}

impl EscalationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Scoring constants for turning a verdict into a grade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradingPolicy {
    /// Base score for an equivalent, high-confidence verdict
    pub high_confidence_score: f64,
    /// Base score for an equivalent, medium-confidence verdict
    pub medium_confidence_score: f64,
    /// Deducted once per hint used
    pub hint_penalty: f64,
    /// Attempts allowed before the attempt penalty applies
    pub attempt_allowance: u32,
    /// Deducted once when attempts exceed the allowance
    pub attempt_penalty: f64,
    /// Final score at or above which mastery is high
    pub high_mastery_threshold: f64,
    /// Final score at or above which mastery is medium
    pub medium_mastery_threshold: f64,
}

impl Default for GradingPolicy {
    fn default() -> Self {
        Self {
            high_confidence_score: 1.0,
            medium_confidence_score: 0.7,
            hint_penalty: 0.1,
            attempt_allowance: 3,
            attempt_penalty: 0.1,
            high_mastery_threshold: 0.7,
            medium_mastery_threshold: 0.4,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub limits: ExpressionLimits,
    pub equivalence: EquivalenceConfig,
    pub escalation: EscalationConfig,
    pub grading: GradingPolicy,
}

impl EngineConfig {
    /// Create a new EngineConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a (possibly partial) JSON document and validate the result
    pub fn from_json_str(json: &str) -> EquateResult<Self> {
        let config: EngineConfig = serde_json::from_str(json)
            .map_err(|e| EquateError::Config(format!("Invalid configuration JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> EquateResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Reject values that would make the protocol meaningless
    pub fn validate(&self) -> EquateResult<()> {
        let eq = &self.equivalence;
        if eq.trials == 0 {
            return Err(EquateError::Config(
                "equivalence.trials must be at least 1".to_string(),
            ));
        }
        if !(eq.tolerance.is_finite() && eq.tolerance > 0.0) {
            return Err(EquateError::Config(format!(
                "equivalence.tolerance must be a positive number, got {}",
                eq.tolerance
            )));
        }
        if !(eq.supermajority > 0.0 && eq.supermajority <= 1.0) {
            return Err(EquateError::Config(format!(
                "equivalence.supermajority must be in (0, 1], got {}",
                eq.supermajority
            )));
        }
        if eq.sample_min > eq.sample_max {
            return Err(EquateError::Config(format!(
                "equivalence.sample_min ({}) exceeds sample_max ({})",
                eq.sample_min, eq.sample_max
            )));
        }

        if self.limits.max_expression_length == 0 || self.limits.max_expression_depth == 0 {
            return Err(EquateError::Config(
                "expression limits must be greater than zero".to_string(),
            ));
        }

        let g = &self.grading;
        let scores = [
            ("high_confidence_score", g.high_confidence_score),
            ("medium_confidence_score", g.medium_confidence_score),
            ("high_mastery_threshold", g.high_mastery_threshold),
            ("medium_mastery_threshold", g.medium_mastery_threshold),
        ];
        for (name, value) in scores {
            if !(0.0..=1.0).contains(&value) {
                return Err(EquateError::Config(format!(
                    "grading.{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        if g.hint_penalty < 0.0 || g.attempt_penalty < 0.0 {
            return Err(EquateError::Config(
                "grading penalties cannot be negative".to_string(),
            ));
        }
        if g.medium_mastery_threshold > g.high_mastery_threshold {
            return Err(EquateError::Config(
                "grading.medium_mastery_threshold exceeds high_mastery_threshold".to_string(),
            ));
        }

        Ok(())
    }
}
