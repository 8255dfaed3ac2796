//! Tiered equivalence protocol
//!
//! Three stages, cheapest first, stopping at the first conclusive one:
//!
//! 1. exact text match after trimming
//! 2. canonical-form match via the expression service's simplifier
//! 3. numeric consensus over randomly sampled integer assignments
//!
//! Parse and evaluation failures never escape: a failing canonical stage
//! falls through to the trials, and a failing trial simply does not pass.

use crate::config::EquivalenceConfig;
use crate::expression::{ExpressionService, MathExpressionService, VariableBinding};
use crate::sampler::VariableSampler;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::High => write!(f, "high"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::Low => write!(f, "low"),
        }
    }
}

/// Outcome of comparing two answers.
///
/// A `Low` confidence `false` verdict means "inconclusive", not "proven
/// different". The engine only reports `High` together with `true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquivalenceVerdict {
    pub is_equivalent: bool,
    pub confidence: Confidence,
    pub reason: String,
}

impl EquivalenceVerdict {
    pub fn new(is_equivalent: bool, confidence: Confidence, reason: impl Into<String>) -> Self {
        Self {
            is_equivalent,
            confidence,
            reason: reason.into(),
        }
    }

    pub fn equivalent(confidence: Confidence, reason: impl Into<String>) -> Self {
        Self::new(true, confidence, reason)
    }

    pub fn not_equivalent(reason: impl Into<String>) -> Self {
        Self::new(false, Confidence::Low, reason)
    }
}

/// Trial counts from the numeric stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialTally {
    pub passed: u32,
    pub total: u32,
}

pub struct EquivalenceEngine<S: ExpressionService = MathExpressionService> {
    service: S,
    config: EquivalenceConfig,
    sampler: VariableSampler,
}

impl Default for EquivalenceEngine<MathExpressionService> {
    fn default() -> Self {
        Self::new(MathExpressionService::default(), EquivalenceConfig::default())
    }
}

impl<S: ExpressionService> EquivalenceEngine<S> {
    pub fn new(service: S, config: EquivalenceConfig) -> Self {
        let sampler = VariableSampler::new(config.sample_min, config.sample_max);
        Self {
            service,
            config,
            sampler,
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn config(&self) -> &EquivalenceConfig {
        &self.config
    }

    pub fn sampler(&self) -> &VariableSampler {
        &self.sampler
    }

    /// Compare two answers using a thread-local random generator
    pub fn check(&self, student: &str, expected: &str) -> EquivalenceVerdict {
        self.check_with_rng(student, expected, &mut rand::rng())
    }

    /// Compare two answers drawing trial values from `rng`
    pub fn check_with_rng<R: Rng>(
        &self,
        student: &str,
        expected: &str,
        rng: &mut R,
    ) -> EquivalenceVerdict {
        if student.trim() == expected.trim() {
            debug!("exact match for '{}'", student.trim());
            return EquivalenceVerdict::equivalent(Confidence::High, "Exact match");
        }

        if self.config.canonical_form {
            if let Some(verdict) = self.canonical_match(student, expected) {
                return verdict;
            }
        }

        self.numeric_consensus(student, expected, rng)
    }

    fn canonical_match(&self, student: &str, expected: &str) -> Option<EquivalenceVerdict> {
        let student_expr = self.service.parse(student).ok()?;
        let expected_expr = self.service.parse(expected).ok()?;

        let student_form = self.service.simplify(&student_expr).to_string();
        let expected_form = self.service.simplify(&expected_expr).to_string();
        if student_form == expected_form {
            debug!("canonical forms match: {}", student_form);
            return Some(EquivalenceVerdict::equivalent(
                Confidence::High,
                "Canonical forms match",
            ));
        }

        let difference = self
            .service
            .parse(&format!("({}) - ({})", student.trim(), expected.trim()))
            .ok()?;
        let simplified = self.service.simplify(&difference);
        match self.service.evaluate(&simplified, &VariableBinding::new()) {
            Ok(value) if value.abs() < self.config.tolerance => {
                debug!("difference simplifies to {}", simplified);
                Some(EquivalenceVerdict::equivalent(
                    Confidence::High,
                    "Difference simplifies to zero",
                ))
            }
            _ => None,
        }
    }

    fn numeric_consensus<R: Rng>(
        &self,
        student: &str,
        expected: &str,
        rng: &mut R,
    ) -> EquivalenceVerdict {
        let student_expr = self.service.parse(student).ok();
        let expected_expr = self.service.parse(expected).ok();

        let mut variables = std::collections::BTreeSet::new();
        for expr in [&student_expr, &expected_expr].into_iter().flatten() {
            variables.extend(self.sampler.variables_of(&self.service, expr));
        }

        if variables.is_empty() {
            return self.literal_comparison(student_expr.as_ref(), expected_expr.as_ref());
        }

        let variables: Vec<String> = variables.into_iter().collect();
        let tally = self.run_trials(
            student_expr.as_ref(),
            expected_expr.as_ref(),
            &variables,
            rng,
        );
        debug!(
            "numeric trials over {:?}: {}/{} passed",
            variables, tally.passed, tally.total
        );
        self.classify(tally)
    }

    fn literal_comparison(
        &self,
        student: Option<&S::Expr>,
        expected: Option<&S::Expr>,
    ) -> EquivalenceVerdict {
        let empty = VariableBinding::new();
        let values = student
            .zip(expected)
            .map(|(s, e)| (self.service.evaluate(s, &empty), self.service.evaluate(e, &empty)));

        match values {
            Some((Ok(a), Ok(b))) if (a - b).abs() < self.config.tolerance => {
                EquivalenceVerdict::equivalent(Confidence::High, "Numeric values match")
            }
            Some((Ok(a), Ok(b))) => {
                debug!("literal values differ: {} vs {}", a, b);
                EquivalenceVerdict::not_equivalent("Numeric values differ")
            }
            _ => EquivalenceVerdict::not_equivalent("Expressions could not be evaluated"),
        }
    }

    /// Run the configured number of substitution trials
    pub fn run_trials<R: Rng>(
        &self,
        student: Option<&S::Expr>,
        expected: Option<&S::Expr>,
        variables: &[String],
        rng: &mut R,
    ) -> TrialTally {
        let total = self.config.trials.max(1);
        let mut passed = 0;

        for _ in 0..total {
            // Sample even when a side failed to parse so the stream stays aligned
            let binding = self.sampler.sample(variables, rng);
            let (Some(student), Some(expected)) = (student, expected) else {
                continue;
            };

            let agree = match (
                self.service.evaluate(student, &binding),
                self.service.evaluate(expected, &binding),
            ) {
                (Ok(a), Ok(b)) => (a - b).abs() < self.config.tolerance,
                _ => false,
            };
            if agree {
                passed += 1;
            } else {
                debug!("trial failed at {}", binding);
            }
        }

        TrialTally { passed, total }
    }

    /// Map a trial tally onto a verdict; any failed trial forfeits `High`
    pub fn classify(&self, tally: TrialTally) -> EquivalenceVerdict {
        let TrialTally { passed, total } = tally;
        if passed == total {
            EquivalenceVerdict::equivalent(
                Confidence::High,
                "All numeric substitution checks passed",
            )
        } else if f64::from(passed) >= self.config.supermajority * f64::from(total) {
            EquivalenceVerdict::equivalent(
                Confidence::Medium,
                "Most numeric substitution checks passed",
            )
        } else if passed > 0 {
            EquivalenceVerdict::not_equivalent("Some numeric checks failed, may need validation")
        } else {
            EquivalenceVerdict::not_equivalent("Expressions do not appear equivalent")
        }
    }
}
